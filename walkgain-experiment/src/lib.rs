pub mod config;
pub mod error;
pub mod gate;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod trial;
pub mod trigger;

pub use config::StudyConfig;
pub use error::{ConfigError, ScheduleError, StudyError};
pub use gate::PhaseGate;
pub use scheduler::TrialScheduler;
pub use session::StudySession;
pub use state::SessionState;
pub use trial::{TickInput, TrialSetup};
pub use trigger::TriggerLatch;
