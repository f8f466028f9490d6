pub mod condition;
pub mod participant;
pub mod phase;
pub mod trial;

pub use condition::{Condition, ConditionId, ConditionSet};
pub use participant::{ParticipantId, ParticipantIdError};
pub use phase::StudyPhase;
pub use trial::{Direction, MotionSample, TrialEnd, TrialRecord, Vec3};
