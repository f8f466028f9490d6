pub mod timer;

pub use timer::{HighPrecisionTimer, ManualTimer, TickStats, Timer};
