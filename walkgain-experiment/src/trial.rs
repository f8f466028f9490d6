use walkgain_core::{ConditionId, Direction, StudyPhase, Vec3};

/// What the host needs to stage a trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSetup {
    pub trial_number: u32,
    pub phase: StudyPhase,
    pub condition: ConditionId,
    pub acceleration: f32,
    pub direction: Direction,
}

/// One tick of observations from the motion reporter.
#[derive(Debug, Clone, PartialEq)]
pub struct TickInput {
    pub gain: f32,
    pub real: Vec3,
    pub virtual_pos: Vec3,
    pub head_forward: Vec3,
    /// Trigger axis in `[0, 1]`.
    pub trigger: f32,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            gain: 1.0,
            real: Vec3::ZERO,
            virtual_pos: Vec3::ZERO,
            head_forward: Vec3::new(0.0, 0.0, 1.0),
            trigger: 0.0,
        }
    }
}
