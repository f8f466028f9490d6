/// Walking direction along the trial axis, alternated after every trial.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Forward
    }
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    pub fn is_forward(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Length of the projection onto the floor plane.
    pub fn horizontal_len(&self) -> f32 {
        (self.x * self.x + self.z * self.z).sqrt()
    }
}

/// Why the external reporter ended a trial.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrialEnd {
    AlignmentCheck,
    Distance,
    Timeout,
}

impl TrialEnd {
    /// Distance or time ran out, as opposed to the alignment walk.
    pub fn is_completion(self) -> bool {
        matches!(self, TrialEnd::Distance | TrialEnd::Timeout)
    }
}

/// Summary row written once per trial.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub participant: String,
    pub training: bool,
    pub trial_number: u32,
    pub acceleration: f32,
    pub reported_gain: Option<f32>,
    pub reported_time: Option<f32>,
    pub total_time: f32,
    pub direction: Direction,
    pub peak_gain: f32,
    pub walk_start_time: Option<f32>,
}

impl TrialRecord {
    pub fn detected(&self) -> bool {
        self.reported_time.is_some()
    }
}

/// Per-tick motion row written while a trial is active.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSample {
    pub participant: String,
    pub training: bool,
    pub trial_number: u32,
    pub gain: f32,
    pub elapsed: f32,
    pub real: Vec3,
    pub virtual_pos: Vec3,
    pub head_forward: Vec3,
}
