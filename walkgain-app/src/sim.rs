//! Headless stand-in for the headset-side motion reporter.

use walkgain_core::{Direction, StudyPhase, TrialEnd, Vec3};
use walkgain_experiment::config::TrialConfig;
use walkgain_experiment::{TickInput, TrialSetup};

const EYE_HEIGHT_M: f32 = 1.65;

/// Walks straight along the trial axis at constant speed while the gain
/// ramps at the trial's acceleration once the distance delay is passed.
#[derive(Debug, Clone)]
pub struct SimulatedWalker {
    acceleration: f32,
    alignment: bool,
    facing: f32,
    speed: f32,
    detection_threshold: f32,
    distance_delay: f32,
    trial_distance: f32,
    max_time: f32,

    real_z: f32,
    virtual_z: f32,
    gain: f32,
}

impl SimulatedWalker {
    pub fn new(
        setup: &TrialSetup,
        trial: &TrialConfig,
        speed: f32,
        detection_threshold: f32,
    ) -> Self {
        Self {
            acceleration: setup.acceleration,
            alignment: setup.phase == StudyPhase::AwaitingAlignment,
            facing: if setup.direction == Direction::Forward { 1.0 } else { -1.0 },
            speed,
            detection_threshold,
            distance_delay: trial.distance_delay_m,
            trial_distance: trial.distance_per_trial_m,
            max_time: trial.max_trial_time_s,
            real_z: 0.0,
            virtual_z: 0.0,
            gain: 1.0,
        }
    }

    /// Advances the walk by `dt` seconds. Positions are reported along the
    /// walking direction, so they grow positive either way.
    pub fn step(&mut self, dt: f32) -> TickInput {
        let dz = self.speed * dt;
        self.real_z += dz;
        if self.real_z > self.distance_delay {
            self.gain += self.acceleration * dt;
        }
        self.virtual_z += dz * self.gain;

        let noticed = self.gain - 1.0 >= self.detection_threshold;
        TickInput {
            gain: self.gain,
            real: Vec3::new(0.0, EYE_HEIGHT_M, self.real_z),
            virtual_pos: Vec3::new(0.0, 0.0, self.virtual_z),
            head_forward: Vec3::new(0.0, 0.0, self.facing),
            trigger: if noticed { 1.0 } else { 0.0 },
        }
    }

    pub fn finished(&self, elapsed: f32) -> Option<TrialEnd> {
        if self.real_z >= self.trial_distance {
            Some(if self.alignment {
                TrialEnd::AlignmentCheck
            } else {
                TrialEnd::Distance
            })
        } else if elapsed >= self.max_time {
            Some(TrialEnd::Timeout)
        } else {
            None
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }
}
