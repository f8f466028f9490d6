use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkgain_core::ConditionSet;

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionsConfig {
    #[serde(default = "ConditionsConfig::default_no_accel_trials")]
    pub no_accel_trials: u32,
    #[serde(default = "ConditionsConfig::default_accelerations")]
    pub accelerations: Vec<f32>,
    #[serde(default = "ConditionsConfig::default_trials_per_condition")]
    pub trials_per_condition: u32,
    /// Forced second training level, above every pool level.
    #[serde(default = "ConditionsConfig::default_training_acceleration")]
    pub training_acceleration: f32,
}

impl ConditionsConfig {
    fn default_no_accel_trials() -> u32 {
        20
    }
    fn default_accelerations() -> Vec<f32> {
        vec![0.05, 0.1, 0.15, 0.2, 0.25, 0.3]
    }
    fn default_trials_per_condition() -> u32 {
        10
    }
    fn default_training_acceleration() -> f32 {
        0.5
    }
}

impl Default for ConditionsConfig {
    fn default() -> Self {
        Self {
            no_accel_trials: Self::default_no_accel_trials(),
            accelerations: Self::default_accelerations(),
            trials_per_condition: Self::default_trials_per_condition(),
            training_acceleration: Self::default_training_acceleration(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantConfig {
    #[serde(default = "ParticipantConfig::default_id_digits")]
    pub id_digits: usize,
}

impl ParticipantConfig {
    fn default_id_digits() -> usize {
        3
    }
}

impl Default for ParticipantConfig {
    fn default() -> Self {
        Self {
            id_digits: Self::default_id_digits(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialConfig {
    #[serde(default = "TrialConfig::default_distance_per_trial_m")]
    pub distance_per_trial_m: f32,
    /// Real distance walked before the gain starts to ramp.
    #[serde(default = "TrialConfig::default_distance_delay_m")]
    pub distance_delay_m: f32,
    #[serde(default = "TrialConfig::default_walk_start_distance_m")]
    pub walk_start_distance_m: f32,
    #[serde(default = "TrialConfig::default_max_trial_time_s")]
    pub max_trial_time_s: f32,
    #[serde(default = "TrialConfig::default_trigger_threshold")]
    pub trigger_threshold: f32,
}

impl TrialConfig {
    fn default_distance_per_trial_m() -> f32 {
        3.0
    }
    fn default_distance_delay_m() -> f32 {
        0.5
    }
    fn default_walk_start_distance_m() -> f32 {
        0.05
    }
    fn default_max_trial_time_s() -> f32 {
        30.0
    }
    fn default_trigger_threshold() -> f32 {
        0.5
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            distance_per_trial_m: Self::default_distance_per_trial_m(),
            distance_delay_m: Self::default_distance_delay_m(),
            walk_start_distance_m: Self::default_walk_start_distance_m(),
            max_trial_time_s: Self::default_max_trial_time_s(),
            trigger_threshold: Self::default_trigger_threshold(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Falls back to the per-user application data directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudyConfig {
    #[serde(default)]
    pub conditions: ConditionsConfig,
    #[serde(default)]
    pub participant: ParticipantConfig,
    #[serde(default)]
    pub trial: TrialConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StudyConfig {
    /// Earlier four-level layout: 15 baseline trials and 5 per acceleration.
    pub fn four_level() -> Self {
        Self {
            conditions: ConditionsConfig {
                no_accel_trials: 15,
                accelerations: vec![0.05, 0.1, 0.15],
                trials_per_condition: 5,
                training_acceleration: 0.5,
            },
            ..Self::default()
        }
    }

    /// Reads `path`, or returns defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        let c = &self.conditions;

        for (i, a) in c.accelerations.iter().enumerate() {
            if !a.is_finite() || *a <= 0.0 {
                return invalid(format!("acceleration {a} must be positive and finite"));
            }
            if c.accelerations[..i].contains(a) {
                return invalid(format!("acceleration {a} listed twice"));
            }
        }
        if !c.training_acceleration.is_finite()
            || c.training_acceleration <= 0.0
            || c.accelerations.iter().any(|a| *a >= c.training_acceleration)
        {
            return invalid(format!(
                "training acceleration {} must be positive and exceed every pool acceleration",
                c.training_acceleration
            ));
        }
        if self.participant.id_digits == 0 {
            return invalid("participant id needs at least one digit".into());
        }
        let t = &self.trial;
        if !(t.trigger_threshold > 0.0 && t.trigger_threshold <= 1.0) {
            return invalid(format!(
                "trigger threshold {} must be in (0, 1]",
                t.trigger_threshold
            ));
        }
        if !(positive(t.distance_per_trial_m) && positive(t.max_trial_time_s)) {
            return invalid("trial distance and time limits must be positive and finite".into());
        }
        if !(non_negative(t.distance_delay_m) && non_negative(t.walk_start_distance_m)) {
            return invalid("gain delay and walk start distances must be finite and >= 0".into());
        }
        Ok(())
    }

    pub fn condition_set(&self) -> ConditionSet {
        let c = &self.conditions;
        ConditionSet::new(
            c.no_accel_trials,
            c.accelerations
                .iter()
                .map(|a| (*a, c.trials_per_condition)),
            c.training_acceleration,
        )
    }

    pub fn total_trials(&self) -> u32 {
        self.condition_set().total_pool_size()
    }
}

fn positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}

fn non_negative(x: f32) -> bool {
    x.is_finite() && x >= 0.0
}
