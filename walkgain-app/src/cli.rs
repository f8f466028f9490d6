use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Acceleration detection walking study (headless driver)")]
pub struct Args {
    /// Participant id; prompted on stdin when omitted
    #[arg(long)]
    pub pid: Option<String>,

    /// Path to config TOML
    #[arg(long, default_value = "walkgain.toml")]
    pub config: PathBuf,

    /// Condition layout used when the config file does not exist
    #[arg(long, value_enum, default_value_t = Preset::SixLevel)]
    pub preset: Preset,

    /// Seed for the condition draw (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for the session CSV files (overrides config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Reporter tick rate
    #[arg(long, default_value_t = 72.0)]
    pub tick_hz: f64,

    /// Pace ticks against the wall clock instead of running as fast as possible
    #[arg(long, default_value_t = false)]
    pub realtime: bool,

    /// Simulated walking speed in m/s
    #[arg(long, default_value_t = 1.0)]
    pub walking_speed: f32,

    /// Gain excess over 1.0 at which the simulated participant pulls the trigger
    #[arg(long, default_value_t = 0.1)]
    pub sim_threshold: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// 20 baseline trials and six accelerations of 10 trials each
    SixLevel,
    /// 15 baseline trials and three accelerations of 5 trials each
    FourLevel,
}
