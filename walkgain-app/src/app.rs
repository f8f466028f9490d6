use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::OffsetDateTime;
use walkgain_core::{ParticipantId, StudyPhase};
use walkgain_experiment::{StudyConfig, StudyError, StudySession};
use walkgain_log::{LogSink, SessionFiles, default_output_dir, timestamp_slug};
use walkgain_timing::{HighPrecisionTimer, ManualTimer, Timer};

use crate::cli::{Args, Preset};
use crate::sim::SimulatedWalker;

/// Consecutive unreported second-training trials tolerated before giving up.
const MAX_TRAINING_RETRIES: u32 = 10;

pub struct App {
    session: StudySession<StdRng, LogSink>,
    tick: Duration,
    realtime: bool,
    walking_speed: f32,
    sim_threshold: f32,
}

#[derive(Debug, Default)]
struct RunSummary {
    trials: u32,
    detections: u32,
    training_retries: u32,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let mut config = if args.config.exists() {
            StudyConfig::load(&args.config)
                .with_context(|| format!("loading {}", args.config.display()))?
        } else {
            match args.preset {
                Preset::SixLevel => StudyConfig::default(),
                Preset::FourLevel => StudyConfig::four_level(),
            }
        };
        if let Some(dir) = args.output_dir {
            config.logging.output_dir = Some(dir);
        }
        if !(args.tick_hz.is_finite() && args.tick_hz > 0.0) {
            bail!("tick rate must be positive, got {}", args.tick_hz);
        }

        let digits = config.participant.id_digits;
        let participant = match args.pid {
            Some(raw) => ParticipantId::parse(&raw, digits)
                .with_context(|| format!("invalid participant id {raw:?}"))?,
            None => {
                let stdin = std::io::stdin();
                prompt_participant(stdin.lock(), std::io::stderr(), digits)?
            }
        };

        let dir: PathBuf = match &config.logging.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir()?,
        };
        let stamp = timestamp_slug(OffsetDateTime::now_utc());
        let sink = LogSink::open(&dir, SessionFiles::new(&dir, &participant, &stamp))
            .context("opening session logs")?;

        let rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let session = StudySession::open(config, participant, rng, sink)?;

        Ok(Self {
            session,
            tick: Duration::from_secs_f64(1.0 / args.tick_hz),
            realtime: args.realtime,
            walking_speed: args.walking_speed,
            sim_threshold: args.sim_threshold,
        })
    }

    pub fn run(mut self) -> Result<()> {
        tracing::info!(
            platform = std::env::consts::OS,
            trials = self.session.state().total_remaining(),
            trial_log = %self.session.sink().trial_path().display(),
            "starting session"
        );

        let result = if self.realtime {
            self.run_with(HighPrecisionTimer::new())
        } else {
            self.run_with(ManualTimer::new())
        };
        // every row is already on disk; closing only releases the handles
        settle(result, self.session.finish())
    }

    fn run_with<T: Timer<Timestamp = u64>>(&mut self, mut timer: T) -> Result<()> {
        let mut summary = RunSummary::default();

        while self.session.trials_remain() {
            let setup = self.session.begin_trial()?;
            tracing::info!(
                trial = setup.trial_number,
                phase = %setup.phase,
                acceleration = setup.acceleration,
                direction = ?setup.direction,
                "trial started"
            );

            let mut walker = SimulatedWalker::new(
                &setup,
                &self.session.config().trial,
                self.walking_speed,
                self.sim_threshold,
            );
            let end = loop {
                let started = timer.now();
                timer.sleep(self.tick);
                let dt = timer.elapsed(started);
                timer.record_tick(dt);

                let input = walker.step(dt.as_secs_f32());
                self.session.tick(dt.as_secs_f32(), &input)?;
                if let Some(end) = walker.finished(self.session.state().elapsed()) {
                    break end;
                }
            };

            tracing::debug!(?end, final_gain = walker.gain(), "trial ended");
            let detected = self.session.state().reported_time().is_some();
            self.session.mark_trial_finished(end);
            let next = self.session.advance_phase()?;

            summary.trials += 1;
            if detected {
                summary.detections += 1;
            }
            if setup.phase == StudyPhase::Training2 && next == StudyPhase::Training2 {
                summary.training_retries += 1;
                if summary.training_retries > MAX_TRAINING_RETRIES {
                    bail!(
                        "no report after {MAX_TRAINING_RETRIES} training trials; check --sim-threshold"
                    );
                }
            }
        }

        let stats = timer.tick_stats();
        tracing::info!(
            trials = summary.trials,
            detections = summary.detections,
            training_retries = summary.training_retries,
            "session finished"
        );
        tracing::info!(
            samples = stats.samples,
            mean_ms = stats.average_tick_ns / 1e6,
            jitter_ms = stats.jitter_ns / 1e6,
            min_ms = stats.min_tick_ns / 1e6,
            max_ms = stats.max_tick_ns / 1e6,
            hz = stats.effective_hz,
            "tick timing"
        );
        Ok(())
    }
}

/// The run error wins; a close failure after it is only logged.
fn settle(run: Result<()>, close: Result<(), StudyError>) -> Result<()> {
    match (run, close) {
        (Err(err), Err(close_err)) => {
            tracing::warn!(error = %close_err, "closing session logs failed");
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
        (Ok(()), close) => Ok(close?),
    }
}

/// Asks until a valid id is entered. Invalid entries only re-prompt.
fn prompt_participant<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    digits: usize,
) -> Result<ParticipantId> {
    let mut lines = input.lines();
    loop {
        write!(output, "Participant id ({digits} digits): ")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            bail!("no participant id entered");
        };
        match ParticipantId::parse(&line?, digits) {
            Ok(pid) => return Ok(pid),
            Err(err) => writeln!(output, "{err}")?,
        }
    }
}
