use rand::Rng;
use walkgain_core::{MotionSample, ParticipantId, StudyPhase, TrialEnd, TrialRecord};
use walkgain_log::RecordSink;

use crate::config::StudyConfig;
use crate::trial::{TickInput, TrialSetup};
use crate::{PhaseGate, ScheduleError, SessionState, StudyError, TrialScheduler, TriggerLatch};

/// Drives one participant through the study.
///
/// Owns the session state for the whole process lifetime and is the only
/// writer to it. The host calls [`begin_trial`](Self::begin_trial), then
/// [`tick`](Self::tick) every frame, marks the trial finished and finally
/// calls [`advance_phase`](Self::advance_phase).
pub struct StudySession<R, S>
where
    R: Rng,
    S: RecordSink,
{
    config: StudyConfig,
    state: SessionState,
    scheduler: TrialScheduler<R>,
    trigger: TriggerLatch,
    sink: S,
}

impl<R, S> StudySession<R, S>
where
    R: Rng,
    S: RecordSink,
{
    pub fn open(
        config: StudyConfig,
        participant: ParticipantId,
        rng: R,
        sink: S,
    ) -> Result<Self, StudyError> {
        config.validate()?;
        let state = SessionState::new(participant, config.condition_set())
            .with_walk_start_distance(config.trial.walk_start_distance_m);
        tracing::info!(
            participant = %state.participant(),
            trials = state.total_remaining(),
            "session opened"
        );
        Ok(Self {
            trigger: TriggerLatch::new(config.trial.trigger_threshold),
            config,
            state,
            scheduler: TrialScheduler::new(rng),
            sink,
        })
    }

    /// Stages and draws the next trial.
    ///
    /// Safe to repeat: an unfinished trial is abandoned without a record.
    pub fn begin_trial(&mut self) -> Result<TrialSetup, StudyError> {
        if self.state.is_active() {
            tracing::warn!(
                trial = self.state.trial_number(),
                "trial restarted before it finished"
            );
            self.state.end();
        }
        self.state.restart_trial();
        self.trigger.reset();

        if !self.state.trials_remain() {
            return Err(ScheduleError::NoTrialsRemain.into());
        }
        let phase = self.state.phase();
        let condition = self.scheduler.draw(&mut self.state)?;
        let acceleration = self.state.current_acceleration().unwrap_or_default();
        Ok(TrialSetup {
            trial_number: self.state.trial_number(),
            phase,
            condition,
            acceleration,
            direction: self.state.direction(),
        })
    }

    /// Advances the trial clock by `dt` seconds, applies the reporter's
    /// observations and appends one motion row.
    pub fn tick(&mut self, dt: f32, input: &TickInput) -> Result<(), StudyError> {
        if !self.state.is_active() {
            return Ok(());
        }
        self.state.tick(dt);
        self.state.set_current_gain(input.gain);
        self.state.set_current_real_position(input.real);
        self.state.set_current_virtual_position(input.virtual_pos);
        self.state.set_head_forward(input.head_forward);

        if self.trigger.observe(input.trigger) {
            let (gain, time) = (self.state.current_gain(), self.state.elapsed());
            self.state.set_reported_gain(gain);
            self.state.set_reported_time(time);
            tracing::debug!(
                trial = self.state.trial_number(),
                gain,
                time,
                "report latched"
            );
        }

        self.sink.write_motion(&self.motion_sample())?;
        Ok(())
    }

    pub fn mark_trial_finished(&mut self, reason: TrialEnd) {
        self.state.mark_trial_finished(reason);
    }

    /// Consumes the trial-finished edge: writes the trial record and moves
    /// the phase on. A no-op while no trial has finished.
    pub fn advance_phase(&mut self) -> Result<StudyPhase, StudyError> {
        let Some(end) = self.state.take_trial_finished() else {
            return Ok(self.state.phase());
        };
        let record = self.trial_record();
        self.sink.write_trial(&record)?;
        self.state.end();

        let phase = PhaseGate::on_trial_end(&mut self.state, end);
        if phase.is_complete() {
            self.finish()?;
            tracing::info!(trials = self.state.trial_number(), "session complete");
        }
        Ok(phase)
    }

    pub fn finish(&mut self) -> Result<(), StudyError> {
        self.sink.close()?;
        Ok(())
    }

    pub fn phase(&self) -> StudyPhase {
        self.state.phase()
    }

    pub fn trials_remain(&self) -> bool {
        self.state.trials_remain()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Narrow mutation surface for reporters that bypass [`tick`](Self::tick).
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn trial_record(&self) -> TrialRecord {
        let s = &self.state;
        TrialRecord {
            participant: s.participant().to_string(),
            training: s.is_training(),
            trial_number: s.trial_number(),
            acceleration: s.current_acceleration().unwrap_or_default(),
            reported_gain: s.reported_gain(),
            reported_time: s.reported_time(),
            total_time: s.elapsed(),
            direction: s.direction(),
            peak_gain: s.peak_gain(),
            walk_start_time: s.walk_start_time(),
        }
    }

    fn motion_sample(&self) -> MotionSample {
        let s = &self.state;
        MotionSample {
            participant: s.participant().to_string(),
            training: s.is_training(),
            trial_number: s.trial_number(),
            gain: s.current_gain(),
            elapsed: s.elapsed(),
            real: s.real_position(),
            virtual_pos: s.virtual_position(),
            head_forward: s.head_forward(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::PathBuf;
    use walkgain_core::Vec3;
    use walkgain_log::{LogError, MemorySink};

    /// Accepts nothing once its stream is marked broken.
    #[derive(Default)]
    struct BrokenSink {
        motion_fails: bool,
        trial_fails: bool,
    }

    fn disk_full(name: &str) -> LogError {
        LogError::Write {
            path: PathBuf::from(name),
            source: std::io::Error::other("no space left on device"),
        }
    }

    impl RecordSink for BrokenSink {
        fn write_trial(&mut self, _: &TrialRecord) -> Result<(), LogError> {
            if self.trial_fails {
                return Err(disk_full("trials.csv"));
            }
            Ok(())
        }

        fn write_motion(&mut self, _: &MotionSample) -> Result<(), LogError> {
            if self.motion_fails {
                return Err(disk_full("motion.csv"));
            }
            Ok(())
        }

        fn close(&mut self) -> Result<(), LogError> {
            Ok(())
        }
    }

    fn open_with<S: RecordSink>(config: StudyConfig, sink: S) -> StudySession<StdRng, S> {
        StudySession::open(
            config,
            ParticipantId::parse("042", 3).unwrap(),
            StdRng::seed_from_u64(9),
            sink,
        )
        .unwrap()
    }

    fn session() -> StudySession<StdRng, MemorySink> {
        StudySession::open(
            StudyConfig::four_level(),
            ParticipantId::parse("042", 3).unwrap(),
            StdRng::seed_from_u64(9),
            MemorySink::new(),
        )
        .unwrap()
    }

    fn walk<S: RecordSink>(
        session: &mut StudySession<StdRng, S>,
        ticks: usize,
        trigger_at: Option<usize>,
    ) {
        for i in 0..ticks {
            let input = TickInput {
                gain: 1.0 + i as f32 * 0.01,
                real: Vec3::new(0.0, 1.7, i as f32 * 0.1),
                virtual_pos: Vec3::new(0.0, 0.0, i as f32 * 0.1),
                trigger: if Some(i) == trigger_at { 1.0 } else { 0.0 },
                ..TickInput::default()
            };
            session.tick(0.1, &input).unwrap();
        }
    }

    #[test]
    fn ticks_outside_a_trial_are_ignored() {
        let mut s = session();
        s.tick(0.1, &TickInput::default()).unwrap();
        assert!(s.sink().motion.is_empty());
    }

    #[test]
    fn one_motion_row_per_tick_and_one_record_per_trial() {
        let mut s = session();
        let setup = s.begin_trial().unwrap();
        assert_eq!(setup.trial_number, 1);
        assert_eq!(setup.phase, StudyPhase::AwaitingAlignment);
        assert_eq!(setup.acceleration, 0.0);

        walk(&mut s, 5, None);
        assert_eq!(s.sink().motion.len(), 5);
        assert!(s.sink().motion.iter().all(|m| m.training && m.trial_number == 1));

        assert_eq!(s.advance_phase().unwrap(), StudyPhase::AwaitingAlignment);
        assert!(s.sink().trials.is_empty());

        s.mark_trial_finished(TrialEnd::AlignmentCheck);
        assert_eq!(s.advance_phase().unwrap(), StudyPhase::Training1);
        assert_eq!(s.sink().trials.len(), 1);
        let record = &s.sink().trials[0];
        assert!(!record.detected());
        assert!((record.total_time - 0.5).abs() < 1e-5);
        assert!(record.direction.is_forward());

        // the edge was consumed
        assert_eq!(s.advance_phase().unwrap(), StudyPhase::Training1);
        assert_eq!(s.sink().trials.len(), 1);
    }

    #[test]
    fn trigger_reports_gain_and_time_once() {
        let mut s = session();
        s.begin_trial().unwrap();
        walk(&mut s, 10, Some(3));
        let gain = s.state().reported_gain().unwrap();
        assert!((gain - 1.03).abs() < 1e-5);
        let t = s.state().reported_time().unwrap();
        assert!((t - 0.4).abs() < 1e-5);

        s.mark_trial_finished(TrialEnd::AlignmentCheck);
        s.advance_phase().unwrap();
        let record = &s.sink().trials[0];
        assert!(record.detected());
        assert!((record.peak_gain - 1.09).abs() < 1e-5);
        assert!(record.walk_start_time.is_some());
    }

    #[test]
    fn begin_resets_transient_fields() {
        let mut s = session();
        s.begin_trial().unwrap();
        walk(&mut s, 4, Some(1));
        s.begin_trial().unwrap();
        assert_eq!(s.state().elapsed(), 0.0);
        assert_eq!(s.state().reported_time(), None);
        assert_eq!(s.state().trial_number(), 2);
        assert!(s.sink().trials.is_empty());
    }

    #[test]
    fn last_main_trial_keeps_main_phase_until_it_ends() {
        let mut config = StudyConfig::four_level();
        config.conditions.no_accel_trials = 1;
        config.conditions.accelerations.clear();
        let mut s = open_with(config, MemorySink::new());

        for (end, report) in [
            (TrialEnd::AlignmentCheck, None),
            (TrialEnd::Distance, None),
            (TrialEnd::Distance, Some(0)),
        ] {
            s.begin_trial().unwrap();
            walk(&mut s, 2, report);
            s.mark_trial_finished(end);
            s.advance_phase().unwrap();
        }

        let setup = s.begin_trial().unwrap();
        assert_eq!(setup.phase, StudyPhase::MainTrials);
        walk(&mut s, 1, None);
        assert!(s.state().is_active());
        assert_eq!(s.phase(), StudyPhase::MainTrials);
        assert!(!s.phase().is_complete());
        assert!(!s.sink().is_closed());

        s.mark_trial_finished(TrialEnd::Distance);
        assert_eq!(s.advance_phase().unwrap(), StudyPhase::SessionComplete);
        assert_eq!(s.phase(), StudyPhase::SessionComplete);
        assert!(s.sink().is_closed());
        assert_eq!(s.sink().trials.len(), 4);
    }

    #[test]
    fn motion_write_failure_stops_the_tick() {
        let sink = BrokenSink {
            motion_fails: true,
            ..BrokenSink::default()
        };
        let mut s = open_with(StudyConfig::four_level(), sink);
        s.begin_trial().unwrap();
        let err = s.tick(0.1, &TickInput::default()).unwrap_err();
        assert!(matches!(err, StudyError::Log(LogError::Write { .. })));
    }

    #[test]
    fn trial_write_failure_blocks_the_phase_change() {
        let sink = BrokenSink {
            trial_fails: true,
            ..BrokenSink::default()
        };
        let mut s = open_with(StudyConfig::four_level(), sink);
        s.begin_trial().unwrap();
        walk(&mut s, 3, None);
        s.mark_trial_finished(TrialEnd::AlignmentCheck);

        let err = s.advance_phase().unwrap_err();
        assert!(matches!(err, StudyError::Log(LogError::Write { .. })));
        assert_eq!(s.phase(), StudyPhase::AwaitingAlignment);
        assert!(!s.state().alignment_checked());
    }

    #[test]
    fn invalid_config_is_rejected_at_open() {
        let mut config = StudyConfig::four_level();
        config.conditions.training_acceleration = 0.1;
        let result = StudySession::open(
            config,
            ParticipantId::parse("042", 3).unwrap(),
            StdRng::seed_from_u64(1),
            MemorySink::new(),
        );
        assert!(matches!(result, Err(StudyError::Config(_))));
    }
}
