use walkgain_core::{StudyPhase, TrialEnd};

use crate::SessionState;

/// Applies trial-end events to the phase flags.
///
/// Phase itself is never stored; it is re-derived from the flags, so the
/// gate only decides which flag a finished trial is allowed to set. It is
/// the only place the session is marked complete.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseGate;

impl PhaseGate {
    /// Handles one finished trial and returns the phase for the next one.
    pub fn on_trial_end(state: &mut SessionState, end: TrialEnd) -> StudyPhase {
        let from = state.phase();
        match from {
            StudyPhase::AwaitingAlignment => state.check_alignment(),
            StudyPhase::Training1 => Self::finish_training1(state, end),
            StudyPhase::Training2 => Self::finish_training2(state),
            StudyPhase::MainTrials | StudyPhase::SessionComplete => {}
        }
        if state.training2_done() && state.total_remaining() == 0 {
            state.complete_main();
        }
        state.toggle_direction();

        let to = state.phase();
        if to != from {
            tracing::info!(%from, %to, trial = state.trial_number(), "phase advanced");
        }
        to
    }

    fn finish_training1(state: &mut SessionState, end: TrialEnd) {
        if end.is_completion() {
            state.complete_training1();
        } else {
            tracing::warn!(?end, "first training trial did not complete, repeating");
        }
    }

    /// The high-acceleration trial counts only once the participant reported it.
    fn finish_training2(state: &mut SessionState) {
        if state.reported_time().is_some() {
            state.complete_training2();
        } else {
            tracing::warn!(
                trial = state.trial_number(),
                "no report during second training trial, repeating"
            );
        }
    }
}
