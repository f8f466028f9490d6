use rand::Rng;
use walkgain_core::{ConditionId, StudyPhase};

use crate::{ScheduleError, SessionState};

/// Picks the condition for each trial.
///
/// Setup and training phases get fixed conditions. Main trials are drawn
/// without replacement, weighted by how many trials each pool has left.
#[derive(Debug, Clone)]
pub struct TrialScheduler<R: Rng> {
    rng: R,
}

impl<R: Rng> TrialScheduler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws the next condition and bumps the trial counter.
    ///
    /// Fails without touching `state` when no trials remain.
    pub fn draw(&mut self, state: &mut SessionState) -> Result<ConditionId, ScheduleError> {
        let phase = state.phase();
        let id = match phase {
            StudyPhase::AwaitingAlignment | StudyPhase::Training1 => {
                state.conditions().baseline().id
            }
            StudyPhase::Training2 => state.conditions().training().id,
            StudyPhase::MainTrials => self.pick_from_pools(state)?,
            StudyPhase::SessionComplete => return Err(ScheduleError::NoTrialsRemain),
        };

        let trial = state.next_trial_number();
        if phase.is_main() && !state.take_from_pool(id) {
            return Err(ScheduleError::NoTrialsRemain);
        }

        tracing::debug!(
            trial,
            %phase,
            condition = %id,
            acceleration = state.conditions().magnitude(id).unwrap_or_default(),
            remaining = state.total_remaining(),
            "condition drawn"
        );
        state.begin(id);
        Ok(id)
    }

    /// Stratified pick: scans pools in fixed order until the running count
    /// exceeds a uniform draw over all remaining trials.
    fn pick_from_pools(&mut self, state: &SessionState) -> Result<ConditionId, ScheduleError> {
        let total = state.total_remaining();
        if total == 0 {
            return Err(ScheduleError::NoTrialsRemain);
        }
        let r = self.rng.random_range(0..total);

        let mut cumulative = 0;
        state
            .conditions()
            .pools()
            .iter()
            .find_map(|c| {
                cumulative += state.remaining(c.id);
                (r < cumulative).then_some(c.id)
            })
            .ok_or(ScheduleError::NoTrialsRemain)
    }
}
