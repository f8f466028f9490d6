use std::collections::BTreeMap;

use walkgain_core::{
    ConditionId, ConditionSet, Direction, ParticipantId, StudyPhase, TrialEnd, Vec3,
};

/// Everything a session remembers across trials and view changes.
///
/// Phase flags, pool counts and the trial counter change only through the
/// scheduler and the phase gate. External reporters use the setters below;
/// the report setters are first-write-wins within a trial.
#[derive(Debug, Clone)]
pub struct SessionState {
    participant: ParticipantId,
    conditions: ConditionSet,

    alignment_checked: bool,
    training1_done: bool,
    training2_done: bool,
    main_done: bool,
    direction: Direction,

    remaining: BTreeMap<ConditionId, u32>,
    trial_number: u32,
    current_condition: Option<ConditionId>,
    active: bool,

    // reset at every trial start
    elapsed: f32,
    reported_gain: Option<f32>,
    reported_time: Option<f32>,
    walk_start_time: Option<f32>,
    peak_gain: Option<f32>,
    trial_finished: Option<TrialEnd>,

    // written by the motion reporter every tick
    current_gain: f32,
    real_position: Vec3,
    virtual_position: Vec3,
    head_forward: Vec3,

    walk_start_distance: f32,
}

impl SessionState {
    pub fn new(participant: ParticipantId, conditions: ConditionSet) -> Self {
        let remaining = conditions
            .pools()
            .iter()
            .map(|c| (c.id, c.pool_size))
            .collect();
        Self {
            participant,
            conditions,
            alignment_checked: false,
            training1_done: false,
            training2_done: false,
            main_done: false,
            direction: Direction::Forward,
            remaining,
            trial_number: 0,
            current_condition: None,
            active: false,
            elapsed: 0.0,
            reported_gain: None,
            reported_time: None,
            walk_start_time: None,
            peak_gain: None,
            trial_finished: None,
            current_gain: 1.0,
            real_position: Vec3::ZERO,
            virtual_position: Vec3::ZERO,
            head_forward: Vec3::new(0.0, 0.0, 1.0),
            walk_start_distance: 0.05,
        }
    }

    pub fn with_walk_start_distance(mut self, meters: f32) -> Self {
        self.walk_start_distance = meters;
        self
    }

    /// Active phase, derived from the completion flags.
    ///
    /// Stays at main trials while the last drawn trial is still running;
    /// only the phase gate marks the session complete.
    pub fn phase(&self) -> StudyPhase {
        if !self.alignment_checked {
            StudyPhase::AwaitingAlignment
        } else if !self.training1_done {
            StudyPhase::Training1
        } else if !self.training2_done {
            StudyPhase::Training2
        } else if !self.main_done {
            StudyPhase::MainTrials
        } else {
            StudyPhase::SessionComplete
        }
    }

    /// Forced phases always have a trial available.
    pub fn trials_remain(&self) -> bool {
        !self.training2_done || self.total_remaining() > 0
    }

    pub fn total_remaining(&self) -> u32 {
        self.remaining.values().sum()
    }

    pub fn remaining(&self, id: ConditionId) -> u32 {
        self.remaining.get(&id).copied().unwrap_or(0)
    }

    /// Clears the per-trial fields. Flags, pools and the counter are untouched.
    pub fn restart_trial(&mut self) {
        self.elapsed = 0.0;
        self.reported_gain = None;
        self.reported_time = None;
        self.walk_start_time = None;
        self.peak_gain = None;
        self.trial_finished = None;
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn set_reported_gain(&mut self, gain: f32) -> bool {
        latch(&mut self.reported_gain, gain)
    }

    pub fn set_reported_time(&mut self, time: f32) -> bool {
        latch(&mut self.reported_time, time)
    }

    pub fn set_walk_start_time(&mut self, time: f32) -> bool {
        latch(&mut self.walk_start_time, time)
    }

    pub fn set_current_gain(&mut self, gain: f32) {
        self.current_gain = gain;
        self.peak_gain = Some(self.peak_gain.map_or(gain, |p| p.max(gain)));
    }

    pub fn set_current_real_position(&mut self, position: Vec3) {
        self.real_position = position;
        if self.active && position.horizontal_len() > self.walk_start_distance {
            let now = self.elapsed;
            self.set_walk_start_time(now);
        }
    }

    pub fn set_current_virtual_position(&mut self, position: Vec3) {
        self.virtual_position = position;
    }

    pub fn set_head_forward(&mut self, forward: Vec3) {
        self.head_forward = forward;
    }

    /// Raises the trial-finished edge; consumed once by the phase transition.
    pub fn mark_trial_finished(&mut self, reason: TrialEnd) {
        if self.trial_finished.is_none() {
            self.trial_finished = Some(reason);
        }
    }

    pub(crate) fn take_trial_finished(&mut self) -> Option<TrialEnd> {
        self.trial_finished.take()
    }

    pub(crate) fn next_trial_number(&mut self) -> u32 {
        self.trial_number += 1;
        self.trial_number
    }

    /// Removes one trial from `id`'s pool. Returns false if it was empty.
    pub(crate) fn take_from_pool(&mut self, id: ConditionId) -> bool {
        match self.remaining.get_mut(&id) {
            Some(left) if *left > 0 => {
                *left -= 1;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn begin(&mut self, condition: ConditionId) {
        self.current_condition = Some(condition);
        self.active = true;
    }

    pub(crate) fn end(&mut self) {
        self.active = false;
    }

    pub(crate) fn check_alignment(&mut self) {
        self.alignment_checked = true;
    }

    pub(crate) fn complete_training1(&mut self) {
        self.training1_done = true;
    }

    pub(crate) fn complete_training2(&mut self) {
        self.training2_done = true;
    }

    pub(crate) fn complete_main(&mut self) {
        self.main_done = true;
    }

    pub(crate) fn toggle_direction(&mut self) {
        self.direction = self.direction.toggled();
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn conditions(&self) -> &ConditionSet {
        &self.conditions
    }

    pub fn current_condition(&self) -> Option<ConditionId> {
        self.current_condition
    }

    /// Acceleration of the current trial, if one has been drawn.
    pub fn current_acceleration(&self) -> Option<f32> {
        self.current_condition
            .and_then(|id| self.conditions.magnitude(id))
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn trial_number(&self) -> u32 {
        self.trial_number
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Rows are tagged as training until the second training trial is done.
    pub fn is_training(&self) -> bool {
        !self.training2_done
    }

    pub fn alignment_checked(&self) -> bool {
        self.alignment_checked
    }

    pub fn training1_done(&self) -> bool {
        self.training1_done
    }

    pub fn training2_done(&self) -> bool {
        self.training2_done
    }

    pub fn main_done(&self) -> bool {
        self.main_done
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn reported_gain(&self) -> Option<f32> {
        self.reported_gain
    }

    pub fn reported_time(&self) -> Option<f32> {
        self.reported_time
    }

    pub fn walk_start_time(&self) -> Option<f32> {
        self.walk_start_time
    }

    pub fn peak_gain(&self) -> f32 {
        self.peak_gain.unwrap_or(self.current_gain)
    }

    pub fn is_trial_finished(&self) -> bool {
        self.trial_finished.is_some()
    }

    pub fn current_gain(&self) -> f32 {
        self.current_gain
    }

    pub fn real_position(&self) -> Vec3 {
        self.real_position
    }

    pub fn virtual_position(&self) -> Vec3 {
        self.virtual_position
    }

    pub fn head_forward(&self) -> Vec3 {
        self.head_forward
    }
}

fn latch(slot: &mut Option<f32>, value: f32) -> bool {
    if slot.is_some() {
        return false;
    }
    *slot = Some(value);
    true
}
