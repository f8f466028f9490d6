/// Turns a continuous trigger axis into a single report per trial.
///
/// Fires on the first rising crossing of the threshold; later presses in the
/// same trial are ignored until [`TriggerLatch::reset`].
#[derive(Debug, Clone)]
pub struct TriggerLatch {
    threshold: f32,
    was_pressed: bool,
    fired: bool,
}

impl TriggerLatch {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            was_pressed: false,
            fired: false,
        }
    }

    /// Returns true exactly once per trial, on the first crossing.
    pub fn observe(&mut self, axis: f32) -> bool {
        let pressed = axis >= self.threshold;
        let crossing = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        if crossing && !self.fired {
            self.fired = true;
            return true;
        }
        false
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn reset(&mut self) {
        self.was_pressed = false;
        self.fired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_crossing_wins() {
        let mut latch = TriggerLatch::new(0.5);
        let fired: Vec<bool> = [0.0, 0.3, 0.6, 0.9, 0.1, 0.7]
            .into_iter()
            .map(|a| latch.observe(a))
            .collect();
        assert_eq!(fired, vec![false, false, true, false, false, false]);
        assert!(latch.has_fired());
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut latch = TriggerLatch::new(0.5);
        assert!(latch.observe(0.5));
    }

    #[test]
    fn reset_rearms() {
        let mut latch = TriggerLatch::new(0.5);
        assert!(latch.observe(1.0));
        latch.reset();
        assert!(!latch.observe(0.2));
        assert!(latch.observe(0.8));
    }
}
