/// Stable index of a condition inside its [`ConditionSet`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionId(pub usize);

impl std::fmt::Display for ConditionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One acceleration level, in units of velocity gain per second.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub id: ConditionId,
    pub magnitude: f32,
    pub pool_size: u32,
}

impl Condition {
    pub fn is_baseline(&self) -> bool {
        self.magnitude == 0.0
    }
}

/// Immutable set of pool conditions plus the forced training level.
///
/// The baseline (no acceleration) condition is always id 0; pool conditions
/// follow in configuration order and the training condition comes last. It
/// carries no pool of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSet {
    conditions: Vec<Condition>,
    training: Condition,
}

impl ConditionSet {
    pub fn new<I>(baseline_pool: u32, pools: I, training_magnitude: f32) -> Self
    where
        I: IntoIterator<Item = (f32, u32)>,
    {
        let mut conditions = vec![Condition {
            id: ConditionId(0),
            magnitude: 0.0,
            pool_size: baseline_pool,
        }];
        for (magnitude, pool_size) in pools {
            conditions.push(Condition {
                id: ConditionId(conditions.len()),
                magnitude,
                pool_size,
            });
        }
        let training = Condition {
            id: ConditionId(conditions.len()),
            magnitude: training_magnitude,
            pool_size: 0,
        };
        Self {
            conditions,
            training,
        }
    }

    pub fn baseline(&self) -> &Condition {
        &self.conditions[0]
    }

    pub fn training(&self) -> &Condition {
        &self.training
    }

    /// Pool conditions in their fixed scan order, baseline first.
    pub fn pools(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn get(&self, id: ConditionId) -> Option<&Condition> {
        if id == self.training.id {
            Some(&self.training)
        } else {
            self.conditions.get(id.0)
        }
    }

    pub fn magnitude(&self, id: ConditionId) -> Option<f32> {
        self.get(id).map(|c| c.magnitude)
    }

    pub fn total_pool_size(&self) -> u32 {
        self.conditions.iter().map(|c| c.pool_size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_level() -> ConditionSet {
        ConditionSet::new(15, [(0.05, 5), (0.1, 5), (0.15, 5)], 0.5)
    }

    #[test]
    fn ids_follow_configuration_order() {
        let set = four_level();
        let ids: Vec<usize> = set.pools().iter().map(|c| c.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(set.training().id, ConditionId(4));
        assert!(set.baseline().is_baseline());
    }

    #[test]
    fn training_condition_is_reachable_by_id() {
        let set = four_level();
        assert_eq!(set.magnitude(ConditionId(4)), Some(0.5));
        assert_eq!(set.magnitude(ConditionId(2)), Some(0.1));
        assert_eq!(set.magnitude(ConditionId(9)), None);
    }

    #[test]
    fn total_excludes_training() {
        assert_eq!(four_level().total_pool_size(), 30);
    }
}
