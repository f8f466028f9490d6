/// Ordered stages of a walking session.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash)]
pub enum StudyPhase {
    AwaitingAlignment,
    Training1,
    Training2,
    MainTrials,
    SessionComplete,
}

impl Default for StudyPhase {
    fn default() -> Self {
        StudyPhase::AwaitingAlignment
    }
}

impl StudyPhase {
    /// Nominal successor, ignoring any completion criteria.
    pub fn next(&self) -> Option<Self> {
        use StudyPhase::*;
        Some(match self {
            AwaitingAlignment => Training1,
            Training1 => Training2,
            Training2 => MainTrials,
            MainTrials => SessionComplete,
            SessionComplete => return None,
        })
    }

    /// Phases whose condition is fixed rather than drawn from the pools.
    pub fn is_forced(&self) -> bool {
        matches!(
            self,
            Self::AwaitingAlignment | Self::Training1 | Self::Training2
        )
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Self::MainTrials)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::SessionComplete)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AwaitingAlignment => "alignment",
            Self::Training1 => "training-1",
            Self::Training2 => "training-2",
            Self::MainTrials => "main",
            Self::SessionComplete => "complete",
        }
    }
}

impl std::fmt::Display for StudyPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_run_in_fixed_order() {
        let mut phase = StudyPhase::default();
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            seen.push(next);
            phase = next;
        }
        assert_eq!(
            seen,
            vec![
                StudyPhase::AwaitingAlignment,
                StudyPhase::Training1,
                StudyPhase::Training2,
                StudyPhase::MainTrials,
                StudyPhase::SessionComplete,
            ]
        );
    }

    #[test]
    fn only_setup_phases_are_forced() {
        assert!(StudyPhase::AwaitingAlignment.is_forced());
        assert!(StudyPhase::Training2.is_forced());
        assert!(!StudyPhase::MainTrials.is_forced());
        assert!(!StudyPhase::SessionComplete.is_forced());
    }
}
