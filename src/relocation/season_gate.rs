use serde::Deserialize;
use std::collections::BTreeSet;

/// How watched seasons are compared against the seasons a library has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonGate {
    /// Number of distinct watched seasons equals number of distinct known seasons.
    /// Season identity is not checked: watched {1,3} passes against known {1,2}.
    #[default]
    Count,
    /// Watched seasons and known seasons are the same set
    Exact,
}

impl SeasonGate {
    pub fn is_open(self, watched: &BTreeSet<u32>, known: &BTreeSet<u32>) -> bool {
        match self {
            Self::Count => watched.len() == known.len(),
            Self::Exact => watched == known,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(seasons: &[u32]) -> BTreeSet<u32> {
        seasons.iter().copied().collect()
    }

    #[test]
    fn test_count_gate() {
        assert!(SeasonGate::Count.is_open(&set(&[1, 2]), &set(&[1, 2])));
        assert!(!SeasonGate::Count.is_open(&set(&[1]), &set(&[1, 2])));
        assert!(SeasonGate::Count.is_open(&set(&[]), &set(&[])));
    }

    #[test]
    fn test_count_gate_ignores_season_identity() {
        assert!(SeasonGate::Count.is_open(&set(&[1, 3]), &set(&[1, 2])));
    }

    #[test]
    fn test_exact_gate_requires_same_seasons() {
        assert!(SeasonGate::Exact.is_open(&set(&[1, 2]), &set(&[1, 2])));
        assert!(!SeasonGate::Exact.is_open(&set(&[1, 3]), &set(&[1, 2])));
        assert!(!SeasonGate::Exact.is_open(&set(&[1]), &set(&[1, 2])));
    }

    #[test]
    fn test_deserialize() {
        let gate: SeasonGate = serde_yaml::from_str("exact").unwrap();
        assert_eq!(gate, SeasonGate::Exact);
        let gate: SeasonGate = serde_yaml::from_str("count").unwrap();
        assert_eq!(gate, SeasonGate::Count);
    }
}
