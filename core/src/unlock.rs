use std::collections::BTreeSet;

use crate::LevelId;

/// Set of solved level IDs for one game type.
pub type SolvedSet = BTreeSet<LevelId>;

/// Level 1 is always open, any later level opens once its predecessor is solved.
pub fn is_unlocked(level: LevelId, solved: &SolvedSet) -> bool {
    level == 1 || (level > 1 && solved.contains(&(level - 1)))
}

/// The level after the highest solved one, 1 when nothing is solved.
pub fn next_unlocked_level(solved: &SolvedSet) -> LevelId {
    solved
        .iter()
        .next_back()
        .map_or(1, |&max| max.saturating_add(1))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LevelRoute {
    Show(LevelId),
    Redirect(LevelId),
}

/// Resolves a requested level to either itself or the highest level the player may open.
pub fn resolve_level(requested: LevelId, solved: &SolvedSet, level_count: LevelId) -> LevelRoute {
    if (1..=level_count).contains(&requested) && is_unlocked(requested, solved) {
        return LevelRoute::Show(requested);
    }

    let highest = next_unlocked_level(solved).min(level_count).max(1);
    LevelRoute::Redirect(highest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solved(levels: &[LevelId]) -> SolvedSet {
        levels.iter().copied().collect()
    }

    #[test]
    fn first_level_is_always_unlocked() {
        assert!(is_unlocked(1, &solved(&[])));
        assert!(!is_unlocked(2, &solved(&[])));
        assert!(is_unlocked(2, &solved(&[1])));
    }

    #[test]
    fn level_zero_is_never_unlocked() {
        assert!(!is_unlocked(0, &solved(&[1, 2])));
    }

    #[test]
    fn gaps_only_unlock_the_successor() {
        let set = solved(&[1, 3]);

        assert!(is_unlocked(2, &set));
        assert!(!is_unlocked(3, &set));
        assert!(is_unlocked(4, &set));
    }

    #[test]
    fn next_level_follows_highest_solved() {
        assert_eq!(next_unlocked_level(&solved(&[])), 1);
        assert_eq!(next_unlocked_level(&solved(&[1])), 2);
        assert_eq!(next_unlocked_level(&solved(&[2, 1, 4])), 5);
    }

    #[test]
    fn locked_levels_redirect_to_highest_unlocked() {
        let set = solved(&[1]);

        assert_eq!(resolve_level(2, &set, 5), LevelRoute::Show(2));
        assert_eq!(resolve_level(4, &set, 5), LevelRoute::Redirect(2));
        assert_eq!(resolve_level(0, &set, 5), LevelRoute::Redirect(2));
    }

    #[test]
    fn out_of_range_levels_redirect_within_bounds() {
        let all = solved(&[1, 2, 3, 4, 5]);

        assert_eq!(resolve_level(9, &all, 5), LevelRoute::Redirect(5));
        assert_eq!(resolve_level(1, &solved(&[]), 0), LevelRoute::Redirect(1));
    }
}
