//! Ordered level list with pass flags and locking.

use crate::machine::isa::{OperationKind, OperationSet};
use crate::machine::level::Level;

/// Display state of a level in the menu.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LevelStatus {
    /// The previous level has not been passed yet.
    Locked,
    Passed,
    /// Playable but not passed.
    Open,
}

/// The levels of the game, in play order, plus which ones are passed.
#[derive(Clone, Debug)]
pub struct Catalogue {
    levels: Vec<Level>,
    passed: Vec<bool>,
}

impl Catalogue {
    pub fn new(levels: Vec<Level>) -> Self {
        let passed = vec![false; levels.len()];
        Self { levels, passed }
    }

    /// The four levels shipped with the game.
    pub fn builtin() -> Self {
        let basic = OperationSet::from([OperationKind::Inbox, OperationKind::Outbox]);
        Self::new(vec![
            Level::new("level 1 - the basic", vec![1, 2], vec![1, 2], 0, basic),
            Level::new(
                "level 2 - tricky part",
                vec![3, 9, 5, 1, -2, -2, 9, -9],
                vec![-6, 6, 4, -4, 0, 0, 18, -18],
                3,
                OperationSet::all(),
            ),
            Level::new(
                "level 3 - the twin",
                vec![6, 2, 7, 7, -9, 3, -3, -3],
                vec![7, -3],
                3,
                OperationSet::all(),
            ),
            Level::new(
                "level 4 - fib number",
                vec![1],
                vec![1, 1, 2, 3],
                4,
                OperationSet::all(),
            ),
        ])
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level at 0-based `index`.
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn passed(&self, index: usize) -> bool {
        self.passed.get(index).copied().unwrap_or(false)
    }

    pub fn mark_passed(&mut self, index: usize) {
        if let Some(flag) = self.passed.get_mut(index) {
            *flag = true;
        }
    }

    /// A level is locked until the one before it is passed. The first level
    /// is never locked.
    pub fn is_locked(&self, index: usize) -> bool {
        index > 0 && !self.passed(index - 1)
    }

    pub fn status(&self, index: usize) -> LevelStatus {
        if self.is_locked(index) {
            LevelStatus::Locked
        } else if self.passed(index) {
            LevelStatus::Passed
        } else {
            LevelStatus::Open
        }
    }

    /// One flag per level, in level order.
    pub fn progress(&self) -> &[bool] {
        &self.passed
    }

    /// Applies stored flags. Extra flags are ignored; missing ones count as
    /// not passed.
    pub fn restore_progress(&mut self, flags: &[bool]) {
        for (i, slot) in self.passed.iter_mut().enumerate() {
            *slot = flags.get(i).copied().unwrap_or(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_levels() {
        let catalogue = Catalogue::builtin();
        assert_eq!(catalogue.len(), 4);
        let titles: Vec<&str> = catalogue.levels().iter().map(|l| l.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "level 1 - the basic",
                "level 2 - tricky part",
                "level 3 - the twin",
                "level 4 - fib number"
            ]
        );
        let first = catalogue.level(0).unwrap();
        assert_eq!(first.playground_size, 0);
        assert_eq!(first.allowed.len(), 2);
        assert!(catalogue.levels()[1..].iter().all(|l| l.allowed == OperationSet::all()));
        assert_eq!(catalogue.level(3).unwrap().expected_output, vec![1, 1, 2, 3]);
    }

    #[test]
    fn locking_follows_previous_level() {
        let mut catalogue = Catalogue::builtin();
        assert!(!catalogue.is_locked(0));
        assert!(catalogue.is_locked(1));
        assert!(catalogue.is_locked(3));

        catalogue.mark_passed(0);
        assert!(!catalogue.is_locked(1));
        assert!(catalogue.is_locked(2));
        assert_eq!(catalogue.status(0), LevelStatus::Passed);
        assert_eq!(catalogue.status(1), LevelStatus::Open);
        assert_eq!(catalogue.status(2), LevelStatus::Locked);
    }

    #[test]
    fn later_pass_does_not_unlock_gap() {
        let mut catalogue = Catalogue::builtin();
        catalogue.mark_passed(2);
        assert!(catalogue.is_locked(2));
        assert!(!catalogue.is_locked(3));
        assert_eq!(catalogue.status(2), LevelStatus::Locked);
    }

    #[test]
    fn restore_progress_pads_and_truncates() {
        let mut catalogue = Catalogue::builtin();
        catalogue.restore_progress(&[true]);
        assert_eq!(catalogue.progress(), [true, false, false, false]);
        catalogue.restore_progress(&[true, true, false, true, true, true]);
        assert_eq!(catalogue.progress(), [true, true, false, true]);
    }

    #[test]
    fn out_of_range_index_is_harmless() {
        let mut catalogue = Catalogue::builtin();
        catalogue.mark_passed(10);
        assert!(!catalogue.passed(10));
        assert!(catalogue.level(10).is_none());
    }
}
