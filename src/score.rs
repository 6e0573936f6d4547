//! Scoring, leveling and gravity speed

use std::time::Duration;

/// Points per simultaneous line count, indexed by lines cleared
const LINE_CLEAR_POINTS: [u64; 5] = [0, 100, 300, 500, 800];

/// Points per row descended on a hard drop
pub const HARD_DROP_POINTS_PER_ROW: u64 = 2;

/// Lines needed per level
pub const LINES_PER_LEVEL: u32 = 10;

/// Scoring calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level, starts at 1
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
        }
    }

    /// Score a lock that cleared `lines` rows at once.
    /// Points use the level in effect before the clear.
    /// Returns the points awarded.
    pub fn add_clear(&mut self, lines: u32) -> u64 {
        if lines == 0 {
            return 0;
        }
        let base = LINE_CLEAR_POINTS[(lines as usize).min(LINE_CLEAR_POINTS.len() - 1)];
        let awarded = base * self.level as u64;
        self.points += awarded;
        self.lines += lines;
        self.level = self.lines / LINES_PER_LEVEL + 1;
        awarded
    }

    /// Add score for hard drop
    pub fn add_hard_drop(&mut self, rows: u32) {
        self.points += rows as u64 * HARD_DROP_POINTS_PER_ROW;
    }

    /// Seconds between gravity steps for the current level
    pub fn fall_speed(&self) -> f64 {
        // Tetris Worlds gravity curve
        let level = self.level as f64;
        (0.8 - (level - 1.0) * 0.007)
            .powf(level - 1.0)
            .clamp(0.0, 1.0)
    }

    pub fn drop_interval(&self) -> Duration {
        Duration::from_secs_f64(self.fall_speed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_values_at_level_one() {
        for (lines, expected) in [(1, 100), (2, 300), (3, 500), (4, 800)] {
            let mut score = Score::new();
            assert_eq!(score.add_clear(lines), expected);
            assert_eq!(score.points, expected);
            assert_eq!(score.lines, lines);
        }
    }

    #[test]
    fn test_single_at_level_three() {
        let mut score = Score::new();
        score.lines = 20;
        score.level = 3;
        assert_eq!(score.add_clear(1), 300);
    }

    #[test]
    fn test_no_clear_no_points() {
        let mut score = Score::new();
        assert_eq!(score.add_clear(0), 0);
        assert_eq!(score, Score::new());
    }

    #[test]
    fn test_level_up() {
        let mut score = Score::new();
        for _ in 0..9 {
            score.add_clear(1);
        }
        assert_eq!(score.level, 1);
        score.add_clear(1);
        assert_eq!(score.lines, 10);
        assert_eq!(score.level, 2);
        for _ in 0..9 {
            score.add_clear(1);
        }
        assert_eq!(score.lines, 19);
        assert_eq!(score.level, 2);
        score.add_clear(1);
        assert_eq!(score.level, 3);
    }

    #[test]
    fn test_level_multiplier_uses_level_before_clear() {
        let mut score = Score::new();
        score.lines = 8;
        // Crosses into level 2, but is scored at level 1
        assert_eq!(score.add_clear(4), 800);
        assert_eq!(score.level, 2);
    }

    #[test]
    fn test_hard_drop_points() {
        let mut score = Score::new();
        score.add_hard_drop(17);
        assert_eq!(score.points, 34);
    }

    #[test]
    fn test_fall_speed_curve() {
        let mut score = Score::new();
        assert!((score.fall_speed() - 1.0).abs() < 1e-12);
        score.level = 2;
        assert!((score.fall_speed() - 0.793).abs() < 1e-12);
        score.level = 3;
        assert!((score.fall_speed() - 0.786 * 0.786).abs() < 1e-12);
    }

    #[test]
    fn test_fall_speed_never_negative() {
        let mut score = Score::new();
        for level in [100, 115, 116, 200, 1000, 1001] {
            score.level = level;
            assert!((0.0..=1.0).contains(&score.fall_speed()));
            let _ = score.drop_interval();
        }
    }
}
