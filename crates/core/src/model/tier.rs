use std::fmt;

use serde::Serialize;

/// Qualitative scoring tier shown on the finish screen.
///
/// Boundaries are evaluated high to low, inclusive on the lower end and
/// exclusive on the upper: 100% is Gold, [80, 100) Silver, [60, 80) Bronze,
/// [40, 60) Pass, anything below Fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Gold,
    Silver,
    Bronze,
    Pass,
    Fail,
}

impl ScoreTier {
    /// Tier for a final score against the maximum reachable points.
    ///
    /// An unreachable maximum of zero maps to `Fail`.
    #[must_use]
    pub fn for_score(points: u32, max_possible_points: u32) -> Self {
        let pct = percentage(points, max_possible_points);
        if pct >= 100.0 {
            Self::Gold
        } else if pct >= 80.0 {
            Self::Silver
        } else if pct >= 60.0 {
            Self::Bronze
        } else if pct >= 40.0 {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Bronze => "bronze",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    #[must_use]
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Gold => "🥇",
            Self::Silver => "🥈",
            Self::Bronze => "🥉",
            Self::Pass => "👍",
            Self::Fail => "👎",
        }
    }
}

impl fmt::Display for ScoreTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Score as a percentage of the maximum. Zero when nothing was reachable.
#[must_use]
pub fn percentage(points: u32, max_possible_points: u32) -> f64 {
    if max_possible_points == 0 {
        0.0
    } else {
        f64::from(points) / f64::from(max_possible_points) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_lower_inclusive() {
        assert_eq!(ScoreTier::for_score(100, 100), ScoreTier::Gold);
        assert_eq!(ScoreTier::for_score(99, 100), ScoreTier::Silver);
        assert_eq!(ScoreTier::for_score(80, 100), ScoreTier::Silver);
        assert_eq!(ScoreTier::for_score(79, 100), ScoreTier::Bronze);
        assert_eq!(ScoreTier::for_score(60, 100), ScoreTier::Bronze);
        assert_eq!(ScoreTier::for_score(59, 100), ScoreTier::Pass);
        assert_eq!(ScoreTier::for_score(40, 100), ScoreTier::Pass);
        assert_eq!(ScoreTier::for_score(39, 100), ScoreTier::Fail);
        assert_eq!(ScoreTier::for_score(0, 100), ScoreTier::Fail);
    }

    #[test]
    fn uneven_maximum_rounds_through_percentage() {
        // 10 of 30 points is 33.3%: below the lowest threshold.
        assert_eq!(ScoreTier::for_score(10, 30), ScoreTier::Fail);
        // 20 of 30 points is 66.6%: Bronze.
        assert_eq!(ScoreTier::for_score(20, 30), ScoreTier::Bronze);
    }

    #[test]
    fn zero_maximum_is_a_fail() {
        assert_eq!(ScoreTier::for_score(0, 0), ScoreTier::Fail);
        assert!((percentage(0, 0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn labels_render_via_display() {
        assert_eq!(ScoreTier::Gold.to_string(), "gold");
        assert_eq!(ScoreTier::Fail.to_string(), "fail");
    }
}
