//! Check pairs: the unit of recognition logic.
//!
//! A check pair binds a reference image to an ordered action list, an
//! optional log line, and an optional payload surrendered to the caller
//! when the pair terminates a poll.

use std::time::Duration;

use image::RgbaImage;

use crate::action::Action;
use crate::geometry::Match;

/// Filter applied to a pair's match list before its actions run.
///
/// Must leave at least one result for action dispatch; an emptied result
/// set counts as "no match" for that tick.
pub type MatchFilter = fn(Vec<Match>) -> Vec<Match>;

/// Keep only the match with the greatest x coordinate.
pub fn rightmost(matches: Vec<Match>) -> Vec<Match> {
    matches
        .into_iter()
        .max_by(|a, b| a.point.x.total_cmp(&b.point.x))
        .into_iter()
        .collect()
}

/// A named (reference image, action sequence) tuple evaluated each poll tick.
///
/// Pairs are distinct instances even when structurally identical; a set of
/// pairs is a `Vec` and is never deduplicated by content.
pub struct CheckPair<T> {
    /// Human-readable label, for logging only.
    pub name: String,
    /// Reference image searched for on each tick.
    pub image: RgbaImage,
    /// Ordered action list; empty means matching alone terminates the poll.
    pub actions: Vec<Action>,
    /// Message emitted at info level when this pair matches, before actions.
    pub log: Option<String>,
    /// Payload returned when this pair terminates the poll.
    pub returns: Option<T>,
}

impl<T> CheckPair<T> {
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
            actions: Vec::new(),
            log: None,
            returns: None,
        }
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_log(mut self, log: impl Into<String>) -> Self {
        self.log = Some(log.into());
        self
    }

    pub fn with_returns(mut self, returns: T) -> Self {
        self.returns = Some(returns);
        self
    }
}

/// Parameters of one `check_and_wait` poll.
#[derive(Clone, Copy)]
pub struct PollOptions {
    /// Match threshold in [0, 1].
    pub similarity: f64,
    /// Sleep between ticks.
    pub interval: Duration,
    /// Sleep before the first check, so a just-triggered transition settles.
    pub delay: Duration,
    /// Optional filter over a matched pair's result list.
    pub result_filter: Option<MatchFilter>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            similarity: 0.85,
            interval: Duration::from_millis(100),
            delay: Duration::from_secs(1),
            result_filter: None,
        }
    }
}

impl PollOptions {
    /// Options with no waiting at all. Used where the caller drives the
    /// frame sequence itself.
    pub fn immediate() -> Self {
        Self {
            interval: Duration::ZERO,
            delay: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn with_similarity(mut self, similarity: f64) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_result_filter(mut self, filter: MatchFilter) -> Self {
        self.result_filter = Some(filter);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Match, Rect};

    #[test]
    fn test_pair_builder() {
        let pair = CheckPair::new("启动横幅", RgbaImage::new(4, 4))
            .with_actions(vec![Action::ClickIt, Action::Return])
            .with_log("找到横幅")
            .with_returns(true);

        assert_eq!(pair.name, "启动横幅");
        assert_eq!(pair.actions.len(), 2);
        assert_eq!(pair.log.as_deref(), Some("找到横幅"));
        assert_eq!(pair.returns, Some(true));
    }

    #[test]
    fn test_rightmost_keeps_greatest_x() {
        let left = Match::new(Rect::new(10, 50, 20, 20), 0.9);
        let right = Match::new(Rect::new(70, 50, 20, 20), 0.88);

        let picked = rightmost(vec![left, right]);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].rect.x, 70);
    }

    #[test]
    fn test_rightmost_of_empty_is_empty() {
        assert!(rightmost(Vec::new()).is_empty());
    }
}
