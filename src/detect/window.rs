//! Adaptive context-window sizing for phrase clustering.

use serde::{Deserialize, Serialize};

/// Hard cap on any candidate window, whatever the band says.
pub const WINDOW_CAP: usize = 3;

/// Inclusive range of window sizes tried at each token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowRange {
    pub min_size: usize,
    pub max_size: usize,
}

impl WindowRange {
    /// Sizes to try with `remaining` tokens left, never empty while
    /// `remaining > 0`.
    pub fn candidate_sizes(&self, remaining: usize) -> std::ops::RangeInclusive<usize> {
        let upper = self.max_size.min(WINDOW_CAP).min(remaining).max(1);
        let lower = self.min_size.clamp(1, upper);
        lower..=upper
    }
}

/// Window band for a text of `total_tokens` tokens.
pub fn window_for(total_tokens: usize) -> WindowRange {
    let (min_size, max_size) = match total_tokens {
        0..=5 => (1, 1),
        6..=15 => (2, 3),
        16..=30 => (2, 4),
        _ => (3, 5),
    };
    WindowRange { min_size, max_size }
}
