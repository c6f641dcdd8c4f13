//! Input text statistics.
//!
//! Character and word counts plus a rough processing-time estimate, shown
//! before summarizing so users know what they are about to send.

use serde::Serialize;

/// Words processed per estimated second.
const WORDS_PER_SECOND: usize = 100;

/// The estimate never drops below this.
const MIN_ESTIMATE_SECS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
    pub estimated_secs: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        let words = text.split_whitespace().count();
        Self {
            characters: text.chars().count(),
            words,
            estimated_secs: (words / WORDS_PER_SECOND).max(MIN_ESTIMATE_SECS),
        }
    }

    /// Longer texts generally produce better summaries.
    pub fn below_recommended(&self, recommended_chars: usize) -> bool {
        self.characters < recommended_chars
    }
}

/// Print stats for the `condense stats` command.
pub fn print_stats(stats: &TextStats, recommended_chars: usize) {
    println!("characters:  {}", stats.characters);
    println!("words:       {}", stats.words);
    println!("est. time:   {} sec", stats.estimated_secs);
    if stats.below_recommended(recommended_chars) {
        println!(
            "note: longer texts generally produce better summaries ({}+ characters recommended)",
            recommended_chars
        );
    }
}
