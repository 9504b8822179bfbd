//! Emoji classification
//!
//! Counts emoji in message text. A maximal contiguous run of emoji code points
//! counts as one match, so `"😂😂😂"` and a ZWJ family sequence both count once.
//! Baseline and window statistics use the same counting, which keeps anomaly
//! ratios comparable.

use regex::Regex;
use std::sync::LazyLock;

/// Inclusive code point ranges treated as emoji
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x1F600, 0x1F64F), // emoticons
    (0x1F300, 0x1F5FF), // symbols & pictographs
    (0x1F680, 0x1F6FF), // transport & map symbols
    (0x1F1E0, 0x1F1FF), // regional indicator flags
    (0x2702, 0x27B0),   // dingbats
    (0x24C2, 0x24C2),   // circled M
    (0x1F170, 0x1F251), // enclosed alphanumeric & ideographic supplement
    (0x1F900, 0x1F9FF), // supplemental symbols & pictographs
    (0x1FA70, 0x1FAFF), // symbols & pictographs extended-A
    (0x2600, 0x26FF),   // misc symbols
    (0xFE0F, 0xFE0F),   // variation selector-16
    (0x200D, 0x200D),   // zero width joiner
];

static EMOJI_RUN: LazyLock<Regex> = LazyLock::new(|| {
    let class: String = EMOJI_RANGES
        .iter()
        .map(|&(lo, hi)| format!("\\x{{{lo:X}}}-\\x{{{hi:X}}}"))
        .collect();
    // The pattern is assembled from the constant table above.
    Regex::new(&format!("[{class}]+")).expect("emoji range table yields a valid regex")
});

/// Count emoji runs in `text`. Never fails; text without emoji yields 0.
pub fn count_emoji(text: &str) -> usize {
    EMOJI_RUN.find_iter(text).count()
}

/// Whether a single character falls in one of the emoji ranges
pub fn is_emoji_char(c: char) -> bool {
    let cp = c as u32;
    EMOJI_RANGES.iter().any(|&(lo, hi)| (lo..=hi).contains(&cp))
}
