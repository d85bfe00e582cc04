//! Confidence filtering

use tracing::debug;

use super::element::{Granularity, TextElement};

/// Drop leaves below their granularity's minimum confidence
///
/// Character fragments are checked against `min_character`, everything the
/// back-end already grouped against `min_line`. Runs before any grouping so a
/// stray low-confidence mark cannot bridge two real words.
pub fn filter_leaves(elements: Vec<TextElement>, min_character: f32, min_line: f32) -> Vec<TextElement> {
    let before = elements.len();
    let kept: Vec<TextElement> = elements
        .into_iter()
        .filter(|e| {
            let threshold = match e.granularity {
                Granularity::Character => min_character,
                _ => min_line,
            };
            e.confidence >= threshold
        })
        .collect();

    if kept.len() != before {
        debug!("Confidence filter dropped {} of {} fragments", before - kept.len(), before);
    }
    kept
}

/// Drop grouped elements whose averaged confidence is below `threshold`
pub fn filter_below(elements: Vec<TextElement>, threshold: f32) -> Vec<TextElement> {
    elements.into_iter().filter(|e| e.confidence >= threshold).collect()
}
