//! Character-to-word grouping

use std::collections::BTreeMap;
use tracing::debug;

use super::element::{Granularity, TextElement};
use super::language::LanguageClass;
use crate::config::BlockDetectionConfig;

/// Row bucket size as a fraction of the average glyph height
const ROW_STEP_FACTOR: f32 = 0.75;

/// Merge character leaves into words
///
/// Characters are bucketed into rows by rounding their vertical center to a
/// multiple of a height-derived step, then swept left to right; a gap wider
/// than the language's letter spacing starts a new word. Non-character
/// elements pass through untouched, after the words.
pub fn group_characters(
    elements: Vec<TextElement>,
    config: &BlockDetectionConfig,
    class: LanguageClass,
) -> Vec<TextElement> {
    let (characters, mut others): (Vec<_>, Vec<_>) = elements
        .into_iter()
        .partition(|e| e.granularity == Granularity::Character);

    if characters.is_empty() {
        return others;
    }

    let char_count = characters.len();
    let average_height =
        characters.iter().map(|c| c.bounds().height).sum::<f32>() / char_count as f32;
    let row_step = (average_height * ROW_STEP_FACTOR).max(1.0);
    let max_gap = average_height * config.character_gap_factor(class);

    let mut rows: BTreeMap<i64, Vec<TextElement>> = BTreeMap::new();
    for character in characters {
        let key = (character.center_y() / row_step).round() as i64;
        rows.entry(key).or_default().push(character);
    }

    let mut words = Vec::new();
    for (_, mut row) in rows {
        row.sort_by(|a, b| a.bounds().x.total_cmp(&b.bounds().x));

        let mut current: Option<TextElement> = None;
        for character in row {
            current = Some(match current.take() {
                Some(mut word) if character.bounds().x - word.bounds().right() <= max_gap => {
                    word.push_child(character, "");
                    word
                }
                Some(word) => {
                    words.push(word);
                    TextElement::composite(Granularity::Word, character)
                }
                None => TextElement::composite(Granularity::Word, character),
            });
        }
        words.extend(current);
    }

    debug!(
        "Grouped {} characters into {} words (max gap {:.1}px)",
        char_count,
        words.len(),
        max_gap
    );

    words.append(&mut others);
    words
}
