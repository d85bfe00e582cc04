//! Line-to-paragraph grouping
//!
//! Lines arrive sorted top to bottom. Each one is offered to the open
//! paragraphs, most recent first, and joins the first whose last line it
//! continues; otherwise it opens a paragraph of its own. A line continues
//! another when none of the break rules fire:
//!
//! - horizontal overlap below `min_horizontal_overlap` of the narrower line
//! - vertical gap above `vertical_glue` line heights
//! - left-edge shift above `indentation_factor` line heights
//! - relative line-height difference above `font_size_tolerance`
//!
//! The last two are skipped when the vertical glue is configured above the
//! aggressive cutoff.

use tracing::debug;

use super::element::{Granularity, TextElement};
use super::language::{separator, LanguageClass};
use crate::config::BlockDetectionConfig;

/// Why a line could not continue a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakReason {
    NoOverlap,
    VerticalGap,
    Indentation,
    FontSize,
}

/// Merge lines into paragraphs, ordered by their first line
pub fn group_paragraphs(
    lines: Vec<TextElement>,
    config: &BlockDetectionConfig,
    class: LanguageClass,
) -> Vec<TextElement> {
    let line_count = lines.len();
    let mut paragraphs: Vec<TextElement> = Vec::new();

    for line in lines {
        let target = paragraphs.iter().rposition(|p| {
            p.children()
                .last()
                .map_or(false, |last| break_reason(last, &line, config).is_none())
        });

        match target {
            Some(index) => {
                let paragraph = &mut paragraphs[index];
                let sep = if config.keep_linefeeds {
                    "\n"
                } else {
                    separator(&paragraph.text, &line.text, class)
                };
                paragraph.push_child(line, sep);
            }
            None => paragraphs.push(TextElement::composite(Granularity::Paragraph, line)),
        }
    }

    debug!("Grouped {} lines into {} paragraphs", line_count, paragraphs.len());
    paragraphs
}

/// First break rule that keeps `line` from following `last`, if any
pub fn break_reason(
    last: &TextElement,
    line: &TextElement,
    config: &BlockDetectionConfig,
) -> Option<BreakReason> {
    let a = last.bounds();
    let b = line.bounds();

    let narrower = a.width.min(b.width);
    if narrower <= 0.0 || a.horizontal_overlap(&b) / narrower < config.min_horizontal_overlap {
        return Some(BreakReason::NoOverlap);
    }

    let reference = reference_height(last, line);
    let gap = b.y - a.bottom();
    if gap > reference * config.paragraph_gap_factor() {
        return Some(BreakReason::VerticalGap);
    }

    if config.is_aggressive_glue() {
        return None;
    }

    if (a.x - b.x).abs() > reference * config.indentation_factor {
        return Some(BreakReason::Indentation);
    }

    let taller = last.line_height().max(line.line_height());
    if taller > 0.0 && (last.line_height() - line.line_height()).abs() / taller > config.font_size_tolerance {
        return Some(BreakReason::FontSize);
    }

    None
}

/// Line height the distance rules are measured in
///
/// Single lines use the mean of both heights. A multi-line element (re-fed
/// paragraph output) only knows `height / line_count`, which includes its
/// interline spacing, so the smaller estimate is taken to keep the
/// thresholds from widening on a second pass.
fn reference_height(last: &TextElement, line: &TextElement) -> f32 {
    if last.line_count() > 1 || line.line_count() > 1 {
        last.line_height().min(line.line_height())
    } else {
        (last.line_height() + line.line_height()) / 2.0
    }
}
