//! Segment-to-line grouping
//!
//! Two passes: words are bucketed by vertical center into text rows, then each
//! row is swept left to right and split wherever the horizontal gap is too
//! wide, so side-by-side captions sharing a baseline stay separate.

use tracing::debug;

use super::element::{Granularity, TextElement};
use super::language::{separator, LanguageClass};
use crate::config::BlockDetectionConfig;

/// Segments sharing one text row
#[derive(Debug, Default)]
struct Bucket {
    members: Vec<TextElement>,
    sum_center_y: f32,
    sum_height: f32,
}

impl Bucket {
    fn average_center_y(&self) -> f32 {
        self.sum_center_y / self.members.len() as f32
    }

    fn average_height(&self) -> f32 {
        self.sum_height / self.members.len() as f32
    }

    fn accepts(&self, segment: &TextElement) -> bool {
        (segment.center_y() - self.average_center_y()).abs() < 0.5 * self.average_height()
    }

    fn push(&mut self, segment: TextElement) {
        self.sum_center_y += segment.center_y();
        self.sum_height += segment.line_height();
        self.members.push(segment);
    }
}

/// Merge word-level segments into lines, ordered top to bottom
pub fn group_lines(
    segments: Vec<TextElement>,
    config: &BlockDetectionConfig,
    class: LanguageClass,
) -> Vec<TextElement> {
    let segment_count = segments.len();
    let buckets = bucket_by_row(segments);
    let gap_factor = config.line_gap_factor(class);

    let mut lines = Vec::new();
    for bucket in buckets {
        let max_gap = bucket.average_height() * gap_factor;
        split_bucket(bucket.members, max_gap, class, &mut lines);
    }

    lines.sort_by(|a, b| {
        a.bounds()
            .y
            .total_cmp(&b.bounds().y)
            .then(a.bounds().x.total_cmp(&b.bounds().x))
    });

    debug!("Grouped {} segments into {} lines", segment_count, lines.len());
    lines
}

/// Greedy one-pass assignment in center-y order; first matching bucket wins
fn bucket_by_row(mut segments: Vec<TextElement>) -> Vec<Bucket> {
    segments.sort_by(|a, b| a.center_y().total_cmp(&b.center_y()));

    let mut buckets: Vec<Bucket> = Vec::new();
    for segment in segments {
        match buckets.iter_mut().find(|b| b.accepts(&segment)) {
            Some(bucket) => bucket.push(segment),
            None => {
                let mut bucket = Bucket::default();
                bucket.push(segment);
                buckets.push(bucket);
            }
        }
    }
    buckets
}

fn split_bucket(
    mut members: Vec<TextElement>,
    max_gap: f32,
    class: LanguageClass,
    lines: &mut Vec<TextElement>,
) {
    members.sort_by(|a, b| a.bounds().x.total_cmp(&b.bounds().x));

    let mut current: Option<TextElement> = None;
    for segment in members {
        current = Some(match current.take() {
            Some(mut line) if segment.bounds().x - line.bounds().right() <= max_gap => {
                let sep = separator(&line.text, &segment.text, class);
                line.push_child(segment, sep);
                line
            }
            Some(line) => {
                lines.push(line);
                TextElement::composite(Granularity::Line, segment)
            }
            None => TextElement::composite(Granularity::Line, segment),
        });
    }
    lines.extend(current);
}
