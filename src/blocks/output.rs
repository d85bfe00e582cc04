//! Output records for the translation side

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::color::aggregate_colors;
use super::element::{ColorInfo, TextElement};

/// Granularity tag carried by every output record
pub const PARAGRAPH_ELEMENT_TYPE: &str = "paragraph";

/// One reading unit, ready to be translated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub text: String,
    pub confidence: f64,
    pub text_orientation: String,
    /// Corners as top-left, top-right, bottom-right, bottom-left
    pub rect: [[i32; 2]; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<ColorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<ColorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_source: Option<String>,
    pub line_count: usize,
    pub element_type: String,
}

impl ParagraphRecord {
    pub fn from_element(paragraph: &TextElement) -> Self {
        let colors = aggregate_colors(paragraph);
        let rect = paragraph
            .bounds()
            .corners()
            .map(|(x, y)| [x.round() as i32, y.round() as i32]);

        Self {
            text: paragraph.text.clone(),
            confidence: decimal_confidence(paragraph.confidence),
            text_orientation: paragraph.orientation.clone(),
            rect,
            foreground_color: colors.foreground,
            background_color: colors.background,
            color_source: colors.source,
            line_count: paragraph.line_count(),
            element_type: PARAGRAPH_ELEMENT_TYPE.to_string(),
        }
    }
}

/// Widen to f64 at the precision an f32 actually carries, so 0.9 stays 0.9
fn decimal_confidence(confidence: f32) -> f64 {
    (f64::from(confidence) * 1e6).round() / 1e6
}

/// Build records for paragraphs with at least `min_text_length` characters
pub fn build_records(paragraphs: &[TextElement], min_text_length: usize) -> Vec<ParagraphRecord> {
    let records: Vec<ParagraphRecord> = paragraphs
        .iter()
        .filter(|p| p.text.trim().chars().count() >= min_text_length)
        .map(ParagraphRecord::from_element)
        .collect();

    if records.len() != paragraphs.len() {
        debug!(
            "Dropped {} paragraphs shorter than {} characters",
            paragraphs.len() - records.len(),
            min_text_length
        );
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::element::{ColorHints, ColorSample, Granularity, Rect};

    fn paragraph(text: &str, rect: Rect) -> TextElement {
        let word = TextElement::leaf(text, 0.75, rect, Granularity::Word).with_orientation("horizontal");
        let line = TextElement::composite(Granularity::Line, word);
        TextElement::composite(Granularity::Paragraph, line)
    }

    #[test]
    fn test_record_fields() {
        let record = ParagraphRecord::from_element(&paragraph("Hello", Rect::new(10.4, 20.0, 50.0, 19.6)));

        assert_eq!(record.text, "Hello");
        assert!((record.confidence - 0.75).abs() < 0.001);
        assert_eq!(record.text_orientation, "horizontal");
        assert_eq!(record.rect, [[10, 20], [60, 20], [60, 40], [10, 40]]);
        assert_eq!(record.line_count, 1);
        assert_eq!(record.element_type, "paragraph");
        assert!(record.foreground_color.is_none());
    }

    #[test]
    fn test_absent_colors_not_serialized() {
        let record = ParagraphRecord::from_element(&paragraph("Hello", Rect::new(0.0, 0.0, 10.0, 10.0)));
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("foreground_color").is_none());
        assert!(value.get("background_color").is_none());
        assert!(value.get("color_source").is_none());
        assert_eq!(value["element_type"], "paragraph");
        assert_eq!(value["rect"][2][0], 10);
    }

    #[test]
    fn test_colors_serialized_when_present() {
        let word = TextElement::leaf("Hi", 1.0, Rect::new(0.0, 0.0, 10.0, 10.0), Granularity::Word)
            .with_color_hints(ColorHints {
                foreground: Some(ColorSample { rgb: [255, 255, 255], hex: None, percentage: 20.0 }),
                background: None,
                source: Some("kmeans".to_string()),
            });
        let para = TextElement::composite(Granularity::Paragraph, word);

        let value = serde_json::to_value(ParagraphRecord::from_element(&para)).unwrap();
        assert_eq!(value["foreground_color"]["hex"], "#ffffff");
        assert!(value.get("background_color").is_none());
        assert_eq!(value["color_source"], "kmeans");
    }

    #[test]
    fn test_confidence_emitted_as_decimal() {
        let word = TextElement::leaf("Hi", 0.9, Rect::new(0.0, 0.0, 10.0, 10.0), Granularity::Word);
        let para = TextElement::composite(Granularity::Paragraph, word);

        let value = serde_json::to_value(ParagraphRecord::from_element(&para)).unwrap();
        assert_eq!(value["confidence"], serde_json::json!(0.9));
    }

    #[test]
    fn test_short_paragraphs_dropped() {
        let paragraphs = vec![
            paragraph("a", Rect::new(0.0, 0.0, 10.0, 10.0)),
            paragraph("abc", Rect::new(0.0, 50.0, 10.0, 10.0)),
        ];

        let records = build_records(&paragraphs, 2);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "abc");
    }
}
