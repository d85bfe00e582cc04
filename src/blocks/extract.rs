//! Fragment extraction
//!
//! Turns raw OCR records into leaf [`TextElement`]s. Records without text,
//! confidence or usable geometry are skipped; OCR back-ends emit that kind of
//! noise routinely.

use serde::Deserialize;
use serde_json::Value;
use tracing::trace;

use super::element::{ColorHints, ColorSample, Granularity, Rect, TextElement};

/// One detected fragment as sent by an OCR back-end
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFragment {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub vertices: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub rect: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub is_character: Option<bool>,
    #[serde(default)]
    pub text_orientation: Option<String>,
    #[serde(default)]
    pub foreground_color: Option<Value>,
    #[serde(default)]
    pub background_color: Option<Value>,
    #[serde(default)]
    pub color_source: Option<Value>,
    /// Present when re-feeding this engine's own paragraph output
    #[serde(default)]
    pub line_count: Option<Value>,
}

impl RawFragment {
    /// Visual lines covered, defaulting to one for anything but a positive number
    pub fn line_count(&self) -> usize {
        self.line_count
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
            .map_or(1, |n| n.round().max(1.0) as usize)
    }
}

/// Per-payload extraction switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Treat records without `is_character` as single characters
    pub default_is_character: bool,
}

/// Extract leaf elements from raw JSON records, in input order
pub fn extract_elements(records: &[Value], options: ExtractOptions) -> Vec<TextElement> {
    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let fragment = match RawFragment::deserialize(record) {
                Ok(fragment) => fragment,
                Err(e) => {
                    trace!("Skipping malformed OCR record {}: {}", index, e);
                    return None;
                }
            };
            let element = fragment_to_element(fragment, options);
            if element.is_none() {
                trace!("Skipping unusable OCR record {}", index);
            }
            element
        })
        .collect()
}

/// Convert one fragment, `None` if it is missing a required field
pub fn fragment_to_element(fragment: RawFragment, options: ExtractOptions) -> Option<TextElement> {
    let text = fragment.text.as_deref().map(str::trim).filter(|t| !t.is_empty())?;
    let confidence = fragment.confidence.filter(|c| c.is_finite())? as f32;
    let (polygon, bounds) = geometry(&fragment)?;

    let is_character = fragment.is_character.unwrap_or(options.default_is_character);
    let granularity = if is_character {
        Granularity::Character
    } else {
        Granularity::Word
    };

    let hints = ColorHints {
        foreground: fragment.foreground_color.as_ref().and_then(parse_color),
        background: fragment.background_color.as_ref().and_then(parse_color),
        source: fragment
            .color_source
            .as_ref()
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    };

    let element = TextElement::leaf(text, confidence.clamp(0.0, 1.0), bounds, granularity)
        .with_polygon(polygon)
        .with_orientation(fragment.text_orientation.as_deref().unwrap_or("unknown"))
        .with_line_count(fragment.line_count())
        .with_color_hints(hints);

    Some(element)
}

/// Polygon and bounds from `vertices`, `rect`, or an explicit x/y/width/height
fn geometry(fragment: &RawFragment) -> Option<(Vec<(f32, f32)>, Rect)> {
    if let Some(points) = fragment.vertices.as_ref().or(fragment.rect.as_ref()) {
        let polygon: Vec<(f32, f32)> = points
            .iter()
            .filter_map(|p| match p.as_slice() {
                [x, y, ..] if x.is_finite() && y.is_finite() => Some((*x as f32, *y as f32)),
                _ => None,
            })
            .collect();

        if polygon.len() < 4 {
            return None;
        }
        let bounds = Rect::from_polygon(&polygon)?;
        return Some((polygon, bounds));
    }

    let bounds = Rect::new(
        fragment.x? as f32,
        fragment.y? as f32,
        fragment.width? as f32,
        fragment.height? as f32,
    );
    bounds.is_valid().then(|| (bounds.corners().to_vec(), bounds))
}

/// Normalize a color object, accepting `rgb` or BGR-ordered `bgr`/`color`
pub fn parse_color(value: &Value) -> Option<ColorSample> {
    let object = value.as_object()?;

    let channels = |key: &str| -> Option<[u8; 3]> {
        let array = object.get(key)?.as_array()?;
        if array.len() != 3 {
            return None;
        }
        let mut out = [0u8; 3];
        for (slot, channel) in out.iter_mut().zip(array) {
            *slot = channel.as_f64()?.clamp(0.0, 255.0) as u8;
        }
        Some(out)
    };

    let rgb = channels("rgb").or_else(|| {
        let [b, g, r] = channels("bgr").or_else(|| channels("color"))?;
        Some([r, g, b])
    })?;

    let hex = object
        .get("hex")
        .and_then(Value::as_str)
        .filter(|h| !h.is_empty())
        .map(str::to_string);

    let percentage = object
        .get("percentage")
        .and_then(Value::as_f64)
        .filter(|p| p.is_finite())
        .unwrap_or(0.0) as f32;

    Some(ColorSample { rgb, hex, percentage })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_word_from_vertices() {
        let records = vec![json!({
            "text": "Hello",
            "confidence": 0.9,
            "vertices": [[10, 20], [60, 20], [60, 40], [10, 40]],
            "text_orientation": "horizontal"
        })];

        let elements = extract_elements(&records, ExtractOptions::default());
        assert_eq!(elements.len(), 1);

        let element = &elements[0];
        assert_eq!(element.text, "Hello");
        assert_eq!(element.granularity, Granularity::Word);
        assert_eq!(element.orientation, "horizontal");
        assert_eq!(element.bounds(), Rect::new(10.0, 20.0, 50.0, 20.0));
        assert!((element.center_y() - 30.0).abs() < 0.001);
        assert_eq!(element.polygon.len(), 4);
    }

    #[test]
    fn test_extract_character_from_rect() {
        let records = vec![json!({
            "text": "H",
            "confidence": 0.8,
            "rect": [[0, 0], [10, 0], [10, 20], [0, 20]],
            "is_character": true
        })];

        let elements = extract_elements(&records, ExtractOptions::default());
        assert_eq!(elements[0].granularity, Granularity::Character);
        assert_eq!(elements[0].orientation, "unknown");
    }

    #[test]
    fn test_extract_explicit_rectangle() {
        let records = vec![json!({
            "text": "HP", "confidence": 1.0, "x": 5, "y": 6, "width": 30, "height": 12
        })];

        let elements = extract_elements(&records, ExtractOptions::default());
        assert_eq!(elements[0].bounds(), Rect::new(5.0, 6.0, 30.0, 12.0));
    }

    #[test]
    fn test_lenient_line_count() {
        let base = json!({"text": "a", "confidence": 0.9, "x": 0, "y": 0, "width": 10, "height": 40});
        let with_count = |count: Value| {
            let mut record = base.clone();
            record["line_count"] = count;
            record
        };
        let records = vec![
            with_count(json!(2)),
            with_count(json!(2.0)),
            with_count(json!(-1)),
            with_count(json!("three")),
            base.clone(),
        ];

        let counts: Vec<usize> = extract_elements(&records, ExtractOptions::default())
            .iter()
            .map(TextElement::line_count)
            .collect();
        assert_eq!(counts, vec![2, 2, 1, 1, 1]);
    }

    #[test]
    fn test_color_source_kept_with_colors() {
        let records = vec![
            json!({
                "text": "a", "confidence": 0.9, "x": 0, "y": 0, "width": 10, "height": 10,
                "background_color": {"rgb": [1, 2, 3]},
                "color_source": "kmeans"
            }),
            json!({
                "text": "b", "confidence": 0.9, "x": 0, "y": 0, "width": 10, "height": 10,
                "color_source": "kmeans"
            }),
        ];

        let elements = extract_elements(&records, ExtractOptions::default());
        let hints = elements[0].color_hints.as_ref().unwrap();
        assert_eq!(hints.source.as_deref(), Some("kmeans"));
        assert!(elements[1].color_hints.is_none());
    }

    #[test]
    fn test_char_level_default() {
        let records = vec![
            json!({"text": "a", "confidence": 1.0, "x": 0, "y": 0, "width": 5, "height": 10}),
            json!({"text": "b", "confidence": 1.0, "x": 6, "y": 0, "width": 5, "height": 10, "is_character": false}),
        ];

        let elements = extract_elements(&records, ExtractOptions { default_is_character: true });
        assert_eq!(elements[0].granularity, Granularity::Character);
        assert_eq!(elements[1].granularity, Granularity::Word);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let records = vec![
            // Missing text
            json!({"confidence": 0.9, "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]]}),
            // Blank text
            json!({"text": "  ", "confidence": 0.9, "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]]}),
            // Missing confidence
            json!({"text": "a", "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]]}),
            // Null confidence
            json!({"text": "a", "confidence": null, "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]]}),
            // Too few points
            json!({"text": "a", "confidence": 0.9, "vertices": [[0, 0], [10, 0], [10, 10]]}),
            // Zero width
            json!({"text": "a", "confidence": 0.9, "vertices": [[5, 0], [5, 0], [5, 10], [5, 10]]}),
            // Wrong type
            json!({"text": 42, "confidence": 0.9, "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]]}),
            // Not an object
            json!("garbage"),
            // No geometry
            json!({"text": "a", "confidence": 0.9}),
            json!({"text": "ok", "confidence": 0.9, "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]]}),
        ];

        let elements = extract_elements(&records, ExtractOptions::default());
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].text, "ok");
    }

    #[test]
    fn test_short_points_are_ignored() {
        let records = vec![json!({
            "text": "a",
            "confidence": 0.9,
            "vertices": [[0, 0], [10], [10, 10], [0, 10], [10, 0]]
        })];

        let elements = extract_elements(&records, ExtractOptions::default());
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].polygon.len(), 4);
    }

    #[test]
    fn test_line_count_is_kept() {
        let records = vec![json!({
            "text": "Line one Line two",
            "confidence": 0.9,
            "rect": [[0, 0], [100, 0], [100, 45], [0, 45]],
            "line_count": 2
        })];

        let elements = extract_elements(&records, ExtractOptions::default());
        assert_eq!(elements[0].line_count(), 2);
        assert!((elements[0].line_height() - 22.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_color_rgb() {
        let color = parse_color(&json!({"rgb": [255, 300, -4], "hex": "#ff0000", "percentage": 42.5})).unwrap();
        assert_eq!(color.rgb, [255, 255, 0]);
        assert_eq!(color.hex.as_deref(), Some("#ff0000"));
        assert!((color.percentage - 42.5).abs() < 0.001);
    }

    #[test]
    fn test_parse_color_bgr_fallback() {
        let color = parse_color(&json!({"bgr": [10, 20, 30]})).unwrap();
        assert_eq!(color.rgb, [30, 20, 10]);
        assert!(color.hex.is_none());
        assert_eq!(color.percentage, 0.0);
    }

    #[test]
    fn test_parse_color_invalid() {
        assert!(parse_color(&json!({"rgb": [1, 2]})).is_none());
        assert!(parse_color(&json!("red")).is_none());
        assert!(parse_color(&json!({"percentage": 10})).is_none());
    }

    #[test]
    fn test_color_hints_attached() {
        let records = vec![json!({
            "text": "a",
            "confidence": 0.9,
            "vertices": [[0, 0], [10, 0], [10, 10], [0, 10]],
            "background_color": {"rgb": [1, 2, 3], "hex": "#010203", "percentage": 60.0},
            "foreground_color": "bogus"
        })];

        let elements = extract_elements(&records, ExtractOptions::default());
        let hints = elements[0].color_hints.as_ref().unwrap();
        assert!(hints.foreground.is_none());
        assert_eq!(hints.background.as_ref().unwrap().rgb, [1, 2, 3]);
    }
}
