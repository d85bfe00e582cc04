//! Paragraph color aggregation
//!
//! Each leaf may carry the OCR back-end's foreground/background estimate.
//! A paragraph's color is the confidence-weighted mean over its leaves, with
//! every leaf weighing at least [`MIN_COLOR_WEIGHT`].

use super::element::{ColorInfo, ColorSample, TextElement};

/// Floor on a leaf's weight so near-zero confidence still counts
pub const MIN_COLOR_WEIGHT: f32 = 0.1;

/// Aggregated colors of one paragraph; `None` means no leaf had a hint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedColors {
    pub foreground: Option<ColorInfo>,
    pub background: Option<ColorInfo>,
    /// Estimator tag of the first leaf that carried one
    pub source: Option<String>,
}

#[derive(Debug, Default)]
struct WeightedColor {
    channels: [f64; 3],
    percentage: f64,
    weight: f64,
    hex: Option<String>,
}

impl WeightedColor {
    fn add(&mut self, sample: &ColorSample, confidence: f32) {
        let weight = f64::from(confidence.max(MIN_COLOR_WEIGHT));
        for (sum, channel) in self.channels.iter_mut().zip(sample.rgb) {
            *sum += f64::from(channel) * weight;
        }
        self.percentage += f64::from(sample.percentage) * weight;
        self.weight += weight;
        if self.hex.is_none() {
            self.hex = sample.hex.clone();
        }
    }

    fn finish(self) -> Option<ColorInfo> {
        if self.weight <= 0.0 {
            return None;
        }

        let rgb = self
            .channels
            .map(|sum| (sum / self.weight).round().clamp(0.0, 255.0) as u8);
        let hex = self.hex.unwrap_or_else(|| to_hex(rgb));

        Some(ColorInfo {
            rgb,
            hex,
            percentage: (self.percentage / self.weight) as f32,
        })
    }
}

/// Weighted-average the color hints of every leaf under `paragraph`
pub fn aggregate_colors(paragraph: &TextElement) -> AggregatedColors {
    let mut foreground = WeightedColor::default();
    let mut background = WeightedColor::default();
    let mut source = None;

    for leaf in paragraph.leaves() {
        let Some(hints) = &leaf.color_hints else {
            continue;
        };
        if source.is_none() {
            source = hints.source.clone();
        }
        if let Some(sample) = &hints.foreground {
            foreground.add(sample, leaf.confidence);
        }
        if let Some(sample) = &hints.background {
            background.add(sample, leaf.confidence);
        }
    }

    AggregatedColors {
        foreground: foreground.finish(),
        background: background.finish(),
        source,
    }
}

/// `#rrggbb` for an RGB triple
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
