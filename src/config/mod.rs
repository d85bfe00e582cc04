//! Application Configuration
//!
//! Block detection knobs and output preferences stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::blocks::language::LanguageClass;

/// Smallest accepted glue or gap factor
pub const MIN_GLUE_FACTOR: f32 = 0.05;
/// Smallest accepted block detection scale
pub const MIN_BLOCK_DETECTION_SCALE: f32 = 0.1;
/// Western line gaps are this much more forgiving than CJK ones
pub const WESTERN_LINE_GAP_INFLATION: f32 = 1.2;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Grouping thresholds
    pub block_detection: BlockDetectionConfig,
    /// Output settings
    pub output: OutputSettings,
}

impl AppConfig {
    /// Clamp every block detection knob into its valid range
    pub fn sanitized(mut self) -> Self {
        self.block_detection = self.block_detection.sanitized();
        self
    }
}

/// Output-related settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pretty-print JSON output
    pub pretty: bool,
}

/// Thresholds read by one block detection pass
///
/// Distances are expressed in units of the local glyph or line height, so the
/// same values work across capture resolutions. `block_detection_scale`
/// multiplies every distance threshold uniformly; at 1.0 the per-feature glue
/// factors apply unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockDetectionConfig {
    /// Character fragments below this confidence are dropped before grouping
    pub min_character_confidence: f32,
    /// Word/line fragments and grouped lines below this confidence are dropped
    pub min_line_confidence: f32,
    /// Paragraphs with fewer characters than this are discarded as noise
    pub min_text_length: usize,
    /// Letter gap allowed inside a word for Western languages (x glyph height)
    pub character_gap_western: f32,
    /// Letter gap allowed inside a word for CJK languages (x glyph height)
    pub character_gap_cjk: f32,
    /// Horizontal gap allowed between segments of one line (x line height)
    pub horizontal_glue: f32,
    /// Vertical gap allowed between lines of one paragraph (x line height)
    pub vertical_glue: f32,
    /// Above this vertical glue, indentation and font-size checks are skipped
    pub aggressive_glue_threshold: f32,
    /// Minimum horizontal overlap of two lines, as a fraction of the narrower
    pub min_horizontal_overlap: f32,
    /// Left-edge shift that starts a new paragraph (x line height)
    pub indentation_factor: f32,
    /// Relative line-height difference that starts a new paragraph
    pub font_size_tolerance: f32,
    /// Join paragraph lines with a line break instead of a space
    pub keep_linefeeds: bool,
    /// Source language code, selects CJK or Western heuristics
    pub source_language: String,
    /// Uniform multiplier over every distance threshold
    pub block_detection_scale: f32,
}

impl Default for BlockDetectionConfig {
    fn default() -> Self {
        Self {
            min_character_confidence: 0.1,
            min_line_confidence: 0.1,
            min_text_length: 1,
            character_gap_western: 0.25,
            character_gap_cjk: 0.5,
            horizontal_glue: 1.0,
            vertical_glue: 1.0,
            aggressive_glue_threshold: 2.0,
            min_horizontal_overlap: 0.3,
            indentation_factor: 3.0,
            font_size_tolerance: 0.4,
            keep_linefeeds: false,
            source_language: "en".to_string(),
            block_detection_scale: 1.0,
        }
    }
}

impl BlockDetectionConfig {
    /// Return a copy with every knob clamped into its valid range
    pub fn sanitized(mut self) -> Self {
        let c = self.clone();
        self.set_min_character_confidence(c.min_character_confidence);
        self.set_min_line_confidence(c.min_line_confidence);
        self.set_character_gaps(c.character_gap_western, c.character_gap_cjk);
        self.set_horizontal_glue(c.horizontal_glue);
        self.set_vertical_glue(c.vertical_glue);
        self.set_aggressive_glue_threshold(c.aggressive_glue_threshold);
        self.set_min_horizontal_overlap(c.min_horizontal_overlap);
        self.set_indentation_factor(c.indentation_factor);
        self.set_font_size_tolerance(c.font_size_tolerance);
        self.set_block_detection_scale(c.block_detection_scale);
        self
    }

    pub fn set_min_character_confidence(&mut self, value: f32) {
        self.min_character_confidence = clamp_unit(value);
    }

    pub fn set_min_line_confidence(&mut self, value: f32) {
        self.min_line_confidence = clamp_unit(value);
    }

    pub fn set_min_text_length(&mut self, value: usize) {
        self.min_text_length = value;
    }

    pub fn set_character_gaps(&mut self, western: f32, cjk: f32) {
        self.character_gap_western = clamp_min(western, MIN_GLUE_FACTOR);
        self.character_gap_cjk = clamp_min(cjk, MIN_GLUE_FACTOR);
    }

    pub fn set_horizontal_glue(&mut self, value: f32) {
        self.horizontal_glue = clamp_min(value, MIN_GLUE_FACTOR);
    }

    pub fn set_vertical_glue(&mut self, value: f32) {
        self.vertical_glue = clamp_min(value, MIN_GLUE_FACTOR);
    }

    pub fn set_aggressive_glue_threshold(&mut self, value: f32) {
        self.aggressive_glue_threshold = clamp_min(value, MIN_GLUE_FACTOR);
    }

    pub fn set_min_horizontal_overlap(&mut self, value: f32) {
        self.min_horizontal_overlap = clamp_unit(value);
    }

    pub fn set_indentation_factor(&mut self, value: f32) {
        self.indentation_factor = clamp_min(value, MIN_GLUE_FACTOR);
    }

    pub fn set_font_size_tolerance(&mut self, value: f32) {
        self.font_size_tolerance = clamp_unit(value);
    }

    pub fn set_keep_linefeeds(&mut self, keep: bool) {
        self.keep_linefeeds = keep;
    }

    pub fn set_source_language(&mut self, code: impl Into<String>) {
        self.source_language = code.into();
    }

    pub fn set_block_detection_scale(&mut self, value: f32) {
        self.block_detection_scale = clamp_min(value, MIN_BLOCK_DETECTION_SCALE);
    }

    pub fn language_class(&self) -> LanguageClass {
        LanguageClass::from_code(&self.source_language)
    }

    /// Letter gap inside a word, in glyph heights
    pub fn character_gap_factor(&self, class: LanguageClass) -> f32 {
        let base = match class {
            LanguageClass::Cjk => self.character_gap_cjk,
            LanguageClass::Western => self.character_gap_western,
        };
        (base * self.block_detection_scale).max(MIN_GLUE_FACTOR)
    }

    /// Segment gap inside a line, in line heights
    pub fn line_gap_factor(&self, class: LanguageClass) -> f32 {
        let inflation = match class {
            LanguageClass::Cjk => 1.0,
            LanguageClass::Western => WESTERN_LINE_GAP_INFLATION,
        };
        (self.horizontal_glue * inflation * self.block_detection_scale).max(MIN_GLUE_FACTOR)
    }

    /// Line gap inside a paragraph, in line heights
    pub fn paragraph_gap_factor(&self) -> f32 {
        (self.vertical_glue * self.block_detection_scale).max(MIN_GLUE_FACTOR)
    }

    /// Whether the user asked for glue strong enough to override layout checks
    pub fn is_aggressive_glue(&self) -> bool {
        self.vertical_glue > self.aggressive_glue_threshold
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn clamp_min(value: f32, min: f32) -> f32 {
    if value.is_finite() {
        value.max(min)
    } else {
        min
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    Ok(config.sanitized())
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
