//! Block Detection
//!
//! Rebuilds reading units from raw OCR fragments:
//! - extract leaf elements and drop low-confidence ones
//! - merge characters into words
//! - merge words into lines, split at wide horizontal gaps
//! - merge lines into paragraphs
//! - aggregate colors and emit one record per paragraph
//!
//! Every call is self-contained: the config is read once, nothing is cached
//! between calls.

pub mod characters;
pub mod color;
pub mod element;
pub mod extract;
pub mod filter;
pub mod language;
pub mod lines;
pub mod output;
pub mod paragraphs;
pub mod payload;

use serde_json::Value;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};

use crate::config::BlockDetectionConfig;

pub use element::{ColorHints, ColorInfo, ColorSample, Granularity, Rect, TextElement};
pub use extract::{ExtractOptions, RawFragment};
pub use language::LanguageClass;
pub use output::ParagraphRecord;
pub use payload::OcrPayload;

/// Failures inside the block detection pipeline
#[derive(Debug, thiserror::Error)]
pub enum BlockError {
    #[error("invalid OCR payload: {0}")]
    InvalidPayload(String),
    #[error("failed to serialize paragraph record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One configured block detection pass
#[derive(Debug, Clone)]
pub struct BlockDetector {
    config: BlockDetectionConfig,
}

impl Default for BlockDetector {
    fn default() -> Self {
        Self::new(BlockDetectionConfig::default())
    }
}

impl BlockDetector {
    /// Create a detector; out-of-range knobs are clamped
    pub fn new(config: BlockDetectionConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &BlockDetectionConfig {
        &self.config
    }

    /// Run filtering and grouping over extracted leaves, returning paragraphs
    pub fn group(&self, leaves: Vec<TextElement>) -> Vec<TextElement> {
        let config = &self.config;
        let class = config.language_class();

        let leaves = filter::filter_leaves(
            leaves,
            config.min_character_confidence,
            config.min_line_confidence,
        );
        let words = characters::group_characters(leaves, config, class);
        let lines = lines::group_lines(words, config, class);
        let lines = filter::filter_below(lines, config.min_line_confidence);
        paragraphs::group_paragraphs(lines, config, class)
    }

    /// Full typed pipeline from raw records to paragraph records
    pub fn detect(&self, records: &[Value], options: ExtractOptions) -> Vec<ParagraphRecord> {
        let leaves = extract::extract_elements(records, options);
        debug!("Extracted {} of {} OCR records", leaves.len(), records.len());

        let paragraphs = self.group(leaves);
        output::build_records(&paragraphs, self.config.min_text_length)
    }

    /// Detect and serialize, reporting failures
    pub fn try_process(&self, records: &[Value], options: ExtractOptions) -> Result<Vec<Value>, BlockError> {
        self.detect(records, options)
            .into_iter()
            .map(|record| serde_json::to_value(record).map_err(BlockError::from))
            .collect()
    }

    /// Detect and serialize; on any failure the input records come back verbatim
    pub fn process(&self, records: &[Value], options: ExtractOptions) -> Vec<Value> {
        fallback_on_failure(records, |records| self.try_process(records, options))
    }
}

/// Run `run` over `records`, answering errors and panics with the records themselves
fn fallback_on_failure<F>(records: &[Value], run: F) -> Vec<Value>
where
    F: FnOnce(&[Value]) -> Result<Vec<Value>, BlockError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| run(records))) {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!("Block detection failed, returning OCR results unchanged: {}", e);
            records.to_vec()
        }
        Err(_) => {
            error!("Block detection panicked, returning OCR results unchanged");
            records.to_vec()
        }
    }
}

/// Group a list of raw OCR records into paragraph records
pub fn process_results(records: &[Value], config: &BlockDetectionConfig) -> Vec<Value> {
    BlockDetector::new(config.clone()).process(records, ExtractOptions::default())
}

/// Group a parsed payload, keeping its envelope
///
/// The payload's `language`, when present, takes precedence over the
/// configured source language.
pub fn process_payload(payload: OcrPayload, config: &BlockDetectionConfig) -> Value {
    let mut config = config.clone();
    if let Some(language) = &payload.language {
        config.set_source_language(language.as_str());
    }

    let texts = BlockDetector::new(config).process(&payload.records, payload.extract_options());
    payload.into_output(texts)
}

/// Group an arbitrary JSON payload; unusable input is returned unchanged
pub fn process_value(input: Value, config: &BlockDetectionConfig) -> Value {
    match OcrPayload::from_value(input.clone()) {
        Ok(payload) => process_payload(payload, config),
        Err(e) => {
            warn!("{}, returning input unchanged", e);
            input
        }
    }
}
