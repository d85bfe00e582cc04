//! Block Detect - reading-unit reconstruction for OCR output
//!
//! Groups raw OCR fragments (characters, words or lines with bounding
//! polygons) into words, lines and paragraphs ready for translation.

pub mod blocks;
pub mod config;
pub mod shared;
pub mod storage;

pub use blocks::{
    process_payload, process_results, process_value, BlockDetector, BlockError, OcrPayload,
    ParagraphRecord, TextElement,
};
pub use config::{AppConfig, BlockDetectionConfig};
pub use shared::SharedSettings;
