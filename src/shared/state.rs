//! Thread-safe block detection settings

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::blocks::BlockDetector;
use crate::config::BlockDetectionConfig;

/// Cloneable handle to the process-wide block detection settings
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<BlockDetectionConfig>>,
}

impl SharedSettings {
    /// Create shared settings from an initial config
    pub fn new(config: BlockDetectionConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config.sanitized())),
        }
    }

    /// Copy of the current settings for one detection pass
    pub fn snapshot(&self) -> BlockDetectionConfig {
        self.inner.read().clone()
    }

    /// Detector bound to the current settings
    pub fn detector(&self) -> BlockDetector {
        BlockDetector::new(self.snapshot())
    }

    /// Apply a change through the clamping setters
    pub fn update(&self, f: impl FnOnce(&mut BlockDetectionConfig)) {
        let mut config = self.inner.write();
        f(&mut *config);
        debug!(
            "Block detection settings updated: horizontal glue {:.2}, vertical glue {:.2}, scale {:.2}",
            config.horizontal_glue, config.vertical_glue, config.block_detection_scale
        );
    }

    /// Replace the whole config
    pub fn replace(&self, config: BlockDetectionConfig) {
        *self.inner.write() = config.sanitized();
    }

    pub fn set_horizontal_glue(&self, value: f32) {
        self.update(|c| c.set_horizontal_glue(value));
    }

    pub fn set_vertical_glue(&self, value: f32) {
        self.update(|c| c.set_vertical_glue(value));
    }

    pub fn set_block_detection_scale(&self, value: f32) {
        self.update(|c| c.set_block_detection_scale(value));
    }

    pub fn set_keep_linefeeds(&self, keep: bool) {
        self.update(|c| c.set_keep_linefeeds(keep));
    }

    pub fn set_source_language(&self, code: &str) {
        self.update(|c| c.set_source_language(code));
    }
}
