//! Engine Configuration

use kestrel_dom::Vector2i;
use serde::{Deserialize, Serialize};

/// Context configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window dimensions in pixels; filter regions are clamped to it
    pub viewport: Vector2i,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Document URL, reported as the source of inline declarations
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport: Vector2i::new(1024, 768),
            log_filter: "info".to_string(),
            base_url: "mem://document".to_string(),
        }
    }
}

impl Config {
    pub fn with_viewport(mut self, width: i32, height: i32) -> Self {
        self.viewport = Vector2i::new(width, height);
        self
    }

    pub fn with_log_filter(mut self, filter: &str) -> Self {
        self.log_filter = filter.to_string();
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }
}
