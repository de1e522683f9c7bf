use serde::{Deserialize, Serialize};

/// Parameters handed to the sensor's watch call. The sensor owns timeouts and
/// retries; the feed only passes these through.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    /// Oldest cached fix the sensor may hand back.
    pub max_sample_age_ms: u64,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 20_000,
            max_sample_age_ms: 2_000,
        }
    }
}
