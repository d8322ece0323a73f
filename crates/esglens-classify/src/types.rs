use serde::Deserialize;

/// One (topic label, membership probability) pair from the classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct TopicScore {
    pub label: String,
    /// Membership probability in [0, 1].
    pub probability: f64,
}

/// The classifier's verdict on one article text.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Sentiment rating in [0, 10]: 0 negative, 5 neutral, 10 positive.
    pub sentiment: f64,
    /// Topic scores ranked by descending probability.
    pub topics: Vec<TopicScore>,
}

/// Accelerator status reported by the inference service.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AcceleratorInfo {
    /// Whether an accelerator is present and usable.
    #[serde(rename = "accelerator")]
    pub available: bool,
    /// Total accelerator memory in whole gigabytes; 0 when unavailable.
    #[serde(rename = "accelerator_memory_gb", default)]
    pub memory_gb: u64,
}
