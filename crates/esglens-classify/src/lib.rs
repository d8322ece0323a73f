//! Classification Capability client for esglens.
//!
//! Talks to the inference service that hosts the sentiment and
//! sustainability-topic models. The service is a black box to the rest of
//! the system: one call per article text, returning a sentiment rating and a
//! ranked topic/probability list that must include the distinguished
//! [`NOT_RELEVANT_LABEL`].

mod client;
mod error;
mod rating;
mod types;

pub use client::InferenceClient;
pub use error::ClassifyError;
pub use rating::sentiment_rating;
pub use types::{AcceleratorInfo, Classification, TopicScore};

/// The distinguished "not relevant" label the classifier must always emit.
///
/// Relevancy is derived as `1 - P(NOT_RELEVANT_LABEL)`; its absence is a
/// contract violation, never silently defaulted.
pub const NOT_RELEVANT_LABEL: &str = "Not Relevant to ESG";
