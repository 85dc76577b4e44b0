use crate::core::encoder::{encode, EncodeError, ImageInput};
use crate::core::extractor::{extract_record, Extraction};
use crate::models::{BreedRecord, BreedStat};
use crate::services::{CompletionSource, InferenceError, StatsStore, StoreError};
use std::sync::Arc;
use thiserror::Error;

/// Failures of a single analysis request
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("{0}")]
    MissingInput(String),

    #[error("Unreadable image: {0}")]
    InvalidImage(#[source] image::ImageError),

    #[error("Upload exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Vision API call failed: {0}")]
    Upstream(#[from] InferenceError),

    #[error("Error parsing JSON response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AnalysisError {
    /// HTTP status the request should end with
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::MissingInput(_) | AnalysisError::InvalidImage(_) => 400,
            AnalysisError::PayloadTooLarge(_) => 413,
            AnalysisError::Upstream(_)
            | AnalysisError::MalformedResponse(_)
            | AnalysisError::Storage(_) => 500,
        }
    }
}

impl From<EncodeError> for AnalysisError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Empty => AnalysisError::MissingInput("No image data provided".to_string()),
            EncodeError::InvalidImage(e) => AnalysisError::InvalidImage(e),
        }
    }
}

/// Successful end states of an analysis
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The model reply held no JSON object, usually because there was no dog
    NoDetection,
    /// A record was parsed; `stat` is set when breed and breed group were both present
    Recorded {
        record: BreedRecord,
        stat: Option<BreedStat>,
    },
}

/// Image → vision model → JSON extraction → statistics upsert
///
/// # Stages
/// 1. Encode the upload as base64
/// 2. Ask the vision model to describe the dog
/// 3. Pull the JSON object out of the reply
/// 4. Store the record and bump the (breed, breed_group) counter
#[derive(Clone)]
pub struct AnalysisPipeline {
    source: Arc<dyn CompletionSource>,
    store: Arc<dyn StatsStore>,
    persist_records: bool,
}

impl AnalysisPipeline {
    pub fn new(
        source: Arc<dyn CompletionSource>,
        store: Arc<dyn StatsStore>,
        persist_records: bool,
    ) -> Self {
        Self {
            source,
            store,
            persist_records,
        }
    }

    /// Run one upload through every stage
    pub async fn analyze(&self, input: ImageInput) -> Result<AnalysisOutcome, AnalysisError> {
        let image_base64 = encode(input)?;
        tracing::debug!("Image encoded ({} base64 chars), awaiting inference", image_base64.len());

        let text = self.source.describe_image(&image_base64).await.map_err(|e| {
            tracing::error!("Vision API call failed: {}", e);
            e
        })?;

        self.record_completion(&text).await
    }

    /// Extract and record the result of a completion that already came back
    pub async fn record_completion(&self, text: &str) -> Result<AnalysisOutcome, AnalysisError> {
        tracing::debug!("Completion text: {}", text);

        let record = match extract_record(text) {
            Ok(Extraction::Found(record)) => record,
            Ok(Extraction::NoDetection) => {
                tracing::info!("No JSON object in completion, treating as no dog detected");
                return Ok(AnalysisOutcome::NoDetection);
            }
            Err(e) => {
                tracing::error!("Error parsing JSON: {}", e);
                return Err(AnalysisError::MalformedResponse(e));
            }
        };

        if self.persist_records {
            self.store.insert_record(&record).await.map_err(|e| {
                tracing::error!("Failed to store breed record: {}", e);
                e
            })?;
        }

        let stat = match record.stat_key() {
            Some((breed, breed_group)) => {
                let stat = self.store.increment_stat(breed, breed_group).await.map_err(|e| {
                    tracing::error!("Failed to update stats for {}/{}: {}", breed, breed_group, e);
                    e
                })?;
                Some(stat)
            }
            None => {
                tracing::debug!("Record has no breed/breed_group pair, stats unchanged");
                None
            }
        };

        Ok(AnalysisOutcome::Recorded { record, stat })
    }
}
