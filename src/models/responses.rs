use serde::{Deserialize, Serialize};
use crate::models::domain::{BreedCount, BreedStat};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Returned with 200 when the model reply holds no JSON object.
///
/// Shares the status code of a successful analysis; clients tell the two apart by
/// the `error` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoDetectionResponse {
    pub error: String,
}

pub const NO_DOG_DETECTED: &str =
    "No dog detected in the image. Please upload an image with a clear view of a dog.";

impl Default for NoDetectionResponse {
    fn default() -> Self {
        Self {
            error: NO_DOG_DETECTED.to_string(),
        }
    }
}

/// Dashboard totals per breed and per breed group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedDataResponse {
    pub breed_data: Vec<BreedCount>,
    pub breed_group_data: Vec<BreedCount>,
}

/// Raw dump of the statistics table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewDataResponse {
    pub breed_stats: Vec<BreedStat>,
}
