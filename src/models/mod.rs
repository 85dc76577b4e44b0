// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BreedRecord, BreedStat, BreedCount};
pub use requests::Base64ImageRequest;
pub use responses::{BreedDataResponse, ErrorResponse, HealthResponse, NoDetectionResponse, ViewDataResponse, NO_DOG_DETECTED};
