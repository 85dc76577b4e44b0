//! Breedlens - dog photo analysis service
//!
//! Uploaded photos are sent to a vision model, the JSON description in its reply is
//! extracted, and per-breed statistics are kept with an atomic upsert.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use self::core::{AnalysisError, AnalysisOutcome, AnalysisPipeline, ImageInput, extract_record, Extraction};
pub use models::{BreedRecord, BreedStat, BreedCount};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(extract_record("no dog here").unwrap(), Extraction::NoDetection);
    }
}
