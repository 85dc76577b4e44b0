// Analysis pipeline exports
pub mod encoder;
pub mod extractor;
pub mod pipeline;

pub use encoder::{encode, to_jpeg, EncodeError, ImageInput};
pub use extractor::{extract_record, find_json_span, Extraction};
pub use pipeline::{AnalysisError, AnalysisOutcome, AnalysisPipeline};
