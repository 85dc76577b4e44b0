use serde::{Deserialize, Serialize};
use validator::Validate;

/// JSON upload carrying an already base64-encoded image
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Base64ImageRequest {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub image: String,
}
