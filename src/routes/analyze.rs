use actix_multipart::Multipart;
use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use futures::StreamExt;
use validator::Validate;
use crate::core::{AnalysisError, AnalysisOutcome, ImageInput};
use crate::models::{Base64ImageRequest, ErrorResponse, NoDetectionResponse};
use crate::routes::AppState;

/// Configure upload and analysis routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/upload", web::post().to(upload))
        .route("/upload_and_analyze", web::post().to(upload_and_analyze))
        .route("/upload_base64_return_info", web::post().to(upload_base64_return_info));
}

/// A single file part pulled out of a multipart body
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Read the part named `field_name`, skipping any others
///
/// Returns `Ok(None)` when the body has no such part.
pub async fn read_file_field(
    payload: &mut Multipart,
    field_name: &str,
    max_bytes: usize,
) -> Result<Option<UploadedFile>, AnalysisError> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AnalysisError::MissingInput(format!("Invalid multipart body: {}", e)))?;
        let wanted = field.name() == Some(field_name);
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AnalysisError::MissingInput(format!("Invalid multipart body: {}", e)))?;
            if !wanted {
                continue;
            }
            if bytes.len() + chunk.len() > max_bytes {
                return Err(AnalysisError::PayloadTooLarge(max_bytes));
            }
            bytes.extend_from_slice(&chunk);
        }

        if wanted {
            return Ok(Some(UploadedFile { filename, bytes }));
        }
    }

    Ok(None)
}

fn error_response(err: &AnalysisError) -> HttpResponse {
    let status_code = err.status_code();
    let error = match err {
        AnalysisError::MissingInput(message) => message.clone(),
        AnalysisError::InvalidImage(_) => "Failed to process image".to_string(),
        AnalysisError::PayloadTooLarge(_) => "Upload too large".to_string(),
        AnalysisError::Upstream(_) => "Failed to analyze image content".to_string(),
        AnalysisError::MalformedResponse(_) => "Error parsing JSON response".to_string(),
        AnalysisError::Storage(_) => "Failed to record breed statistics".to_string(),
    };

    HttpResponse::build(StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .json(ErrorResponse {
            error,
            message: err.to_string(),
            status_code,
        })
}

fn missing_input(message: &str) -> HttpResponse {
    error_response(&AnalysisError::MissingInput(message.to_string()))
}

/// Turn a pipeline result into the response body
///
/// Both a parsed record and "no dog detected" answer 200.
async fn respond(state: &AppState, result: Result<AnalysisOutcome, AnalysisError>) -> HttpResponse {
    match result {
        Ok(AnalysisOutcome::Recorded { record, stat }) => {
            if let Some(stat) = stat {
                tracing::info!("Recorded {}/{} (count: {})", stat.breed, stat.breed_group, stat.count);
                state.cache.invalidate_stats().await;
            }
            HttpResponse::Ok().json(record)
        }
        Ok(AnalysisOutcome::NoDetection) => HttpResponse::Ok().json(NoDetectionResponse::default()),
        Err(e) => {
            tracing::error!("Analysis failed: {}", e);
            error_response(&e)
        }
    }
}

/// Analyze a multipart upload
///
/// POST /upload
///
/// The file goes under the `image` field and is sent to the model as uploaded.
async fn upload(state: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    let file = match read_file_field(&mut payload, "image", state.max_upload_bytes).await {
        Ok(Some(file)) => file,
        Ok(None) => return missing_input("No file part"),
        Err(e) => return error_response(&e),
    };

    if file.filename.as_deref().map_or(true, str::is_empty) {
        return missing_input("No selected file");
    }

    let result = state.pipeline.analyze(ImageInput::Raw(file.bytes)).await;
    respond(&state, result).await
}

/// Analyze a multipart upload after re-encoding it as JPEG
///
/// POST /upload_and_analyze
///
/// The file goes under the `file` field; any format the image decoder reads is accepted.
async fn upload_and_analyze(state: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    let file = match read_file_field(&mut payload, "file", state.max_upload_bytes).await {
        Ok(Some(file)) => file,
        Ok(None) => return missing_input("No file provided"),
        Err(e) => return error_response(&e),
    };

    let result = state.pipeline.analyze(ImageInput::Normalized(file.bytes)).await;
    respond(&state, result).await
}

/// Analyze an image sent as base64 JSON
///
/// POST /upload_base64_return_info
///
/// Request body:
/// ```json
/// { "image": "<base64>" }
/// ```
async fn upload_base64_return_info(
    state: web::Data<AppState>,
    req: web::Json<Base64ImageRequest>,
) -> impl Responder {
    if req.validate().is_err() {
        return missing_input("No image data provided");
    }

    let Base64ImageRequest { image } = req.into_inner();
    tracing::debug!("Received base64 image ({} chars)", image.len());

    let result = state.pipeline.analyze(ImageInput::Base64(image)).await;
    respond(&state, result).await
}
