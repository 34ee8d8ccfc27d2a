//! Axum route handlers for the Outline API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::ReferenceImage;
use crate::outline::generator::{OutlineGenerator, OutlineResult};
use crate::state::AppState;

const TOPIC_FIELD: &str = "topic";
const IMAGES_FIELD: &str = "images";

/// POST /api/outline
///
/// Multipart form: one `topic` text field and any number of `images` file
/// fields. Each image keeps the MIME type its part declares, or one guessed
/// from its file name. Builds a fresh generator for the request, then generates and
/// parses the outline.
pub async fn handle_generate_outline(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<OutlineResult>, AppError> {
    let mut topic: Option<String> = None;
    let mut images: Vec<ReferenceImage> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            TOPIC_FIELD => topic = Some(field.text().await?),
            IMAGES_FIELD => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let data = field.bytes().await?;
                // Browsers submit an empty part for an untouched file input.
                if !data.is_empty() {
                    images.push(ReferenceImage::from_upload(
                        data,
                        content_type.as_deref(),
                        file_name.as_deref(),
                    ));
                }
            }
            _ => {}
        }
    }

    let topic = topic
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("topic cannot be empty".to_string()))?;

    let generator = OutlineGenerator::from_config(&state.config, state.http.clone())?;
    info!(
        provider = generator.provider_config().active_provider(),
        image_count = images.len(),
        "Outline request accepted"
    );

    let result = generator.generate(&topic, &images).await?;

    Ok(Json(result))
}
