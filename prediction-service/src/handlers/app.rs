use axum::{extract::State, response::Html};
use service_core::error::AppError;

use crate::startup::AppState;

/// Serves the HTML form. The file is read on every request so edits show up without a restart.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let page = tokio::fs::read_to_string(state.index_template.as_path())
        .await
        .map_err(|e| {
            tracing::error!(
                path = %state.index_template.display(),
                error = %e,
                "Failed to read index template"
            );
            AppError::InternalError(anyhow::Error::new(e))
        })?;

    Ok(Html(page))
}
