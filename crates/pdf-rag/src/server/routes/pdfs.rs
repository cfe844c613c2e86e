//! PDF corpus endpoints: listing, serving, upload, and removal

use std::path::Path as FsPath;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::ingestion::{validate_pdf_name, UploadOutcome};
use crate::server::state::AppState;

/// Names of the stored PDF files
#[derive(Debug, Serialize)]
pub struct PdfListResponse {
    pub pdfs: Vec<String>,
}

/// Per-file upload outcomes and their counts
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub added: usize,
    pub skipped: usize,
    pub failed: usize,
    pub files: Vec<FileOutcome>,
}

/// What happened to one uploaded file
#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub filename: String,
    pub status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_added: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Added,
    Skipped,
    Failed,
}

/// Result of removing one document
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub filename: String,
    pub removed_chunks: usize,
}

/// Failure detail for one file in a batch removal
#[derive(Debug, Serialize)]
pub struct RemoveError {
    pub filename: String,
    pub error: String,
}

/// Batch removal report
#[derive(Debug, Serialize)]
pub struct RemoveAllResponse {
    pub removed: Vec<RemoveResponse>,
    pub errors: Vec<RemoveError>,
}

/// GET /pdfs - List the stored PDF files
pub async fn list_pdfs(State(state): State<AppState>) -> Result<Json<PdfListResponse>> {
    let pdfs = list_pdf_names(&state.config().storage.pdf_dir).await?;
    Ok(Json(PdfListResponse { pdfs }))
}

/// GET /pdfs/:name - Serve a stored PDF
pub async fn get_pdf(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    validate_pdf_name(&name)?;

    let path = state.config().storage.pdf_path(&name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::not_found(format!("File '{}'", name)));
        }
        Err(e) => return Err(e.into()),
    };

    let content_type = mime_guess::from_path(&name).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, content_type.to_string())], bytes))
}

/// POST /upload/pdf - Store and index uploaded PDFs.
///
/// Each file gets its own outcome; one bad file never aborts the rest.
pub async fn upload_pdfs(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut files = Vec::new();
    let (mut added, mut skipped, mut failed) = (0usize, 0usize, 0usize);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Internal(format!("Failed to read multipart field: {}", e)))?
    {
        // fields without a filename are not file uploads
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data: Bytes = match field.bytes().await {
            Ok(data) => data,
            Err(e) => {
                failed += 1;
                files.push(FileOutcome {
                    filename,
                    status: UploadStatus::Failed,
                    chunks_added: None,
                    detail: Some(format!("Failed to read upload: {}", e)),
                });
                continue;
            }
        };

        tracing::info!(file = %filename, bytes = data.len(), "Processing upload");

        let outcome = state
            .pipeline()
            .ingest_upload(&state.config().storage.pdf_dir, &filename, &data)
            .await;

        files.push(match outcome {
            UploadOutcome::Added { chunks_added } => {
                added += 1;
                FileOutcome {
                    filename,
                    status: UploadStatus::Added,
                    chunks_added: Some(chunks_added),
                    detail: None,
                }
            }
            UploadOutcome::Skipped { reason } => {
                skipped += 1;
                FileOutcome {
                    filename,
                    status: UploadStatus::Skipped,
                    chunks_added: None,
                    detail: Some(reason),
                }
            }
            UploadOutcome::Failed { error } => {
                failed += 1;
                tracing::error!(file = %filename, error = %error, "Upload failed");
                FileOutcome {
                    filename,
                    status: UploadStatus::Failed,
                    chunks_added: None,
                    detail: Some(error.to_string()),
                }
            }
        });
    }

    Ok(Json(UploadResponse {
        added,
        skipped,
        failed,
        files,
    }))
}

/// DELETE /remove/pdf/:name - Remove one PDF and its indexed chunks
pub async fn remove_pdf(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RemoveResponse>> {
    validate_pdf_name(&name)?;

    if !state.config().storage.pdf_path(&name).exists() {
        return Err(Error::not_found(format!("File '{}'", name)));
    }

    let removed_chunks = remove_stored_pdf(&state, &name).await?;

    Ok(Json(RemoveResponse {
        filename: name,
        removed_chunks,
    }))
}

/// DELETE /remove/pdfs - Remove every stored PDF and its indexed chunks.
///
/// Best effort: failures are collected per file and reported together with
/// a 207 instead of aborting the batch.
pub async fn remove_all_pdfs(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let names = list_pdf_names(&state.config().storage.pdf_dir).await?;

    let mut removed = Vec::new();
    let mut errors = Vec::new();
    for name in names {
        match remove_stored_pdf(&state, &name).await {
            Ok(removed_chunks) => removed.push(RemoveResponse {
                filename: name,
                removed_chunks,
            }),
            Err(error) => {
                tracing::error!(file = %name, error = %error, "Failed to remove document");
                errors.push(RemoveError {
                    filename: name,
                    error: error.to_string(),
                });
            }
        }
    }

    let status = if errors.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };

    Ok((status, Json(RemoveAllResponse { removed, errors })))
}

/// Remove a document's chunks, then its file.
///
/// The order means a failure can leave the file present but unindexed,
/// never indexed chunks without their file; the error says which.
async fn remove_stored_pdf(state: &AppState, name: &str) -> Result<usize> {
    let removed_chunks = state.synchronizer().remove_by_source(name).await?;

    let path = state.config().storage.pdf_path(name);
    tokio::fs::remove_file(&path).await.map_err(|e| {
        Error::Internal(format!(
            "removed {} indexed chunk(s) for '{}' but the file could not be removed: {}",
            removed_chunks, name, e
        ))
    })?;

    tracing::info!(file = %name, removed_chunks, "Removed document");
    Ok(removed_chunks)
}

/// Sorted `.pdf` file names under `dir`; a missing directory lists as empty
async fn list_pdf_names(dir: &FsPath) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        // in-flight uploads are dot-prefixed
        if name.to_ascii_lowercase().ends_with(".pdf") && !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RagConfig;

    async fn temp_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RagConfig::default();
        config.storage.pdf_dir = dir.path().join("pdfs");
        config.storage.index_path = dir.path().join("index.json");
        let state = AppState::new(config).await.unwrap();
        (dir, state)
    }

    #[tokio::test]
    async fn test_list_pdf_names_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.pdf", "notes.txt", ".partial.pdf", "caps.PDF"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let names = list_pdf_names(dir.path()).await.unwrap();
        assert_eq!(names, vec!["a.pdf", "b.pdf", "caps.PDF"]);
    }

    #[tokio::test]
    async fn test_list_pdf_names_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let names = list_pdf_names(&dir.path().join("nothing-here")).await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_get_pdf_rejects_path_traversal() {
        let (_dir, state) = temp_state().await;

        let err = get_pdf(State(state), Path("../evil.pdf".to_string()))
            .await
            .err()
            .expect("traversal name must be rejected");
        assert!(matches!(err, Error::UnsupportedFileType(_)));
    }

    #[tokio::test]
    async fn test_get_pdf_unknown_name_is_not_found() {
        let (_dir, state) = temp_state().await;

        let err = get_pdf(State(state), Path("missing.pdf".to_string()))
            .await
            .err()
            .expect("missing file must 404");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_pdf_deletes_file_and_reports_chunk_count() {
        let (_dir, state) = temp_state().await;
        let path = state.config().storage.pdf_path("stored.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let Json(response) = remove_pdf(State(state.clone()), Path("stored.pdf".to_string()))
            .await
            .unwrap();
        assert_eq!(response.filename, "stored.pdf");
        assert_eq!(response.removed_chunks, 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_pdf_unknown_name_is_not_found() {
        let (_dir, state) = temp_state().await;

        let err = remove_pdf(State(state), Path("missing.pdf".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
