//! Document ingestion: loading, splitting, identity, and index sync

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::index::IndexSynchronizer;

pub mod identity;
pub mod loader;
pub mod splitter;

pub use splitter::ChunkSplitter;

/// What happened to one uploaded file.
///
/// Ordinary "this file is already here" cases are values, not errors; only
/// genuine failures carry an `Error`.
#[derive(Debug)]
pub enum UploadOutcome {
    /// Stored and indexed
    Added { chunks_added: usize },
    /// Left alone, with the reason
    Skipped { reason: String },
    /// Not stored
    Failed { error: Error },
}

/// Counts from one document ingestion
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub source: String,
    pub pages: usize,
    pub chunks: usize,
    pub added: usize,
}

/// Load, split, identify, and index documents
pub struct IngestPipeline {
    splitter: ChunkSplitter,
    synchronizer: Arc<IndexSynchronizer>,
}

impl IngestPipeline {
    pub fn new(splitter: ChunkSplitter, synchronizer: Arc<IndexSynchronizer>) -> Self {
        Self {
            splitter,
            synchronizer,
        }
    }

    /// Ingest a PDF already on disk, attributing its chunks to `source`
    pub async fn ingest_file(&self, path: &Path, source: &str) -> Result<IngestReport> {
        let path_owned = path.to_path_buf();
        let pages = tokio::task::spawn_blocking(move || loader::load_pages(&path_owned))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))??;

        let chunks = identity::assign_ids(self.splitter.split_pages(source, &pages));
        let added = self.synchronizer.sync(&chunks).await?;

        let report = IngestReport {
            source: source.to_string(),
            pages: pages.len(),
            chunks: chunks.len(),
            added: added.len(),
        };
        info!(
            source = %report.source,
            pages = report.pages,
            chunks = report.chunks,
            added = report.added,
            "Ingested document"
        );
        Ok(report)
    }

    /// Store an uploaded PDF under `pdf_dir` and index it.
    ///
    /// A file that already exists under the same name is skipped, never
    /// overwritten. The upload is written to a temp name and renamed into
    /// place, and a file whose ingestion fails is removed again so a retry
    /// does not run into the skip.
    pub async fn ingest_upload(
        &self,
        pdf_dir: &Path,
        file_name: &str,
        data: &[u8],
    ) -> UploadOutcome {
        if let Err(error) = validate_pdf_name(file_name) {
            return UploadOutcome::Failed { error };
        }

        let target = pdf_dir.join(file_name);
        if target.exists() {
            return match loader::content_hash(&target) {
                Ok(existing) if existing == loader::hash_bytes(data) => UploadOutcome::Skipped {
                    reason: "already uploaded".to_string(),
                },
                Ok(_) => {
                    warn!(
                        file = %file_name,
                        "Upload skipped: a different file with this name already exists"
                    );
                    UploadOutcome::Skipped {
                        reason: "a file with this name already exists with different content"
                            .to_string(),
                    }
                }
                Err(error) => UploadOutcome::Failed { error },
            };
        }

        if let Err(error) = tokio::fs::create_dir_all(pdf_dir).await {
            return UploadOutcome::Failed {
                error: error.into(),
            };
        }

        // write-then-rename so a crash mid-write never leaves a half PDF
        // under the real name
        let tmp = pdf_dir.join(format!(".{}.{}.part", file_name, Uuid::new_v4()));
        if let Err(error) = tokio::fs::write(&tmp, data).await {
            return UploadOutcome::Failed {
                error: error.into(),
            };
        }
        if let Err(error) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return UploadOutcome::Failed {
                error: error.into(),
            };
        }

        match self.ingest_file(&target, file_name).await {
            Ok(report) => UploadOutcome::Added {
                chunks_added: report.added,
            },
            Err(error) => {
                // roll the stored file back so the next attempt is not skipped
                if let Err(remove_error) = tokio::fs::remove_file(&target).await {
                    warn!(
                        file = %file_name,
                        error = %remove_error,
                        "Could not remove file after failed ingestion"
                    );
                }
                UploadOutcome::Failed { error }
            }
        }
    }
}

/// Validate a client-supplied PDF file name: a plain `.pdf` name with no
/// path components
pub fn validate_pdf_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || !name.to_ascii_lowercase().ends_with(".pdf")
    {
        return Err(Error::UnsupportedFileType(format!(
            "'{}' (expected a plain file name ending in .pdf)",
            name
        )));
    }
    Ok(())
}
