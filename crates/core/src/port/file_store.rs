// File Store Port
//
// Only path naming is the engine's business (see domain::job::stored_filename_for);
// the storage mechanics live behind this interface.

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Copy an uploaded model file into the store under `stored_name`.
    /// A failure here must abort the submission before the job reaches
    /// `pending`.
    async fn store(&self, source: &Path, stored_name: &str) -> Result<()>;

    /// Whether a stored file exists.
    async fn exists(&self, stored_name: &str) -> Result<bool>;
}
