use std::path::PathBuf;

use tracing::warn;

/// Provides the platform-issued purchase receipt.
pub trait ReceiptSource: Send + Sync {
    fn receipt(&self) -> Option<Vec<u8>>;
}

/// Reads the receipt from a file on disk, as written by the store.
pub struct FileReceiptSource {
    path: PathBuf,
}

impl FileReceiptSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReceiptSource for FileReceiptSource {
    fn receipt(&self) -> Option<Vec<u8>> {
        match std::fs::read(&self.path) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "error loading receipt data");
                None
            }
        }
    }
}
