//! Local image store for catalog pictures.
//!
//! Uploaded images are written under a configured directory with a random file name
//! and served back at `public_base_url`. Removing a medicine removes its file.

use std::path::{Path, PathBuf};

use crate::{
    config::app::ImageConfig,
    errors::{Error, Result},
};
use tracing::{debug, info};
use uuid::Uuid;

const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Writes and deletes image files for the catalog.
#[derive(Debug, Clone)]
pub struct ImageStore {
    directory: PathBuf,
    public_base_url: String,
}

impl ImageStore {
    /// Creates a store rooted at `directory`, publishing files under `public_base_url`.
    pub fn new(directory: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a store from the `[images]` configuration section.
    #[must_use]
    pub fn from_config(config: &ImageConfig) -> Self {
        Self::new(&config.directory, &config.public_base_url)
    }

    /// Directory the files live in.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Creates the backing directory if needed.
    pub async fn ensure_directory(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.directory).await?;
        Ok(())
    }

    /// Stores an uploaded image and returns its public URL.
    ///
    /// The extension is taken from the uploaded file name and must be a common
    /// image format.
    ///
    /// # Errors
    /// Returns an error if the upload is empty, the extension is not an image
    /// extension, or the file cannot be written.
    pub async fn save(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String> {
        if bytes.is_empty() {
            return Err(Error::invalid_argument("Uploaded image is empty"));
        }

        let extension = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "Image must be one of: {}",
                    ALLOWED_EXTENSIONS.join(", ")
                ))
            })?;

        self.ensure_directory().await?;
        let file_name = format!("{}.{extension}", Uuid::new_v4().simple());
        tokio::fs::write(self.directory.join(&file_name), bytes)
            .await
            .map_err(|e| Error::ImageStore {
                message: format!("Failed to write {file_name}: {e}"),
            })?;

        info!("Stored image {} ({} bytes)", file_name, bytes.len());
        Ok(format!("{}/{file_name}", self.public_base_url))
    }

    /// Deletes the file behind a URL previously returned by [`ImageStore::save`].
    ///
    /// Returns `false` when the URL does not belong to this store or the file is
    /// already gone.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be deleted.
    pub async fn remove(&self, url: &str) -> Result<bool> {
        let Some(file_name) = self.file_name_for(url) else {
            debug!("Image {} is not managed by this store", url);
            return Ok(false);
        };

        match tokio::fs::remove_file(self.directory.join(file_name)).await {
            Ok(()) => {
                info!("Removed image {}", file_name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::ImageStore {
                message: format!("Failed to remove {file_name}: {e}"),
            }),
        }
    }

    fn file_name_for<'a>(&self, url: &'a str) -> Option<&'a str> {
        let file_name = url
            .strip_prefix(self.public_base_url.as_str())?
            .strip_prefix('/')?;

        let plain = !file_name.is_empty()
            && !file_name.contains(['/', '\\'])
            && !file_name.starts_with('.');
        plain.then_some(file_name)
    }
}
