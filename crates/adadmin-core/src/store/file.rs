// # File Store
//
// Filesystem-backed implementation of Store for `file://` URIs.
//
// ## Writes
//
// - Intermediate directories are created on save
// - Each write goes to its own temp file in the target directory, which is
//   then renamed over the target, so readers and concurrent writers only
//   ever see whole snapshots
// - Temp files of failed writes are removed
// - Files are created with mode 0600 on unix
//
// ## Paths
//
// - `file:///var/lib/adadmin/user.json` → `/var/lib/adadmin/user.json`
// - `file://localhost/var/lib/...` → same as above
// - `file://./data/user.json` → `./data/user.json` (relative)

use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tokio::fs;
use url::Url;

use crate::Error;
use crate::traits::Store;

const SCHEME: &str = "file";

/// File-based store
///
/// # Example
///
/// ```rust,no_run
/// use adadmin_core::store::FileStore;
/// use adadmin_core::traits::Store;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let uri = url::Url::parse("file:///tmp/adadmin/lease.yaml")?;
///     FileStore.save(&uri, b"kind: DHCPLease\n").await?;
///     let raw = FileStore.load(&uri).await?;
///     assert_eq!(raw, b"kind: DHCPLease\n");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStore;

impl FileStore {
    /// Resolve the filesystem path named by a `file://` URI
    pub fn path_for(uri: &Url) -> Result<PathBuf, Error> {
        match uri.host_str() {
            None | Some("") | Some("localhost") => uri
                .to_file_path()
                .map_err(|_| Error::store(SCHEME, format!("not a local file path: {}", uri))),
            Some(host) => Ok(Path::new(host).join(uri.path().trim_start_matches('/'))),
        }
    }

    async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), Error> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).await.map_err(|e| {
            Error::store(
                SCHEME,
                format!("failed to create directory {}: {}", dir.display(), e),
            )
        })?;

        let target = path.to_path_buf();
        let data = data.to_vec();
        tokio::task::spawn_blocking(move || Self::replace(&dir, &target, &data))
            .await
            .map_err(|e| Error::store(SCHEME, format!("write task failed: {}", e)))?
    }

    /// Write `data` to a fresh temp file in `dir` and rename it over `target`
    ///
    /// The temp file is deleted when any step fails.
    fn replace(dir: &Path, target: &Path, data: &[u8]) -> Result<(), Error> {
        let mut builder = Builder::new();
        builder.prefix(".adadmin-").suffix(".tmp");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o600));
        }

        let mut temp = builder.tempfile_in(dir).map_err(|e| {
            Error::store(
                SCHEME,
                format!("failed to create temp file in {}: {}", dir.display(), e),
            )
        })?;

        temp.write_all(data)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| {
                Error::store(
                    SCHEME,
                    format!("failed to write temp file {}: {}", temp.path().display(), e),
                )
            })?;

        temp.persist(target).map_err(|e| {
            Error::store(
                SCHEME,
                format!(
                    "failed to rename {} to {}: {}",
                    e.file.path().display(),
                    target.display(),
                    e.error
                ),
            )
        })?;
        Ok(())
    }
}

#[async_trait]
impl Store for FileStore {
    fn scheme_name(&self) -> &str {
        SCHEME
    }

    async fn load(&self, uri: &Url) -> Result<Vec<u8>, Error> {
        let path = Self::path_for(uri)?;
        let data = fs::read(&path).await?;
        tracing::trace!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }

    async fn save(&self, uri: &Url, data: &[u8]) -> Result<(), Error> {
        let path = Self::path_for(uri)?;
        Self::write_atomic(&path, data).await?;
        tracing::trace!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}
