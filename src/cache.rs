use crate::types::K8sExecCredentials;
use chrono::{DateTime, TimeDelta, Utc};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to prepare the cache directory {}: {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("failed to read the cached file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write the cached file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("cached file {} is not a valid exec credential: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub struct CacheManager {
    cache_dir: PathBuf,
    cache_path: PathBuf,
}

pub struct CacheManagerInputs<'a> {
    pub region: &'a str,
    pub cluster_id: &'a str,
    pub cache_dir: &'a Path,
}

impl CacheManager {
    pub fn new(args: &CacheManagerInputs) -> Self {
        let cache_file_name = format!(
            "{region}-{cluster}",
            region = args.region,
            cluster = args.cluster_id
        );

        Self {
            cache_dir: args.cache_dir.to_path_buf(),
            cache_path: args.cache_dir.join(cache_file_name),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Creates the cache directory, readable only by its owner, if it is missing.
    pub fn prepare(&self) -> Result<(), Error> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder
            .create(&self.cache_dir)
            .map_err(|source| Error::CreateDir {
                path: self.cache_dir.clone(),
                source,
            })
    }

    /// Returns the cached bytes untouched if they hold a credential that is still
    /// fresh. A missing or stale file is a miss; an unparsable one is an error.
    pub fn resolve_cache_hit(
        &self,
        now: DateTime<Utc>,
        threshold: TimeDelta,
    ) -> Result<Option<Vec<u8>>, Error> {
        let content = match fs::read(&self.cache_path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.cache_path.display(), "no cached credentials");
                return Ok(None);
            }
            Err(source) => {
                return Err(Error::Read {
                    path: self.cache_path.clone(),
                    source,
                })
            }
        };

        let k8s_exec_creds =
            K8sExecCredentials::from_slice(&content).map_err(|source| Error::Corrupt {
                path: self.cache_path.clone(),
                source,
            })?;

        if k8s_exec_creds.is_fresh(now, threshold) {
            debug!(
                path = %self.cache_path.display(),
                expiration = ?k8s_exec_creds.status.expiration_timestamp,
                "using cached credentials"
            );
            Ok(Some(content))
        } else {
            debug!(
                path = %self.cache_path.display(),
                expiration = ?k8s_exec_creds.status.expiration_timestamp,
                "cached credentials are stale"
            );
            Ok(None)
        }
    }

    /// Replaces the cache file through a temporary sibling and a rename, so readers
    /// never observe a partially written credential.
    pub fn cache_credentials(&self, creds: &[u8]) -> Result<(), Error> {
        let write_error = |source| Error::Write {
            path: self.cache_path.clone(),
            source,
        };

        let mut file = NamedTempFile::new_in(&self.cache_dir).map_err(write_error)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(write_error)?;
        }
        file.write_all(creds).map_err(write_error)?;
        file.as_file().sync_all().map_err(write_error)?;
        file.persist(&self.cache_path)
            .map_err(|err| write_error(err.error))?;

        debug!(path = %self.cache_path.display(), "cached new credentials");
        Ok(())
    }
}
