use crate::cmd::Cli;
use crate::utils::{self, ExpandError};
use chrono::TimeDelta;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0} is required and must not be empty")]
    MissingValue(&'static str),
    #[error("failed to look up the path to the OCI binary {name:?}: {source}")]
    ExecutableNotFound {
        name: String,
        source: std::io::Error,
    },
    #[error("failed to expand the cache path: {0}")]
    HomeExpansion(#[from] ExpandError),
}

/// Settings for a single invocation, validated once and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub cache_dir: PathBuf,
    pub expiration_threshold: TimeDelta,
    pub oci_path: PathBuf,
    pub cluster_id: String,
    pub region: String,
    pub ignore_cache: bool,
}

impl Config {
    /// Validates the parsed arguments without touching the cache directory.
    pub fn from_cli(cli: &Cli) -> Result<Self, Error> {
        if cli.cluster_id.is_empty() {
            return Err(Error::MissingValue("cluster id"));
        }
        if cli.region.is_empty() {
            return Err(Error::MissingValue("region"));
        }
        if cli.cache_path.is_empty() {
            return Err(Error::MissingValue("cache path"));
        }

        let oci_path =
            utils::look_path(&cli.oci_path).map_err(|source| Error::ExecutableNotFound {
                name: cli.oci_path.clone(),
                source,
            })?;
        let cache_dir = utils::expand_home(&cli.cache_path)?;

        Ok(Self {
            cache_dir,
            expiration_threshold: cli.expiration_threshold,
            oci_path,
            cluster_id: cli.cluster_id.clone(),
            region: cli.region.clone(),
            ignore_cache: cli.ignore_cache,
        })
    }
}
