use crate::cache::{self, CacheManager, CacheManagerInputs};
use crate::config::Config;
use crate::credential_providers::{self, ProvideCredentials, ProvideCredentialsInput};
use crate::types::{freshness_floor, K8sExecCredentials};
use chrono::{DateTime, Utc};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Cache(#[from] cache::Error),
    #[error(transparent)]
    CredentialProvider(#[from] credential_providers::Error),
    #[error("failed to parse the credentials output: {0}")]
    ResponseParse(#[source] serde_json::Error),
    #[error(
        "freshly fetched token has an expired timestamp {} (must be after {})",
        describe_expiration(.expiration),
        .floor.to_rfc3339()
    )]
    FreshTokenExpired {
        expiration: Option<DateTime<Utc>>,
        floor: DateTime<Utc>,
    },
}

fn describe_expiration(expiration: &Option<DateTime<Utc>>) -> String {
    expiration.map_or_else(|| "<missing>".to_string(), |e| e.to_rfc3339())
}

/// Returns the exact bytes of a fresh credential, served from the cache when
/// possible and generated through `provider` otherwise. `clock` is read again
/// after the provider returns, since the OCI CLI can take a while.
pub fn resolve_credential<P, C>(config: &Config, provider: &P, clock: C) -> Result<Vec<u8>, Error>
where
    P: ProvideCredentials,
    C: Fn() -> DateTime<Utc>,
{
    let cache_manager = CacheManager::new(&CacheManagerInputs {
        region: &config.region,
        cluster_id: &config.cluster_id,
        cache_dir: &config.cache_dir,
    });
    debug!(path = %cache_manager.cache_path().display(), "resolving credentials");
    cache_manager.prepare()?;

    if config.ignore_cache {
        debug!("ignoring cached credentials");
    } else if let Some(hit) =
        cache_manager.resolve_cache_hit(clock(), config.expiration_threshold)?
    {
        return Ok(hit);
    }

    let output = provider.provide_credentials(&ProvideCredentialsInput {
        cluster_id: &config.cluster_id,
        region: &config.region,
    })?;

    let k8s_exec_creds = K8sExecCredentials::from_slice(&output).map_err(Error::ResponseParse)?;
    let now = clock();
    if !k8s_exec_creds.is_fresh(now, config.expiration_threshold) {
        return Err(Error::FreshTokenExpired {
            expiration: k8s_exec_creds.status.expiration_timestamp,
            floor: freshness_floor(now, config.expiration_threshold),
        });
    }
    debug!(
        kind = %k8s_exec_creds.kind,
        api_version = %k8s_exec_creds.api_version,
        token_len = k8s_exec_creds.status.token.len(),
        "received new credentials"
    );

    cache_manager.cache_credentials(&output)?;
    Ok(output)
}
