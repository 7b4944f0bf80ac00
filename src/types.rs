use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer};

/// Missing and `null` fields both fall back to their empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Default, Deserialize)]
pub struct K8sExecCredentialsStatus {
    #[serde(rename = "expirationTimestamp", default)]
    pub expiration_timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
}

/// Only parsed to validate the document and read its expiry; the original bytes
/// are what get cached and handed to kubectl.
#[derive(Debug, Default, Deserialize)]
pub struct K8sExecCredentials {
    #[serde(default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(rename = "apiVersion", default, deserialize_with = "null_as_default")]
    pub api_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: K8sExecCredentialsStatus,
}

impl K8sExecCredentials {
    /// A top-level `null` parses as an empty document, which is never fresh.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<Option<Self>>(bytes).map(Option::unwrap_or_default)
    }

    /// The token is usable while its expiration is strictly after `now - threshold`.
    pub fn is_fresh(&self, now: DateTime<Utc>, threshold: TimeDelta) -> bool {
        self.status
            .expiration_timestamp
            .is_some_and(|expiration| expiration > freshness_floor(now, threshold))
    }
}

pub fn freshness_floor(now: DateTime<Utc>, threshold: TimeDelta) -> DateTime<Utc> {
    now.checked_sub_signed(threshold)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
