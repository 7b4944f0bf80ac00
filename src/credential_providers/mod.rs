pub mod oci_cmd;

/// Arguments forwarded to the token generator.
pub struct ProvideCredentialsInput<'a> {
    pub cluster_id: &'a str,
    pub region: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to run the OCI command, {}, stderr: {stderr}", describe_exit(.code))]
    ExitFailure { code: Option<i32>, stderr: String },
    #[error("failed to run the OCI command: {0}")]
    SpawnFailed(#[source] std::io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("error code {code}"),
        None => "terminated by signal".to_string(),
    }
}

/// Produces the raw bytes of a Kubernetes exec credential.
pub trait ProvideCredentials {
    fn provide_credentials(&self, input: &ProvideCredentialsInput) -> Result<Vec<u8>, Error>;
}
