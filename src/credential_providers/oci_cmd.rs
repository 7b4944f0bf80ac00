use super::{Error, ProvideCredentials, ProvideCredentialsInput};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// Runs `oci ce cluster generate-token` and hands back its stdout.
pub struct OciCmdCredentialProvider {
    oci_path: PathBuf,
}

impl OciCmdCredentialProvider {
    pub fn new(oci_path: PathBuf) -> Self {
        Self { oci_path }
    }
}

impl ProvideCredentials for OciCmdCredentialProvider {
    fn provide_credentials(&self, input: &ProvideCredentialsInput) -> Result<Vec<u8>, Error> {
        debug!(
            program = %self.oci_path.display(),
            cluster_id = input.cluster_id,
            region = input.region,
            "generating a new cluster token"
        );

        let oci_cmd = Command::new(&self.oci_path)
            .arg("ce")
            .arg("cluster")
            .arg("generate-token")
            .arg("--cluster-id")
            .arg(input.cluster_id)
            .arg("--region")
            .arg(input.region)
            .stdin(Stdio::null())
            .output()
            .map_err(Error::SpawnFailed)?;

        if !oci_cmd.status.success() {
            // Folded onto one line for the error message.
            let stderr = String::from_utf8_lossy(&oci_cmd.stderr)
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join("; ");
            debug!(status = %oci_cmd.status, "OCI command failed");
            return Err(Error::ExitFailure {
                code: oci_cmd.status.code(),
                stderr,
            });
        }

        Ok(oci_cmd.stdout)
    }
}
