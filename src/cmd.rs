use chrono::TimeDelta;
use clap::Parser;
use std::ffi::OsString;

/// Long flags that may also be spelled with a single dash, e.g. `-cluster-id`.
const LONG_FLAGS: [&str; 7] = [
    "cache-path",
    "expiration-threshold",
    "oci-path",
    "cluster-id",
    "region",
    "ignore-cache",
    "verbose",
];

/// Caches OCI Kubernetes exec credentials generated by the OCI CLI
#[derive(Parser, Debug)]
#[command(about, version)]
pub struct Cli {
    /// Directory used to store cached credentials, one file per region and cluster.
    /// A leading `~` is expanded to the home directory.
    #[arg(long, env = "OCI_K8S_CACHE_PATH", default_value = "~/.oci-k8s-cache")]
    pub cache_path: String,

    /// Freshness margin subtracted from the current time before comparing it with
    /// a token's expiration, e.g. `30s`, `1m30s`, `-10s`.
    #[arg(
        long,
        env = "OCI_K8S_EXPIRATION_THRESHOLD",
        default_value = "30s",
        value_parser = parse_duration,
        allow_hyphen_values = true
    )]
    pub expiration_threshold: TimeDelta,

    /// Name or path of the OCI CLI binary.
    #[arg(long, env = "OCI_CLI_PATH", default_value = "oci")]
    pub oci_path: String,

    /// OCID of the cluster to pass to the OCI CLI.
    #[arg(long, default_value = "")]
    pub cluster_id: String,

    /// OCI region to use.
    #[arg(long, env = "OCI_CLI_REGION", default_value = "us-ashburn-1")]
    pub region: String,

    /// Skip the cached credentials and always ask the OCI CLI for a new token.
    /// Defaults to `false`.
    #[arg(long, default_value_t = false)]
    pub ignore_cache: bool,

    /// Print debug diagnostics to stderr.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Words after the flags. Flag parsing stops at the first one and the rest,
    /// flags included, are ignored.
    #[arg(hide = true, num_args = 0.., trailing_var_arg = true)]
    pub ignored: Vec<OsString>,
}

impl Cli {
    pub fn from_env_args() -> Self {
        Self::parse_from(partition_args(std::env::args_os()))
    }
}

/// Kubeconfig exec entries may place positional words ahead of the flags, and
/// older configs spell long flags with a single dash. Everything before the first
/// dash-prefixed token is dropped and known single-dash long flags are rewritten
/// so clap can parse the remainder.
pub fn partition_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let program = args
        .next()
        .unwrap_or_else(|| OsString::from(env!("CARGO_PKG_NAME")));

    let mut partitioned = vec![program];
    partitioned.extend(
        args.skip_while(|arg| !arg.to_string_lossy().starts_with('-'))
            .map(normalize_flag),
    );
    partitioned
}

fn normalize_flag(arg: OsString) -> OsString {
    let Some(text) = arg.to_str() else {
        return arg;
    };
    let Some(rest) = text.strip_prefix('-') else {
        return arg;
    };
    if rest.starts_with('-') {
        return arg;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    if LONG_FLAGS.contains(&name) {
        OsString::from(format!("-{text}"))
    } else {
        arg
    }
}

/// Parses a duration in the `[-]1h2m3.5s` notation. Supported units are `ns`,
/// `us` (or `µs`), `ms`, `s`, `m` and `h`; a bare `0` is accepted.
pub fn parse_duration(s: &str) -> Result<TimeDelta, String> {
    let invalid = || format!("invalid duration {s:?}");

    let (negative, mut rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if rest == "0" {
        return Ok(TimeDelta::zero());
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos: i128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration {s:?}"))?;
        let (number, tail) = rest.split_at(number_len);
        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);

        let unit_nanos: i128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "" => return Err(format!("missing unit in duration {s:?}")),
            other => return Err(format!("unknown unit {other:?} in duration {s:?}")),
        };

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.contains('.') {
            return Err(invalid());
        }
        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut value = whole.checked_mul(unit_nanos).ok_or_else(invalid)?;

        let mut scale = unit_nanos;
        for digit in fraction.bytes() {
            scale /= 10;
            if scale == 0 {
                break;
            }
            value += i128::from(digit - b'0') * scale;
        }

        total_nanos = total_nanos.checked_add(value).ok_or_else(invalid)?;
        if total_nanos > i128::from(i64::MAX) {
            return Err(invalid());
        }
        rest = tail;
    }

    let nanos = i64::try_from(total_nanos).map_err(|_| invalid())?;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}
