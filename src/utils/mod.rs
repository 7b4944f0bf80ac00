use std::env;
use std::io;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    #[error("cannot expand user-specific home dir in {0:?}")]
    UserSpecificHome(String),
    #[error("unable to determine the home directory")]
    MissingHome,
}

/// Expands a leading `~` or `~/` to the current user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf, ExpandError> {
    let Some(rest) = path.strip_prefix('~') else {
        return Ok(PathBuf::from(path));
    };
    if !rest.is_empty() && !rest.starts_with('/') && !rest.starts_with(MAIN_SEPARATOR) {
        return Err(ExpandError::UserSpecificHome(path.to_string()));
    }
    let home_dir = home::home_dir().ok_or(ExpandError::MissingHome)?;
    let rest = rest.trim_start_matches(['/', MAIN_SEPARATOR]);
    Ok(if rest.is_empty() {
        home_dir
    } else {
        home_dir.join(rest)
    })
}

/// Resolves an executable to an absolute path. Names containing a separator are
/// checked as given, bare names are searched for in `PATH`.
pub fn look_path(name: &str) -> io::Result<PathBuf> {
    if name.is_empty() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "empty executable name"));
    }

    if name.contains('/') || name.contains(MAIN_SEPARATOR) {
        let candidate = Path::new(name);
        return if is_executable(candidate) {
            absolute(candidate)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{name} is not an executable file"),
            ))
        };
    }

    let path_var = env::var_os("PATH").unwrap_or_default();
    env::split_paths(&path_var)
        .map(|dir| {
            if dir.as_os_str().is_empty() {
                PathBuf::from(".").join(name)
            } else {
                dir.join(name)
            }
        })
        .find(|candidate| is_executable(candidate))
        .map_or_else(
            || {
                Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("executable file {name} not found in $PATH"),
                ))
            },
            |candidate| absolute(&candidate),
        )
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
