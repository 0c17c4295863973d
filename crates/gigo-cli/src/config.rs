//! Locating and loading the `config.toml` of a gigo run.
//!
//! The first file found wins: the `--config` path, then
//! `gigo/config.toml` under the working directory, then `config.toml` in
//! the platform config directory. Without any file the defaults apply.
//! A loaded file must keep the parser and mutation limits usable.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use gigo::{GigoError, config::AppConfig};

const LOCAL_CONFIG: &str = "gigo/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid configuration value `{key}`: {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

impl From<ConfigError> for GigoError {
    fn from(err: ConfigError) -> Self {
        let kind = match err {
            ConfigError::MissingFile(_) => io::ErrorKind::NotFound,
            ConfigError::Parse { .. } | ConfigError::Invalid { .. } => io::ErrorKind::InvalidData,
        };
        GigoError::Io(io::Error::new(kind, err))
    }
}

/// Where the configuration of a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Given with `--config`; it must exist.
    Explicit(PathBuf),
    Local(PathBuf),
    System(PathBuf),
    Default,
}

impl ConfigSource {
    fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Local(path) | ConfigSource::System(path) => {
                Some(path.as_path())
            }
            ConfigSource::Default => None,
        }
    }
}

/// Pick the configuration source of a run.
pub fn locate_config(explicit: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    let local = Path::new(LOCAL_CONFIG);
    if local.is_file() {
        return ConfigSource::Local(local.to_path_buf());
    }

    match ProjectDirs::from("com", "gigo", "gigo") {
        Some(dirs) => {
            let system = dirs.config_dir().join("config.toml");
            if system.is_file() {
                return ConfigSource::System(system);
            }
            debug!(path:? = system; "No system configuration");
        }
        None => debug!("No platform configuration directory"),
    }
    ConfigSource::Default
}

/// Load the configuration of a run.
///
/// # Errors
///
/// Fails when the `--config` file is missing, when a file does not parse,
/// and when it sets `parser.loop_guard` or `mutation.max_depth` to zero.
pub fn load_config(explicit: Option<impl AsRef<Path>>) -> Result<AppConfig, GigoError> {
    let explicit: Option<&Path> = explicit.as_ref().map(|path| path.as_ref());
    let source = locate_config(explicit);
    let Some(path) = source.path() else {
        debug!("Using default configuration");
        return Ok(AppConfig::default());
    };

    info!(source:?; "Loading configuration");
    let config = read_config(path)?;
    validate(&config)?;
    debug!(
        loop_guard = config.parser().loop_guard(),
        require_package = config.parser().require_package(),
        max_depth = config.mutation().max_depth();
        "Configuration loaded"
    );
    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig, GigoError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::MissingFile(path.to_path_buf()).into());
        }
        Err(err) => return Err(err.into()),
    };
    toml::from_str(&content).map_err(|err| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    })
}

/// Reject limits that would stop every run.
fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.parser().loop_guard() == 0 {
        return Err(ConfigError::Invalid {
            key: "parser.loop_guard",
            reason: "the cursor needs at least one step",
        });
    }
    if config.mutation().max_depth() == 0 {
        return Err(ConfigError::Invalid {
            key: "mutation.max_depth",
            reason: "expanding an implements declaration needs at least one level",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_explicit_config_is_loaded() {
        let (_dir, path) =
            write_config("[mutation]\nmax_depth = 3\n\n[parser]\nrequire_package = false\n");

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.mutation().max_depth(), 3);
        assert!(!config.parser().require_package());
        assert_eq!(config.parser().loop_guard(), 10_000);
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = PathBuf::from("anywhere/config.toml");
        assert_eq!(
            locate_config(Some(path.as_path())),
            ConfigSource::Explicit(path.clone())
        );
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"), "{err}");
        let GigoError::Io(err) = err else {
            panic!("Expected an io error");
        };
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_toml_fails() {
        let (_dir, path) = write_config("[mutation\n");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"), "{err}");
    }

    #[test]
    fn test_zero_max_depth_is_rejected() {
        let (_dir, path) = write_config("[mutation]\nmax_depth = 0\n");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("`mutation.max_depth`"), "{err}");
    }

    #[test]
    fn test_zero_loop_guard_is_rejected() {
        let (_dir, path) = write_config("[parser]\nloop_guard = 0\n");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("`parser.loop_guard`"), "{err}");
    }
}
