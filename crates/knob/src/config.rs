use directories::ProjectDirs;
use rotary::KnobSettings;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid knob settings: {0}")]
    Knob(#[from] rotary::ConfigError),
    #[error("Failed to write settings file: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "rotary", "knob").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("knob.toml"))
}

/// `KNOB_MAX_VALUE=10` sets `max_value`; a double underscore reaches into
/// tables, as in `KNOB_COLORS__NEEDLE=#336699`.
fn environment() -> config::Environment {
    config::Environment::with_prefix("KNOB")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn build(
    file: config::File<config::FileSourceFile, config::FileFormat>,
    env: config::Environment,
) -> Result<KnobSettings, ConfigError> {
    let settings: KnobSettings = config::Config::builder()
        .add_source(file)
        .add_source(env)
        .build()?
        .try_deserialize()?;
    log::debug!("Loaded knob settings: {settings:?}");
    Ok(settings)
}

/// Loads settings from `path` (required) or the default location (optional),
/// with `KNOB_*` environment variables on top.
pub fn load_config(path: Option<&Path>) -> Result<KnobSettings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::from(get_config_path()?).required(false),
    };
    build(file, environment())
}

/// Writes the commented defaults to `path`, or to the default location, unless
/// a file is already there. Returns where the settings live.
pub fn write_default_config(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => get_config_path()?,
    };
    if path.exists() {
        log::info!("Keeping existing settings at {}", path.display());
        return Ok(path);
    }
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(&path, DEFAULT_CONFIG)?;
    log::info!("Wrote default settings to {}", path.display());
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
