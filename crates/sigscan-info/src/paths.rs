use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("failed to find a home directory")]
    ProjectDirsError,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// Get the config directory, e.g. `~/.config/sigscan` on linux
/// Also creates it if it doesn't exist
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let dirs = ProjectDirs::from("", "", "sigscan").ok_or(PathError::ProjectDirsError)?;
    let config_dir = dirs.config_dir().to_owned();

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// Create a path to `<config_dir>/<filename>`
pub fn get_config_filepath<P: AsRef<Path>>(path: P) -> Result<PathBuf, PathError> {
    Ok(get_config_dir()?.join(path))
}
