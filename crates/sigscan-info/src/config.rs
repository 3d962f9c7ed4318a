use std::path::Path;
use std::{fs, path::PathBuf};

use eyre::Result;
use serde::{Deserialize, Serialize};
use sigscan::ScanOptions;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    // not part of the file, remembers where to save to
    #[serde(skip)]
    path: PathBuf,

    #[serde(default)]
    pub log: Log,
    /// options every reported context is built with
    #[serde(default)]
    pub scan: ScanOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Log {
    /// configure logger level
    pub level: String,
    /// whether to display log targets
    pub targets: bool,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            targets: false,
        }
    }
}

impl Config {
    /// Load a config file
    /// If path doesn't exist, creates and saves default config
    /// otherwise loads what's already there
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self {
                path: path.to_owned(),
                ..Default::default()
            };

            config.save()?;
            return Ok(config);
        }

        let data = fs::read_to_string(path)?;
        let mut config = toml::from_str::<Self>(&data)?;

        path.clone_into(&mut config.path);

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let serialized = toml::to_string_pretty(self)?;
        fs::write(&self.path, serialized)?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
