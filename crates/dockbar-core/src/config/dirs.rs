use crate::{Error, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Per-user dockbar locations following platform conventions
#[derive(Debug, Clone)]
pub struct Directories {
    /// Config directory (~/.config/dockbar, %APPDATA%\dockbar\config)
    pub config: PathBuf,

    /// `config.json` inside the config directory
    pub config_file: PathBuf,

    /// Recorded replay scenarios (~/.local/share/dockbar/scenarios)
    pub scenarios: PathBuf,
}

impl Directories {
    /// Resolve the standard per-user paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the system's project directories cannot be determined
    /// (no home directory).
    pub fn new() -> Result<Self> {
        let project = ProjectDirs::from("", "", "dockbar")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;

        let config = project.config_dir().to_path_buf();
        Ok(Self {
            config_file: config.join("config.json"),
            scenarios: project.data_dir().join("scenarios"),
            config,
        })
    }

    #[must_use]
    pub fn with_base(base: PathBuf) -> Self {
        Self {
            config_file: base.join("config.json"),
            scenarios: base.join("scenarios"),
            config: base,
        }
    }

    /// Locate a scenario file. Paths that exist as given win; otherwise a
    /// relative path is looked up in the scenarios directory.
    #[must_use]
    pub fn resolve_scenario(&self, path: &Path) -> PathBuf {
        if path.exists() || path.is_absolute() {
            return path.to_path_buf();
        }
        let recorded = self.scenarios.join(path);
        if recorded.exists() {
            recorded
        } else {
            path.to_path_buf()
        }
    }
}
