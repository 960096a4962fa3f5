use crate::button::{Button, PinnedButton};
use crate::{Error, Result};
use dockbar_types::PinnedAppDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub taskbar: TaskbarConfig,

    /// Pinned applications, in bar order
    #[serde(default, deserialize_with = "dockbar_types::deserialize_null_as_empty_vec")]
    pub pinned_apps: Vec<PinnedAppDescriptor>,
}

/// Options consumed by the button manager at the end of each cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskbarConfig {
    /// Hide applications that have a single window and no pin
    #[serde(default)]
    pub hide_single_window_apps: bool,

    /// Cluster windows without app id or executable by their process.
    /// When off, each such window forms its own group.
    #[serde(default = "default_group_by_process")]
    pub group_by_process: bool,
}

fn default_group_by_process() -> bool {
    true
}

impl Default for TaskbarConfig {
    fn default() -> Self {
        Self {
            hide_single_window_apps: false,
            group_by_process: default_group_by_process(),
        }
    }
}

/// Group key a pinned descriptor resolves to
fn pin_group(desc: &PinnedAppDescriptor) -> String {
    PinnedButton::new(0, desc).group().to_string()
}

impl Config {
    /// Load config from file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        super::validation::warn_unknown_fields(&content, "config.json");
        let config: Self = serde_json::from_str(&content)?;
        info!(
            "Loaded config from {} ({} pinned apps)",
            path.display(),
            config.pinned_apps.len()
        );
        Ok(config)
    }

    /// Save config to file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Position of the pin whose group matches `group` (case-insensitive)
    #[must_use]
    pub fn pin_position(&self, group: &str) -> Option<usize> {
        let group = group.to_lowercase();
        self.pinned_apps.iter().position(|p| pin_group(p) == group)
    }

    /// Append a pin unless one of the same group exists.
    #[must_use]
    pub fn pin(&mut self, desc: PinnedAppDescriptor) -> bool {
        if self.pin_position(&pin_group(&desc)).is_some() {
            return false;
        }
        self.pinned_apps.push(desc);
        true
    }

    /// Remove the pin of `group`.
    #[must_use]
    pub fn unpin(&mut self, group: &str) -> bool {
        match self.pin_position(group) {
            Some(pos) => {
                self.pinned_apps.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Move the pin at `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` when either position is out of range.
    pub fn move_pin(&mut self, from: usize, to: usize) -> Result<bool> {
        let len = self.pinned_apps.len();
        if from >= len || to >= len {
            return Err(Error::InvalidArgument(format!(
                "pin position out of range: {from} -> {to} (have {len})"
            )));
        }
        if from == to {
            return Ok(false);
        }
        let pin = self.pinned_apps.remove(from);
        self.pinned_apps.insert(to, pin);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn notepad() -> PinnedAppDescriptor {
        PinnedAppDescriptor::new("Notepad").with_executable("C:\\Windows\\notepad.exe")
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.taskbar.hide_single_window_apps);
        assert!(config.taskbar.group_by_process);
        assert!(config.pinned_apps.is_empty());
    }

    #[test]
    fn test_config_load_nonexistent_returns_default() {
        let path = std::path::Path::new("/nonexistent/path/config.json");
        let config = Config::load(path).unwrap();
        assert!(config.taskbar.group_by_process);
    }

    #[test]
    fn test_config_load_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"taskbar": {{"hideSingleWindowApps": true}}, "pinnedApps": [{{"title": "Calc", "executable": "calc.exe"}}]}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(config.taskbar.hide_single_window_apps);
        assert!(config.taskbar.group_by_process);
        assert_eq!(config.pinned_apps.len(), 1);
        assert_eq!(config.pinned_apps[0].executable.as_deref(), Some("calc.exe"));
    }

    #[test]
    fn test_config_load_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{invalid json}}").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_pin_rejects_duplicate_group() {
        let mut config = Config::default();
        assert!(config.pin(notepad()));
        let again = PinnedAppDescriptor::new("Editor").with_executable("c:\\windows\\NOTEPAD.exe");
        assert!(!config.pin(again));
        assert_eq!(config.pinned_apps.len(), 1);
    }

    #[test]
    fn test_unpin_by_group() {
        let mut config = Config::default();
        assert!(config.pin(notepad()));
        assert!(config.pin(PinnedAppDescriptor::new("Mail").with_app_id("Contoso.Mail")));

        assert!(config.unpin("contoso.mail"));
        assert!(!config.unpin("contoso.mail"));
        assert_eq!(config.pinned_apps.len(), 1);
        assert_eq!(config.pinned_apps[0].title, "Notepad");
    }

    #[test]
    fn test_move_pin() {
        let mut config = Config::default();
        assert!(config.pin(PinnedAppDescriptor::new("A").with_executable("a.exe")));
        assert!(config.pin(PinnedAppDescriptor::new("B").with_executable("b.exe")));
        assert!(config.pin(PinnedAppDescriptor::new("C").with_executable("c.exe")));

        assert!(config.move_pin(2, 0).unwrap());
        let titles: Vec<_> = config.pinned_apps.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["C", "A", "B"]);

        assert!(!config.move_pin(1, 1).unwrap());
        assert!(matches!(
            config.move_pin(0, 3),
            Err(Error::InvalidArgument(_))
        ));
    }
}
