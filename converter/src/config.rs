//! Output locations.
//!
//! Defaults match a Unity project layout. Each directory can be overridden
//! through the environment (a `.env` file is loaded by the CLI) or by CLI
//! flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_JSON_DIR: &str = "Assets/GeneratedJSONFromExcel";
pub const DEFAULT_SCRIPTS_DIR: &str = "Assets/Scripts/ModelScripts";

pub const ENV_PROJECT_ROOT: &str = "SHEETGEN_PROJECT_ROOT";
pub const ENV_JSON_DIR: &str = "SHEETGEN_JSON_DIR";
pub const ENV_SCRIPTS_DIR: &str = "SHEETGEN_SCRIPTS_DIR";

/// Where converted artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Project root; relative output dirs resolve against it
    pub project_root: PathBuf,
    /// JSON documents directory
    pub json_dir: PathBuf,
    /// Generated model classes directory
    pub scripts_dir: PathBuf,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            json_dir: PathBuf::from(DEFAULT_JSON_DIR),
            scripts_dir: PathBuf::from(DEFAULT_SCRIPTS_DIR),
        }
    }
}

impl ConverterConfig {
    /// Defaults overridden by `SHEETGEN_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(root) = non_empty(ENV_PROJECT_ROOT) {
            config.project_root = PathBuf::from(root);
        }
        if let Some(dir) = non_empty(ENV_JSON_DIR) {
            config.json_dir = PathBuf::from(dir);
        }
        if let Some(dir) = non_empty(ENV_SCRIPTS_DIR) {
            config.scripts_dir = PathBuf::from(dir);
        }
        config
    }

    pub fn with_project_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.project_root = root.into();
        self
    }

    pub fn with_json_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.json_dir = dir.into();
        self
    }

    pub fn with_scripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = dir.into();
        self
    }

    pub fn json_output_dir(&self) -> PathBuf {
        resolve(&self.project_root, &self.json_dir)
    }

    pub fn scripts_output_dir(&self) -> PathBuf {
        resolve(&self.project_root, &self.scripts_dir)
    }
}

fn resolve(root: &Path, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        root.join(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.json_output_dir(), PathBuf::from("./Assets/GeneratedJSONFromExcel"));
        assert_eq!(config.scripts_output_dir(), PathBuf::from("./Assets/Scripts/ModelScripts"));
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_PROJECT_ROOT, "/game"),
            (ENV_SCRIPTS_DIR, "Code/Models"),
            (ENV_JSON_DIR, "  "),
        ]);
        let config = ConverterConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.project_root, PathBuf::from("/game"));
        assert_eq!(config.json_dir, PathBuf::from(DEFAULT_JSON_DIR));
        assert_eq!(config.scripts_output_dir(), PathBuf::from("/game/Code/Models"));
    }

    #[test]
    fn test_absolute_dir_ignores_root() {
        let config = ConverterConfig::default()
            .with_project_root("/game")
            .with_json_dir("/data/json");
        assert_eq!(config.json_output_dir(), PathBuf::from("/data/json"));
    }
}
