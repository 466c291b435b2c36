use compedit_schema::SchemaBlacklist;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "compedit.config.json";

/// compedit configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Project file holding the composition list
    #[serde(default = "default_project_file")]
    pub project_file: String,

    /// Committed saves kept for undo
    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Fields left out of generation schemas
    #[serde(default)]
    pub schema_blacklist: SchemaBlacklist,
}

fn default_project_file() -> String {
    "project.json".to_string()
}

fn default_undo_levels() -> usize {
    100
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the project file
    pub fn get_project_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.project_file)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_file: default_project_file(),
            undo_levels: default_undo_levels(),
            schema_blacklist: SchemaBlacklist::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "projectFile": "videos/intro.json",
            "undoLevels": 10,
            "schemaBlacklist": {
                "global": ["fontFamily"],
                "gradientMesh": ["blur"]
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.project_file, "videos/intro.json");
        assert_eq!(config.undo_levels, 10);
        assert_eq!(
            config.schema_blacklist.fields_for("gradientMesh"),
            vec!["fontFamily", "blur"]
        );
        assert_eq!(config.schema_blacklist.fields_for("plainBackground"), vec!["fontFamily"]);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.project_file, "project.json");
        assert_eq!(config.undo_levels, 100);
        assert!(config.schema_blacklist.is_blacklisted("gradientMesh", "positionSeed"));
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.project_file, "project.json");
        assert_eq!(config.schema_blacklist, SchemaBlacklist::default());
        assert_eq!(
            config.get_project_path("/work"),
            PathBuf::from("/work/project.json")
        );
    }
}
