use std::{collections::HashSet, fs::File, path::Path};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Which admission plugins run, and in which order.
///
/// ```yaml
/// plugins:
///   - name: AlwaysPullImages
///   - name: SomeOtherPlugin
///     configuration:
///       key: value
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdmissionConfig {
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<serde_yaml::Value>,
}

impl AdmissionConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        read_config_file(path)
            .map_err(|e| anyhow!("error while loading admission config from {:?}: {}", path, e))
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let config: AdmissionConfig = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name.as_str()).collect()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for plugin in &self.plugins {
            if plugin.name.trim().is_empty() {
                return Err(anyhow!("admission plugin name cannot be empty"));
            }
            if !seen.insert(plugin.name.as_str()) {
                return Err(anyhow!(
                    "admission plugin {} is listed more than once",
                    plugin.name
                ));
            }
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<AdmissionConfig> {
    let config_file = File::open(path)?;
    let config: AdmissionConfig = serde_yaml::from_reader(&config_file)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn plugins_keep_their_order() {
        let input = r#"
---
plugins:
  - name: NamespaceLifecycle
  - name: AlwaysPullImages
  - name: LimitRanger
    configuration:
      maxLimitRequestRatio: 2
"#;
        let config = AdmissionConfig::from_yaml_str(input).unwrap();

        assert_eq!(
            config.plugin_names(),
            vec!["NamespaceLifecycle", "AlwaysPullImages", "LimitRanger"]
        );
        assert!(config.plugins[1].configuration.is_none());
        assert!(config.plugins[2].configuration.is_some());
    }

    #[test]
    fn empty_document() {
        let config = AdmissionConfig::from_yaml_str("{}").unwrap();
        assert!(config.plugins.is_empty());
    }

    #[test]
    fn duplicated_plugin() {
        let input = r#"
plugins:
  - name: AlwaysPullImages
  - name: AlwaysPullImages
"#;
        let err = AdmissionConfig::from_yaml_str(input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "admission plugin AlwaysPullImages is listed more than once"
        );
    }

    #[test]
    fn empty_plugin_name() {
        let input = r#"
plugins:
  - name: ""
"#;
        assert!(AdmissionConfig::from_yaml_str(input).is_err());
    }

    #[test]
    fn read_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "plugins:\n  - name: AlwaysPullImages").unwrap();

        let config = AdmissionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.plugin_names(), vec!["AlwaysPullImages"]);
    }

    #[test]
    fn missing_file() {
        let err = AdmissionConfig::from_file(Path::new("/does/not/exist.yml")).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("error while loading admission config from \"/does/not/exist.yml\"")
        );
    }
}
