use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use config_finder::ConfigDirs;
use indoc::indoc;
use serde::{Deserialize, Deserializer};
use simple_expand_tilde::expand_tilde;

/// Contents written by `spendsort create-config`.
pub const STARTER_SETTINGS: &str = indoc! {
    r#"
    [paths]
    # Where the category keyword rules are kept.
    # Defaults to categories.json next to this file.
    # rules = "~/Documents/spendsort/categories.json"
    "#
};

/// Expand '~' to the home directory.
pub fn normalize_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    expand_tilde(path.as_ref()).ok_or_else(|| anyhow!("Cannot expand ~ to a home directory"))
}

/// Return the path to the settings.toml file.
pub fn settings_path() -> Result<PathBuf> {
    let mut conf_dirs = ConfigDirs::empty();
    let mut conf_files = conf_dirs
        .add_platform_config_dir()
        .search("spendsort", "settings", "toml");
    normalize_path(
        conf_files
            .next()
            .ok_or(anyhow!("Cannot identify the path to the settings.toml file"))?
            .path(),
    )
}

/// User settings read from settings.toml.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Locations of files used by the program.
    #[serde(default)]
    paths: SettingsPaths,
}

/// Paths used by the program for various purposes.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
struct SettingsPaths {
    /// The rule document holding categories and keywords.
    #[serde(default, deserialize_with = "deserialize_option_path")]
    rules: Option<PathBuf>,
}

impl Settings {
    /// Create new Settings from raw TOML data.
    pub fn new(raw_data: &str) -> Result<Self> {
        Ok(toml::from_str(raw_data)?)
    }

    /// Read the settings file, treating a missing file as default settings.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(Settings::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::new(&raw).map_err(|e| anyhow!("Cannot read {:#?}: {e}", path))
    }

    /// Where the rule document lives. Unless configured, it sits next
    /// to the settings file.
    pub fn rules_path(&self, settings_file: impl AsRef<Path>) -> Result<PathBuf> {
        if let Some(rules) = &self.paths.rules {
            return Ok(rules.to_owned());
        }
        let settings_file = settings_file.as_ref();
        let parent = settings_file
            .parent()
            .ok_or_else(|| anyhow!("Cannot get the directory name of {:#?}", settings_file))?;
        Ok(parent.join("categories.json"))
    }
}

/// Instructions on how to deserialize an optional path object.
fn deserialize_option_path<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    match s {
        Some(s) => normalize_path(s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_path() {
        let given = "~/location";
        let result = normalize_path(given).unwrap();
        assert_ne!(result, PathBuf::from(given));
    }

    #[test]
    fn test_starter_settings_parse() {
        let result = Settings::new(STARTER_SETTINGS).unwrap();
        assert_eq!(result, Settings::default());
    }

    #[test]
    fn test_default_rules_path_sits_next_to_settings() {
        let result = Settings::new("")
            .unwrap()
            .rules_path("/home/me/.config/spendsort/settings.toml")
            .unwrap();
        assert_eq!(
            result,
            PathBuf::from("/home/me/.config/spendsort/categories.json")
        );
    }

    #[test]
    fn test_configured_rules_path() {
        let result = Settings::new("[paths]\nrules = \"/data/rules.json\"\n")
            .unwrap()
            .rules_path("/home/me/.config/spendsort/settings.toml")
            .unwrap();
        assert_eq!(result, PathBuf::from("/data/rules.json"));
    }

    #[test]
    fn test_configured_rules_path_expands_tilde() {
        let result = Settings::new("[paths]\nrules = \"~/rules.json\"\n")
            .unwrap()
            .rules_path("/etc/settings.toml")
            .unwrap();
        assert_ne!(result, PathBuf::from("~/rules.json"));
        assert!(result.ends_with("rules.json"));
    }

    #[test]
    fn test_unknown_settings_are_rejected() {
        assert!(Settings::new("[paths]\nstorage = \"/tmp\"\n").is_err());
        assert!(Settings::new("colour = \"blue\"\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let temp = tempdir::TempDir::new("test").unwrap();
        let path = temp.path().join("settings.toml");
        assert_eq!(Settings::from_file(&path).unwrap(), Settings::default());

        fs::write(&path, "[paths]\nrules = \"/data/rules.json\"\n").unwrap();
        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(
            settings.rules_path(&path).unwrap(),
            PathBuf::from("/data/rules.json")
        );

        fs::write(&path, "[paths\n").unwrap();
        assert!(Settings::from_file(&path).is_err());
    }
}
