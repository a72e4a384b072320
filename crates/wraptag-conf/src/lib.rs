use std::fs;
use std::path::Path;

use camino::Utf8PathBuf;
use config::Config;
use config::ConfigError as ExternalConfigError;
use config::File;
use config::FileFormat;
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration build/deserialize error")]
    Config(#[from] ExternalConfigError),
    #[error("Failed to read Cargo.toml")]
    ManifestIo(#[from] std::io::Error),
    #[error("Failed to parse Cargo.toml TOML")]
    ManifestParse(#[from] toml::de::Error),
    #[error("Failed to serialize extracted Cargo.toml metadata")]
    ManifestSerialize(#[from] toml::ser::Error),
}

/// Process-wide settings for tag compilation and rendering.
///
/// `debug` is the single strict/relaxed switch: when enabled, leftover tag
/// arguments, misnamed hooks, registration conflicts and variable-only tags
/// used without `as` are hard errors instead of being tolerated.
#[derive(Debug, Deserialize, Default, PartialEq, Clone)]
#[serde(default)]
pub struct Settings {
    debug: bool,
    template_dirs: Vec<Utf8PathBuf>,
    string_if_invalid: String,
}

impl Settings {
    pub fn new(project_root: &Path) -> Result<Self, ConfigError> {
        let user_config_file = ProjectDirs::from("com.github", "wraptag", "wraptag")
            .map(|proj_dirs| proj_dirs.config_dir().join("wraptag.toml"));

        Self::load_from_paths(project_root, user_config_file.as_deref())
    }

    fn load_from_paths(
        project_root: &Path,
        user_config_path: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let manifest_path = project_root.join("Cargo.toml");
        if manifest_path.exists() {
            let content = fs::read_to_string(&manifest_path)?;
            let manifest: toml::Value = toml::from_str(&content)?;

            let table_path = ["package", "metadata", "wraptag"];

            let metadata = table_path
                .iter()
                .try_fold(&manifest, |current, &key| current.get(key));

            if let Some(table) = metadata.and_then(|v| v.as_table()) {
                let table_string = toml::to_string(table)?;
                builder = builder.add_source(File::from_str(&table_string, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            File::from(project_root.join(".wraptag.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        builder = builder.add_source(
            File::from(project_root.join("wraptag.toml"))
                .format(FileFormat::Toml)
                .required(false),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;
        tracing::debug!(
            debug = settings.debug,
            template_dirs = settings.template_dirs.len(),
            "loaded wraptag settings"
        );
        Ok(settings)
    }

    /// Strict mode flag.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub fn template_dirs(&self) -> &[Utf8PathBuf] {
        &self.template_dirs
    }

    /// Text emitted in place of a variable that fails to resolve.
    #[must_use]
    pub fn string_if_invalid(&self) -> &str {
        &self.string_if_invalid
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_template_dirs(mut self, dirs: Vec<Utf8PathBuf>) -> Self {
        self.template_dirs = dirs;
        self
    }

    #[must_use]
    pub fn with_string_if_invalid(mut self, value: impl Into<String>) -> Self {
        self.string_if_invalid = value.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    mod defaults {
        use super::*;

        #[test]
        fn test_load_no_files() {
            let dir = tempdir().unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, Settings::default());
            assert!(!settings.debug());
            assert!(settings.template_dirs().is_empty());
            assert_eq!(settings.string_if_invalid(), "");
        }
    }

    mod project_files {
        use super::*;

        #[test]
        fn test_load_wraptag_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("wraptag.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert!(settings.debug());
        }

        #[test]
        fn test_load_dot_wraptag_toml_only() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join(".wraptag.toml"),
                "template_dirs = [\"templates\", \"shared/templates\"]",
            )
            .unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(
                settings.template_dirs(),
                &[
                    Utf8PathBuf::from("templates"),
                    Utf8PathBuf::from("shared/templates")
                ]
            );
        }

        #[test]
        fn test_load_cargo_metadata_only() {
            let dir = tempdir().unwrap();
            let content = "[package]\nname = \"site\"\n\n[package.metadata.wraptag]\ndebug = true\nstring_if_invalid = \"INVALID\"\n";
            fs::write(dir.path().join("Cargo.toml"), content).unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert!(settings.debug());
            assert_eq!(settings.string_if_invalid(), "INVALID");
        }

        #[test]
        fn test_cargo_without_metadata_is_ignored() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"site\"\n").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert_eq!(settings, Settings::default());
        }
    }

    mod priority {
        use super::*;

        #[test]
        fn test_wraptag_overrides_dot_wraptag() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join(".wraptag.toml"), "debug = false").unwrap();
            fs::write(dir.path().join("wraptag.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert!(settings.debug());
        }

        #[test]
        fn test_dot_wraptag_overrides_cargo_metadata() {
            let dir = tempdir().unwrap();
            fs::write(
                dir.path().join("Cargo.toml"),
                "[package.metadata.wraptag]\ndebug = false\n",
            )
            .unwrap();
            fs::write(dir.path().join(".wraptag.toml"), "debug = true").unwrap();
            let settings = Settings::load_from_paths(dir.path(), None).unwrap();
            assert!(settings.debug());
        }

        #[test]
        fn test_project_overrides_user() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("wraptag.toml");
            fs::write(&user_conf_path, "debug = true").unwrap();
            fs::write(project_dir.path().join("wraptag.toml"), "debug = false").unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert!(!settings.debug());
        }

        #[test]
        fn test_user_config_alone() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("wraptag.toml");
            fs::write(&user_conf_path, "debug = true").unwrap();

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert!(settings.debug());
        }

        #[test]
        fn test_missing_user_config_is_ignored() {
            let user_dir = tempdir().unwrap();
            let project_dir = tempdir().unwrap();
            let user_conf_path = user_dir.path().join("wraptag.toml");

            let settings =
                Settings::load_from_paths(project_dir.path(), Some(&user_conf_path)).unwrap();
            assert_eq!(settings, Settings::default());
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn test_invalid_toml_content() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("wraptag.toml"), "debug = not_a_boolean").unwrap();
            let result = Settings::load_from_paths(dir.path(), None);
            assert!(matches!(result.unwrap_err(), ConfigError::Config(_)));
        }

        #[test]
        fn test_invalid_cargo_manifest() {
            let dir = tempdir().unwrap();
            fs::write(dir.path().join("Cargo.toml"), "[package\nname = ").unwrap();
            let result = Settings::load_from_paths(dir.path(), None);
            assert!(matches!(result.unwrap_err(), ConfigError::ManifestParse(_)));
        }
    }

    #[test]
    fn test_builder_helpers() {
        let settings = Settings::default()
            .with_debug(true)
            .with_template_dirs(vec![Utf8PathBuf::from("tpl")])
            .with_string_if_invalid("?");
        assert!(settings.debug());
        assert_eq!(settings.template_dirs(), &[Utf8PathBuf::from("tpl")]);
        assert_eq!(settings.string_if_invalid(), "?");
    }
}
