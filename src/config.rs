//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/restructure/restructure.toml`
//! 3. Local config: `<project_dir>/.restructure.toml`
//! 4. Environment variables: `RESTRUCTURE_*` prefix (`__` separates nested keys)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{DuplicateSections, RestructureOptions};
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Output formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    /// Pretty-print the restructured JSON
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputSettings {
    pub pretty: Option<bool>,
}

/// Raw settings for intermediate parsing (Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub strict: Option<bool>,
    pub duplicate_sections: Option<DuplicateSections>,
    pub output: RawOutputSettings,
}

/// Unified configuration for restructure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Fail when a pass produces diagnostics
    pub strict: bool,
    /// Destination when several elements declare the same section
    pub duplicate_sections: DuplicateSections,
    pub output: OutputSettings,
}

/// Get the XDG config directory for restructure.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "restructure").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("restructure.toml"))
}

/// Get the path to the local config file in a project directory.
pub fn local_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".restructure.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(fs: &dyn FileSystem, path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = fs.read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Options handed to the restructuring core.
    pub fn options(&self) -> RestructureOptions {
        RestructureOptions {
            duplicate_sections: self.duplicate_sections,
        }
    }

    /// Merge overlay config onto self (base): overlay wins if Some.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            strict: overlay.strict.unwrap_or(self.strict),
            duplicate_sections: overlay
                .duplicate_sections
                .unwrap_or(self.duplicate_sections),
            output: OutputSettings {
                pretty: overlay.output.pretty.unwrap_or(self.output.pretty),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for local config
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), project_dir)
    }

    /// Same as [`Settings::load`] with an explicit global config path.
    pub fn load_from(
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        Self::load_with(&RealFileSystem, global_path, project_dir)
    }

    /// Same as [`Settings::load_from`], reading config files through `fs`.
    pub fn load_with(
        fs: &dyn FileSystem,
        global_path: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if fs.exists(global_path) {
                let raw = load_raw_settings(fs, global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(project) = project_dir {
            let local_path = local_config_path(project);
            if fs.exists(&local_path) {
                let raw = load_raw_settings(fs, &local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply RESTRUCTURE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("RESTRUCTURE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }
        if let Ok(val) = config.get_string("duplicate_sections") {
            settings.duplicate_sections = val
                .parse()
                .map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_bool("output.pretty") {
            settings.output.pretty = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# restructure configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/restructure/restructure.toml
#   Local:  <project_dir>/.restructure.toml
#   Env:    RESTRUCTURE_* environment variables, e.g.
#           RESTRUCTURE_STRICT=true
#           RESTRUCTURE_DUPLICATE_SECTIONS=unresolved
#           RESTRUCTURE_OUTPUT__PRETTY=false

# Exit with an error when a schema produces diagnostics
# (unresolved parents, cycles, duplicate sections, malformed meta).
# strict = false

# When several elements declare the same section:
#   "first-declared": the first one in document order receives the nodes
#   "unresolved":     references to that section are left in place
# duplicate_sections = "first-declared"

[output]
# Pretty-print restructured JSON
# pretty = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_created_then_lenient_and_pretty() {
        let settings = Settings::default();
        assert!(!settings.strict);
        assert_eq!(settings.duplicate_sections, DuplicateSections::FirstDeclared);
        assert!(settings.output.pretty);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            strict: Some(true),
            duplicate_sections: None,
            output: RawOutputSettings { pretty: None },
        };
        let merged = base.merge_with(&overlay);
        assert!(merged.strict);
        assert_eq!(merged.duplicate_sections, DuplicateSections::FirstDeclared);
        assert!(merged.output.pretty);
    }

    #[test]
    fn given_settings_when_serializing_then_kebab_case_policy() {
        let settings = Settings {
            duplicate_sections: DuplicateSections::Unresolved,
            ..Settings::default()
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("duplicate_sections = \"unresolved\""));
        assert!(text.contains("[output]"));
    }

    #[test]
    fn given_template_when_parsing_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();
        assert!(raw.strict.is_none());
        assert!(raw.output.pretty.is_none());
    }

    #[test]
    fn given_settings_when_building_options_then_carries_policy() {
        let settings = Settings {
            duplicate_sections: DuplicateSections::Unresolved,
            ..Settings::default()
        };
        assert_eq!(
            settings.options().duplicate_sections,
            DuplicateSections::Unresolved
        );
    }

    #[test]
    fn given_files_in_filesystem_when_loading_then_layers_through_trait() {
        use crate::infrastructure::traits::MemoryFileSystem;

        let fs = MemoryFileSystem::new()
            .with_file("/cfg/global.toml", "strict = true\n")
            .with_file("/project/.restructure.toml", "[output]\npretty = false\n");

        let settings = Settings::load_with(
            &fs,
            Some(Path::new("/cfg/global.toml")),
            Some(Path::new("/project")),
        )
        .unwrap();

        assert!(settings.strict);
        assert!(!settings.output.pretty);
    }

    #[test]
    fn given_missing_files_when_loading_then_defaults() {
        use crate::infrastructure::traits::MemoryFileSystem;

        let settings = Settings::load_with(
            &MemoryFileSystem::new(),
            Some(Path::new("/cfg/global.toml")),
            Some(Path::new("/project")),
        )
        .unwrap();

        assert_eq!(settings.strict, Settings::default().strict);
    }
}
