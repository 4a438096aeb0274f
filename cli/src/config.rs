//! Configuration file management
//!
//! CLIConfiguration with TOML parsing for `~/.condo/config.toml`.
//!
//! # Configuration Format
//!
//! ```toml
//! [project]
//! url = "https://abc.supabase.co"   # Project URL
//! anon_key = "eyJhbGciOi..."        # Publishable (anon) key
//! schema = "vila_da_serra"          # Schema every table lives in
//! instance = "default"              # Name the session is stored under
//!
//! [server]
//! timeout = 30                      # Request timeout in seconds
//!
//! [ui]
//! format = "table"                  # table, json
//! color = true
//! ```
//!
//! Precedence, lowest to highest: file, environment (`SUPABASE_URL`,
//! `SUPABASE_KEY`, `CONDO_SCHEMA`), command-line flags.

use condo_link::{
    CondoClient, CondoLinkTimeouts, DEFAULT_INSTANCE, DEFAULT_SCHEMA, ENV_KEY, ENV_SCHEMA,
    ENV_URL,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CLIError, Result};
use crate::formatter::OutputFormat;

/// CLI configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CLIConfiguration {
    /// Backend project settings
    pub project: Option<ProjectConfig>,

    /// Request settings
    pub server: Option<ServerConfig>,

    /// UI preferences
    pub ui: Option<UIConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub schema: Option<String>,
    pub instance: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    /// Output format: table, json
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_timeout() -> u64 {
    30
}

fn default_format() -> String {
    "table".to_string()
}

fn default_color() -> bool {
    true
}

pub fn expand_config_path(path: &Path) -> PathBuf {
    let path_str = path.to_str().unwrap_or("~/.condo/config.toml");
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

pub fn default_config_path() -> PathBuf {
    expand_config_path(Path::new("~/.condo/config.toml"))
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub anon_key: Option<String>,
    pub schema: Option<String>,
    pub instance: Option<String>,
    pub timeout: Option<u64>,
}

/// Fully merged project settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProject {
    pub url: String,
    pub anon_key: String,
    pub schema: String,
    pub instance: String,
    pub timeout: Duration,
}

impl ResolvedProject {
    /// Build the shared backend client for these settings.
    pub fn build_client(&self) -> Result<CondoClient> {
        let timeouts = CondoLinkTimeouts::builder()
            .receive_timeout(self.timeout)
            .build();
        Ok(CondoClient::builder()
            .base_url(&self.url)
            .anon_key(&self.anon_key)
            .schema(&self.schema)
            .timeouts(timeouts)
            .build()?)
    }
}

impl CLIConfiguration {
    /// Load configuration from file
    ///
    /// Returns default configuration if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_config_path(path);
        let path = &expanded_path;

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CLIError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: CLIConfiguration = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn resolved_ui(&self) -> UIConfig {
        self.ui.clone().unwrap_or(UIConfig {
            format: default_format(),
            color: default_color(),
        })
    }

    /// Output format from `[ui] format`; unknown values fall back to table.
    pub fn output_format(&self) -> OutputFormat {
        match self.resolved_ui().format.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }

    /// Merge file, process environment and flags.
    pub fn resolve(&self, overrides: &Overrides) -> Result<ResolvedProject> {
        self.resolve_with_env(overrides, |name| std::env::var(name).ok())
    }

    /// Merge file, `env` and flags. Blank values count as missing.
    pub fn resolve_with_env<F>(&self, overrides: &Overrides, env: F) -> Result<ResolvedProject>
    where
        F: Fn(&str) -> Option<String>,
    {
        let project = self.project.clone().unwrap_or_default();
        let pick = |flag: &Option<String>, var: Option<&str>, file: &Option<String>| {
            non_blank(flag)
                .or_else(|| var.and_then(|name| env(name)).filter(|v| !v.trim().is_empty()))
                .or_else(|| non_blank(file))
                .map(|v| v.trim().to_string())
        };

        let url = pick(&overrides.url, Some(ENV_URL), &project.url).ok_or_else(|| {
            CLIError::ConfigurationError(format!(
                "project URL is not set (export {}, pass --url, or add [project] url to the config file)",
                ENV_URL
            ))
        })?;
        let anon_key = pick(&overrides.anon_key, Some(ENV_KEY), &project.anon_key).ok_or_else(|| {
            CLIError::ConfigurationError(format!(
                "anon key is not set (export {}, pass --key, or add [project] anon_key to the config file)",
                ENV_KEY
            ))
        })?;
        let schema = pick(&overrides.schema, Some(ENV_SCHEMA), &project.schema)
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        let instance = pick(&overrides.instance, None, &project.instance)
            .unwrap_or_else(|| DEFAULT_INSTANCE.to_string());
        let timeout_secs = overrides
            .timeout
            .or_else(|| self.server.as_ref().map(|s| s.timeout))
            .unwrap_or_else(default_timeout);

        Ok(ResolvedProject {
            url,
            anon_key,
            schema,
            instance,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn file_config() -> CLIConfiguration {
        toml::from_str(
            r#"
            [project]
            url = "https://file.supabase.co"
            anon_key = "file-key"
            instance = "sindico"

            [server]
            timeout = 12
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = CLIConfiguration::default();
        assert!(config.project.is_none());
        assert_eq!(config.output_format(), OutputFormat::Table);
        assert!(config.resolved_ui().color);
    }

    #[test]
    fn test_file_values_are_used() {
        let resolved = file_config()
            .resolve_with_env(&Overrides::default(), env_of(&[]))
            .unwrap();
        assert_eq!(resolved.url, "https://file.supabase.co");
        assert_eq!(resolved.anon_key, "file-key");
        assert_eq!(resolved.schema, DEFAULT_SCHEMA);
        assert_eq!(resolved.instance, "sindico");
        assert_eq!(resolved.timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_env_overrides_file_and_flags_override_env() {
        let env = env_of(&[
            (ENV_URL, "https://env.supabase.co"),
            (ENV_KEY, "env-key"),
            (ENV_SCHEMA, "outro"),
        ]);
        let overrides = Overrides {
            url: Some("https://flag.supabase.co".into()),
            ..Overrides::default()
        };
        let resolved = file_config().resolve_with_env(&overrides, env).unwrap();
        assert_eq!(resolved.url, "https://flag.supabase.co");
        assert_eq!(resolved.anon_key, "env-key");
        assert_eq!(resolved.schema, "outro");
    }

    #[test]
    fn test_blank_env_falls_through() {
        let env = env_of(&[(ENV_URL, "  ")]);
        let resolved = file_config().resolve_with_env(&Overrides::default(), env).unwrap();
        assert_eq!(resolved.url, "https://file.supabase.co");
    }

    #[test]
    fn test_missing_url_names_variable() {
        let err = CLIConfiguration::default()
            .resolve_with_env(&Overrides::default(), env_of(&[(ENV_KEY, "k")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_URL));
    }

    #[test]
    fn test_missing_key_names_variable() {
        let err = CLIConfiguration::default()
            .resolve_with_env(&Overrides::default(), env_of(&[(ENV_URL, "https://x.co")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_KEY));
    }

    #[test]
    fn test_load_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CLIConfiguration::load(&dir.path().join("nope.toml")).unwrap();
        assert!(config.project.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[project]\nurl = \"https://abc.supabase.co\"\nanon_key = \"file-key\"\n\n[ui]\nformat = \"json\"\ncolor = false\n",
        )
        .unwrap();

        let loaded = CLIConfiguration::load(&path).unwrap();
        assert_eq!(loaded.output_format(), OutputFormat::Json);
        assert!(!loaded.resolved_ui().color);
        assert_eq!(loaded.project.unwrap().anon_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_load_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[project\nurl =").unwrap();
        assert!(CLIConfiguration::load(&path).is_err());
    }

    #[test]
    fn test_build_client_uses_schema() {
        let resolved = file_config()
            .resolve_with_env(&Overrides::default(), env_of(&[(ENV_SCHEMA, "teste")]))
            .unwrap();
        let client = resolved.build_client().unwrap();
        assert_eq!(client.schema(), "teste");
        assert_eq!(client.timeouts().receive_timeout, Duration::from_secs(12));
    }
}
