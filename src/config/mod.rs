use figment::{
    Figment,
    providers::{Env, Format, Json},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

use crate::errors::{AppError, AppResult};
use crate::models::EpgSourceConfig;
use crate::utils::url::UrlUtils;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub sources: Vec<EpgSourceConfig>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Where and how the merged guide is written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// Value of the `generator-info-name` attribute on the root element
    #[serde(default = "default_generator_name")]
    pub generator_name: String,
    /// Value of the `generator-info-url` attribute on the root element
    #[serde(default = "default_generator_url")]
    pub generator_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Deadline for a whole request, applied uniformly to every source
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub timeout: Duration,
    #[serde(default = "default_connect_timeout", with = "duration_serde")]
    pub connect_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_PATH)
}

fn default_generator_name() -> String {
    DEFAULT_GENERATOR_NAME.to_string()
}

fn default_generator_url() -> String {
    DEFAULT_GENERATOR_URL.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            generator_name: default_generator_name(),
            generator_url: default_generator_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_request_timeout(),
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Build a configuration around an explicit source list, everything else defaulted
    pub fn with_sources(sources: Vec<EpgSourceConfig>) -> Self {
        Self {
            sources,
            output: OutputConfig::default(),
            http: HttpConfig::default(),
        }
    }

    /// Load the sources file, layering `EPG_MERGE_*` environment overrides on top.
    ///
    /// Nested keys use `__` as separator, e.g. `EPG_MERGE_OUTPUT__PATH`.
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let path = config_file.as_ref();
        if !path.exists() {
            return Err(AppError::configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let config: Config = Figment::new()
            .merge(Json::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| {
                AppError::configuration(format!("Failed to load {}: {e}", path.display()))
            })?;

        config.validate()?;
        info!(
            "Loaded {} EPG source(s) from {}",
            config.sources.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse a configuration document held in memory (no environment overrides)
    pub fn from_json_str(contents: &str) -> AppResult<Self> {
        let config: Config = serde_json::from_str(contents)
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.sources.is_empty() {
            return Err(AppError::configuration("No EPG sources configured"));
        }

        for (idx, source) in self.sources.iter().enumerate() {
            let position = idx + 1;
            if source.name.trim().is_empty() {
                return Err(AppError::configuration(format!(
                    "Source {position} has an empty name"
                )));
            }
            if source.url.trim().is_empty() {
                return Err(AppError::configuration(format!(
                    "Source {position} ('{}') has an empty url",
                    source.name
                )));
            }
            if let Err(e) = UrlUtils::parse_and_validate(&source.url) {
                return Err(AppError::configuration(format!(
                    "Source {position} ('{}') has an invalid url: {e}",
                    source.name
                )));
            }
            if source.prefix.is_empty() {
                debug!(
                    "Source '{}' has no prefix, channel ids are kept unchanged",
                    source.name
                );
            }
        }

        if self.http.timeout.is_zero() {
            return Err(AppError::configuration("http.timeout must be greater than zero"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelSelector, SourceFormat};
    use figment::Jail;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"{
        "sources": [
            {"name": "US", "url": "https://example.com/us.xml.gz", "format": "GZ",
             "channels": ["101", 102], "prefix": "us-"},
            {"name": "UK", "url": "https://example.com/uk.xml", "format": "raw",
             "channels": "*", "prefix": "uk-"}
        ]
    }"#;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    // Runs inside a jail so env overrides set by other tests cannot leak in
    #[test]
    fn test_load_sources_file() {
        Jail::expect_with(|jail| {
            jail.create_file("sources.json", SAMPLE)?;
            let config = Config::load_from_file("sources.json").unwrap();

            assert_eq!(config.sources.len(), 2);
            assert_eq!(config.sources[0].format, SourceFormat::Gz);
            assert!(config.sources[0].channels.matches("102"));
            assert_eq!(config.sources[1].channels, ChannelSelector::All);
            assert_eq!(config.output.path, PathBuf::from(DEFAULT_OUTPUT_PATH));
            assert_eq!(config.http.timeout, Duration::from_secs(300));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_sources_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sources.json",
                r#"{
                    "sources": [{"name": "A", "url": "http://a.test/a.xml", "channels": "*"}],
                    "output": {"path": "from-file.xml"},
                    "http": {"timeout": "1m"}
                }"#,
            )?;
            jail.set_env("EPG_MERGE_OUTPUT__PATH", "/srv/epg/from-env.xml");
            jail.set_env("EPG_MERGE_HTTP__TIMEOUT", "90s");

            let config = Config::load_from_file("sources.json").unwrap();
            assert_eq!(config.output.path, PathBuf::from("/srv/epg/from-env.xml"));
            assert_eq!(config.http.timeout, Duration::from_secs(90));
            assert_eq!(config.sources[0].name, "A");
            assert_eq!(config.output.generator_name, DEFAULT_GENERATOR_NAME);
            Ok(())
        });
    }

    #[test]
    fn test_optional_sections() {
        let config = Config::from_json_str(
            r#"{
                "sources": [{"name": "A", "url": "http://a.test/a.xml", "channels": "*"}],
                "output": {"path": "/tmp/merged.xml", "generator_name": "Custom"},
                "http": {"timeout": "2m", "user_agent": "guide-bot/1.0"}
            }"#,
        )
        .unwrap();

        assert_eq!(config.output.path, PathBuf::from("/tmp/merged.xml"));
        assert_eq!(config.output.generator_name, "Custom");
        assert_eq!(config.output.generator_url, DEFAULT_GENERATOR_URL);
        assert_eq!(config.http.timeout, Duration::from_secs(120));
        assert_eq!(config.http.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.http.user_agent, "guide-bot/1.0");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = Config::load_from_file("/definitely/not/here/sources.json");
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_malformed_file_is_configuration_error() {
        let file = write_config(r#"{"sources": [ {"name": "broken""#);
        let result = Config::load_from_file(file.path());
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_zero_sources_rejected() {
        let result = Config::from_json_str(r#"{"sources": []}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("No EPG sources configured"));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = Config::from_json_str(
            r#"{"sources": [{"name": "A", "url": "not a url", "channels": "*"}]}"#,
        );
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Config::from_json_str(
            r#"{"sources": [{"name": "A", "url": "http://a.test/", "channels": "*"}],
                "http": {"timeout": 0}}"#,
        );
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_missing_channels_rejected() {
        let result = Config::from_json_str(
            r#"{"sources": [{"name": "A", "url": "http://a.test/"}]}"#,
        );
        assert!(result.is_err());
    }
}
