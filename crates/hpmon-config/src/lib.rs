//! Configuration for the hpmon sampler.
//!
//! One printer, one trust anchor, one store. Settings come from a TOML (or
//! legacy JSON) file layered over defaults and `HPMON_*` environment
//! variables, and are translated into `hpmon_core::SamplerConfig`. Core
//! never reads config files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hpmon_core::store::STEP_SECS;
use hpmon_core::{DEFAULT_MIN_INTERVAL, DEFAULT_PORT, Endpoint, SamplerConfig, TransportConfig};

/// File names looked for in the working directory, in order.
pub const LOCAL_CONFIG_FILES: [&str; 2] = ["conf.toml", "conf.json"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn required(field: &str) -> Self {
        Self::Validation {
            field: field.into(),
            reason: "is required".into(),
        }
    }
}

// ── Config structs ──────────────────────────────────────────────────

/// Top-level configuration file.
///
/// Scalar keys come before the `printer` and `throttle` tables so the
/// struct renders back to valid TOML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// PEM file holding the printer's CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Round-robin store file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rrdfile: Option<PathBuf>,

    /// Append log lines here instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logfile: Option<PathBuf>,

    /// Whole-request timeout for the page fetch. Unset means no timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub printer: Printer,

    #[serde(default)]
    pub throttle: ThrottleSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Printer {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ThrottleSettings {
    /// Seconds that must pass since the last sample before writing another.
    #[serde(default = "default_min_interval")]
    pub min_interval_secs: u64,
}

impl Default for ThrottleSettings {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval(),
        }
    }
}

fn default_min_interval() -> u64 {
    DEFAULT_MIN_INTERVAL.as_secs()
}

// ── Config file path ────────────────────────────────────────────────

/// Platform config file path (`~/.config/hpmon/config.toml` on Linux).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "hpmon").map_or_else(
        || PathBuf::from("hpmon").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Pick the config file: an explicit path wins, then `conf.toml` or
/// `conf.json` in the working directory, then the platform path.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    LOCAL_CONFIG_FILES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .unwrap_or_else(config_path)
}

// ── Config loading ──────────────────────────────────────────────────

/// Layer defaults, the file at `path`, and `HPMON_*` variables.
///
/// Nested keys use a double underscore and single underscores stand for
/// dashes: `HPMON_PRINTER__HOST`, `HPMON_THROTTLE__MIN_INTERVAL_SECS`.
pub fn figment(path: &Path) -> Figment {
    let figment = Figment::new().merge(Serialized::defaults(Config::default()));
    let figment = if is_json(path) {
        figment.merge(Json::file(path))
    } else {
        figment.merge(Toml::file(path))
    };
    figment.merge(
        Env::prefixed("HPMON_")
            .split("__")
            .map(|key| key.as_str().replace('_', "-").into()),
    )
}

/// Load the config file at `path`. The file must exist.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(figment(path).extract()?)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

// ── Validation and translation ──────────────────────────────────────

impl Config {
    /// Check everything a sampling cycle needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.printer.host.trim().is_empty() {
            return Err(ConfigError::required("printer.host"));
        }
        if self.printer.port == 0 {
            return Err(ConfigError::Validation {
                field: "printer.port".into(),
                reason: "must be between 1 and 65535".into(),
            });
        }
        if self.ca_cert.is_none() {
            return Err(ConfigError::required("ca-cert"));
        }
        self.store_path()?;

        let min = self.throttle.min_interval_secs;
        if min == 0 || min > u64::from(STEP_SECS) {
            return Err(ConfigError::Validation {
                field: "throttle.min-interval-secs".into(),
                reason: format!("must be between 1 and the store step ({STEP_SECS}s), got {min}"),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Validation {
                field: "timeout-secs".into(),
                reason: "must be positive when set".into(),
            });
        }
        Ok(())
    }

    /// The store path alone, for commands that never talk to the printer.
    pub fn store_path(&self) -> Result<&Path, ConfigError> {
        self.rrdfile
            .as_deref()
            .ok_or_else(|| ConfigError::required("rrdfile"))
    }

    /// Build the runtime configuration for `hpmon_core::Sampler`.
    pub fn sampler_config(&self) -> Result<SamplerConfig, ConfigError> {
        self.validate()?;

        let ca_cert = self
            .ca_cert
            .clone()
            .ok_or_else(|| ConfigError::required("ca-cert"))?;

        let mut transport = TransportConfig::pinned(ca_cert);
        if let Some(secs) = self.timeout_secs {
            transport = transport.with_timeout(Duration::from_secs(secs));
        }

        Ok(SamplerConfig {
            endpoint: Endpoint::new(self.printer.host.trim(), self.printer.port),
            transport,
            store_path: self.store_path()?.to_path_buf(),
            min_interval: Duration::from_secs(self.throttle.min_interval_secs),
        })
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    const TOML: &str = r#"
        ca-cert = "certs/printer-ca.pem"
        rrdfile = "usage.rrd"
        logfile = "hpmon.log"

        [printer]
        host = "printer.lan"
        port = 8443
    "#;

    #[test]
    fn loads_toml_with_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file("conf.toml", TOML)?;
            let config = load(Path::new("conf.toml")).unwrap();

            assert_eq!(config.printer.host, "printer.lan");
            assert_eq!(config.printer.port, 8443);
            assert_eq!(config.ca_cert, Some(PathBuf::from("certs/printer-ca.pem")));
            assert_eq!(config.logfile, Some(PathBuf::from("hpmon.log")));
            assert_eq!(config.throttle.min_interval_secs, 3300);
            assert_eq!(config.timeout_secs, None);
            Ok(())
        });
    }

    #[test]
    fn loads_legacy_json_layout() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "conf.json",
                r#"{
                    "printer": {"host": "10.0.0.7"},
                    "ca-cert": "ca.pem",
                    "logfile": "/var/log/hpmon.log",
                    "rrdfile": "/var/lib/hpmon/usage.rrd"
                }"#,
            )?;
            let config = load(Path::new("conf.json")).unwrap();

            assert_eq!(config.printer.host, "10.0.0.7");
            assert_eq!(config.printer.port, 443);
            assert_eq!(
                config.store_path().unwrap(),
                Path::new("/var/lib/hpmon/usage.rrd")
            );
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("conf.toml", TOML)?;
            jail.set_env("HPMON_PRINTER__HOST", "other.lan");
            jail.set_env("HPMON_THROTTLE__MIN_INTERVAL_SECS", "600");
            jail.set_env("HPMON_TIMEOUT_SECS", "15");

            let config = load(Path::new("conf.toml")).unwrap();
            assert_eq!(config.printer.host, "other.lan");
            assert_eq!(config.throttle.min_interval_secs, 600);
            assert_eq!(config.timeout_secs, Some(15));
            Ok(())
        });
    }

    #[test]
    fn missing_file_is_reported() {
        Jail::expect_with(|_| {
            let err = load(Path::new("absent.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::NotFound { .. }));
            Ok(())
        });
    }

    #[test]
    fn local_file_is_discovered() {
        Jail::expect_with(|jail| {
            assert_eq!(resolve_config_path(None), config_path());
            jail.create_file("conf.json", "{}")?;
            assert_eq!(resolve_config_path(None), PathBuf::from("conf.json"));
            jail.create_file("conf.toml", "")?;
            assert_eq!(resolve_config_path(None), PathBuf::from("conf.toml"));
            assert_eq!(
                resolve_config_path(Some(Path::new("elsewhere.toml"))),
                PathBuf::from("elsewhere.toml")
            );
            Ok(())
        });
    }

    fn valid() -> Config {
        Config {
            printer: Printer {
                host: "printer.lan".into(),
                port: 443,
            },
            ca_cert: Some("ca.pem".into()),
            rrdfile: Some("usage.rrd".into()),
            ..Config::default()
        }
    }

    #[test]
    fn sampler_config_carries_settings() {
        let mut config = valid();
        config.timeout_secs = Some(20);
        config.throttle.min_interval_secs = 1800;

        let sampler = config.sampler_config().unwrap();
        assert_eq!(sampler.endpoint, Endpoint::new("printer.lan", 443));
        assert_eq!(sampler.store_path, PathBuf::from("usage.rrd"));
        assert_eq!(sampler.min_interval, Duration::from_secs(1800));
        assert_eq!(sampler.transport.timeout, Some(Duration::from_secs(20)));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let field = |config: Config| match config.validate() {
            Err(ConfigError::Validation { field, .. }) => field,
            other => panic!("expected a validation error, got {other:?}"),
        };

        let mut config = valid();
        config.printer.host = "  ".into();
        assert_eq!(field(config), "printer.host");

        let mut config = valid();
        config.printer.port = 0;
        assert_eq!(field(config), "printer.port");

        let mut config = valid();
        config.ca_cert = None;
        assert_eq!(field(config), "ca-cert");

        let mut config = valid();
        config.rrdfile = None;
        assert_eq!(field(config), "rrdfile");

        let mut config = valid();
        config.throttle.min_interval_secs = 0;
        assert_eq!(field(config), "throttle.min-interval-secs");

        let mut config = valid();
        config.throttle.min_interval_secs = 3601;
        assert_eq!(field(config), "throttle.min-interval-secs");

        let mut config = valid();
        config.throttle.min_interval_secs = 3600;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn renders_back_to_toml() {
        let rendered = valid().to_toml().unwrap();
        assert!(rendered.contains("ca-cert = \"ca.pem\""));
        assert!(rendered.contains("min-interval-secs = 3300"));
        assert!(!rendered.contains("logfile"));
    }
}
