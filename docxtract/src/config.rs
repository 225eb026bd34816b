//! Application configuration management.
//!
//! Configuration is loaded from an optional YAML file with environment variable overrides. The
//! configuration file path defaults to `config.yaml` but can be specified via `-f` flag or the
//! `DOCXTRACT_CONFIG` environment variable. A missing file is not an error: every field has a
//! default, so the service runs with no configuration at all.
//!
//! ## Loading Priority
//!
//! 1. **Defaults** - see the `Default` implementations below
//! 2. **YAML config file** - default: `config.yaml`
//! 3. **Environment variables** - variables prefixed with `DOCXTRACT_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `DOCXTRACT_EXTRACTION__STRATEGY=body_xml` sets the `extraction.strategy` field.
//!
//! ## Example
//!
//! ```yaml
//! host: 0.0.0.0
//! port: 8989
//! max_upload_size: 10485760
//! extraction:
//!   strategy: text_runs
//!   max_part_size: 67108864
//! staging:
//!   dir: /var/tmp/docxtract
//! limits:
//!   extractions:
//!     max_concurrent: 8
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::Error;
use crate::extract::{ExtractorKind, package::DEFAULT_MAX_PART_SIZE};

/// OOXML WordprocessingML documents (`.docx`)
pub const DOCX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
/// Legacy binary Word documents (`.doc`)
pub const DOC_CONTENT_TYPE: &str = "application/msword";

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DOCXTRACT_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Maximum size in bytes of a whole `/extract` request body, multipart framing included
    pub max_upload_size: usize,
    /// Declared part content types accepted for the `document` field, compared exactly.
    ///
    /// Only the client-supplied header is checked; file contents are never sniffed.
    pub allowed_content_types: Vec<String>,
    pub extraction: ExtractionConfig,
    pub staging: StagingConfig,
    pub limits: LimitsConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Content extraction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionConfig {
    /// `text_runs` returns flat text; `body_xml` returns the document body as markup
    pub strategy: ExtractorKind,
    /// Maximum inflated size of `word/document.xml` in bytes. Default: 64 MiB
    pub max_part_size: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractorKind::default(),
            max_part_size: DEFAULT_MAX_PART_SIZE,
        }
    }
}

/// Where and how uploads are staged on disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StagingConfig {
    /// Directory for staging files. Uses the OS temp directory when unset.
    pub dir: Option<PathBuf>,
    pub prefix: String,
    pub suffix: String,
}

/// Resource limits for protecting system capacity.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub extractions: ExtractionLimitsConfig,
}

/// Extraction concurrency limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractionLimitsConfig {
    /// Maximum number of uploads staged or extracted at once.
    /// Default: 0 (unlimited)
    pub max_concurrent: usize,
    /// Maximum number of requests that can wait for a slot; further requests get HTTP 429.
    /// Set to 0 for an unlimited queue. Default: 20
    pub max_waiting: usize,
    /// Maximum time to wait for a slot in seconds. Default: 60
    pub max_wait_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8989,
            max_upload_size: 10 << 20, // 10 MiB
            allowed_content_types: vec![DOCX_CONTENT_TYPE.to_string(), DOC_CONTENT_TYPE.to_string()],
            extraction: ExtractionConfig::default(),
            staging: StagingConfig::default(),
            limits: LimitsConfig::default(),
            enable_otel_export: false,
        }
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            prefix: "word-".to_string(),
            suffix: ".docx".to_string(),
        }
    }
}

impl Default for ExtractionLimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 0,
            max_waiting: 20,
            max_wait_secs: 60,
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_upload_size == 0 {
            return Err(Error::Internal {
                operation: "validate config: max_upload_size must be greater than 0".to_string(),
            });
        }

        if self.extraction.max_part_size == 0 {
            return Err(Error::Internal {
                operation: "validate config: extraction.max_part_size must be greater than 0".to_string(),
            });
        }

        if self.allowed_content_types.is_empty() {
            return Err(Error::Internal {
                operation: "validate config: allowed_content_types cannot be empty, no upload could ever be accepted".to_string(),
            });
        }

        if self.staging.prefix.is_empty() {
            return Err(Error::Internal {
                operation: "validate config: staging.prefix cannot be empty".to_string(),
            });
        }

        if let Some(dir) = &self.staging.dir
            && !dir.is_dir()
        {
            return Err(Error::Internal {
                operation: format!("validate config: staging.dir {} is not an existing directory", dir.display()),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values; DOCXTRACT_CONFIG is the file path itself
            .merge(Env::prefixed("DOCXTRACT_").ignore(&["config"]).split("__"))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
