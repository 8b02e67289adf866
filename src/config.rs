//! # Configuration
//!
//! Settings are plain `serde` structs with defaults for every field, so a
//! configuration file only needs to mention what it changes:
//!
//! ```yaml
//! logger:
//!   enable: true
//!   level: debug
//!   format: compact
//! modeling:
//!   thing_node: true
//!   properties:
//!     without_domain_and_range: true
//! ```
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{graph::WeightSettings, logger, Error, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logger: Logger,
    pub modeling: ModelingSettings,
}

impl Config {
    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error when the document is not valid YAML or when the
    /// resulting settings fail validation.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// # Errors
    ///
    /// Returns an error when the weight cascade is out of order or the closure
    /// iteration ceiling is zero.
    pub fn validate(&self) -> Result<()> {
        self.modeling.validate()
    }
}

/// Logger configuration
///
/// Example (development):
/// ```yaml
/// logger:
///   enable: true
///   level: debug
///   format: compact
///   override_filter: alignment_graph=trace
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Logger {
    /// Enable the stdout layer.
    pub enable: bool,
    pub level: logger::LogLevel,
    pub format: logger::Format,
    /// Replaces the level-based filter, e.g. `alignment_graph::graph=trace`.
    pub override_filter: Option<String>,
    pub file_appender: Option<LoggerFileAppender>,
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            enable: true,
            level: logger::LogLevel::default(),
            format: logger::Format::default(),
            override_filter: None,
            file_appender: None,
        }
    }
}

/// Rolling file output.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggerFileAppender {
    pub enable: bool,
    /// Write through a background worker instead of on the calling thread.
    pub non_blocking: bool,
    pub format: logger::Format,
    pub rotation: logger::Rotation,
    pub dir: Option<String>,
    pub filename_prefix: Option<String>,
    pub filename_suffix: Option<String>,
    pub max_log_files: usize,
}

impl Default for LoggerFileAppender {
    fn default() -> Self {
        Self {
            enable: false,
            non_blocking: false,
            format: logger::Format::default(),
            rotation: logger::Rotation::default(),
            dir: None,
            filename_prefix: None,
            filename_suffix: None,
            max_log_files: 5,
        }
    }
}

/// Settings of one modeling session.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelingSettings {
    /// Run closure materialization and link synthesis when class nodes are
    /// added through the updating entry points.
    pub ontology_alignment: bool,
    /// Materialize the closure members of added class nodes.
    pub node_closure: bool,
    /// Seed new graphs with an `owl:Thing` node.
    pub thing_node: bool,
    pub properties: PropertyTiers,
    /// Most fixpoint passes that may still grow a closure when resolving
    /// cycles. The final pass that confirms stability is not counted.
    pub closure_max_iterations: usize,
    pub weights: WeightSettings,
}

impl Default for ModelingSettings {
    fn default() -> Self {
        Self {
            ontology_alignment: true,
            node_closure: true,
            thing_node: false,
            properties: PropertyTiers::default(),
            closure_max_iterations: 10_000,
            weights: WeightSettings::default(),
        }
    }
}

impl ModelingSettings {
    /// # Errors
    ///
    /// Returns an error when the weight cascade is out of order or the closure
    /// iteration ceiling is zero.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.closure_max_iterations == 0 {
            return Err(Error::Message(
                "modeling.closure_max_iterations must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// One toggle per link synthesis tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PropertyTiers {
    pub direct: bool,
    pub indirect: bool,
    pub with_only_domain: bool,
    pub with_only_range: bool,
    pub without_domain_and_range: bool,
    pub sub_class: bool,
}

impl Default for PropertyTiers {
    fn default() -> Self {
        Self {
            direct: true,
            indirect: true,
            with_only_domain: true,
            with_only_range: true,
            without_domain_and_range: false,
            sub_class: true,
        }
    }
}
