//! # Logger
//!
//! Installs a `tracing` subscriber from [`config::Logger`]. The library only
//! emits events; embedding applications decide whether to call [`init`].
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::{config, Error, Result};

const MODULE_WHITELIST: &[&str] = &["alignment_graph"];

static NONBLOCKING_WORK_GUARD_KEEP: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogLevel {
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(level)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Format {
    #[serde(rename = "compact")]
    #[default]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Rotation {
    #[serde(rename = "minutely")]
    Minutely,
    #[serde(rename = "hourly")]
    #[default]
    Hourly,
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "never")]
    Never,
}

/// Initializes the global subscriber.
///
/// Layers are only installed when at least one output is enabled. The filter
/// comes from `RUST_LOG` when set, then from `override_filter`, then from
/// `level` applied to this crate only.
///
/// # Errors
///
/// Fails when the file appender cannot be created, when the filter does not
/// parse, or when a global subscriber is already installed.
pub fn init(config: &config::Logger) -> Result<()> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Sync + Send>> = Vec::new();

    if let Some(file_appender_config) = config.file_appender.as_ref() {
        if file_appender_config.enable {
            let dir = file_appender_config
                .dir
                .as_ref()
                .map_or_else(|| "./logs".to_string(), ToString::to_string);

            let rotation = match file_appender_config.rotation {
                Rotation::Minutely => tracing_appender::rolling::Rotation::MINUTELY,
                Rotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
                Rotation::Daily => tracing_appender::rolling::Rotation::DAILY,
                Rotation::Never => tracing_appender::rolling::Rotation::NEVER,
            };

            let file_appender = tracing_appender::rolling::Builder::default()
                .max_log_files(file_appender_config.max_log_files)
                .rotation(rotation)
                .filename_prefix(
                    file_appender_config
                        .filename_prefix
                        .as_deref()
                        .unwrap_or("alignment-graph"),
                )
                .filename_suffix(
                    file_appender_config
                        .filename_suffix
                        .as_deref()
                        .unwrap_or("log"),
                )
                .build(dir)
                .map_err(|err| Error::Logger(err.to_string()))?;

            let file_appender_layer = if file_appender_config.non_blocking {
                let (non_blocking_file_appender, work_guard) =
                    tracing_appender::non_blocking(file_appender);
                NONBLOCKING_WORK_GUARD_KEEP
                    .set(work_guard)
                    .map_err(|_| Error::Logger("file appender is already initialized".into()))?;
                init_layer(non_blocking_file_appender, file_appender_config.format, false)
            } else {
                init_layer(file_appender, file_appender_config.format, false)
            };
            layers.push(file_appender_layer);
        }
    }

    if config.enable {
        layers.push(init_layer(std::io::stdout, config.format, true));
    }

    if !layers.is_empty() {
        let env_filter = init_env_filter(config.override_filter.as_deref(), config.level)?;
        tracing_subscriber::registry()
            .with(layers)
            .with(env_filter)
            .try_init()
            .map_err(|err| Error::Logger(err.to_string()))?;
    }
    Ok(())
}

fn init_env_filter(override_filter: Option<&str>, level: LogLevel) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let directives = override_filter.map_or_else(
        || {
            MODULE_WHITELIST
                .iter()
                .map(|module| format!("{module}={level}"))
                .collect::<Vec<_>>()
                .join(",")
        },
        ToString::to_string,
    );
    EnvFilter::try_new(directives).map_err(|err| Error::Logger(err.to_string()))
}

fn init_layer<W2>(make_writer: W2, format: Format, ansi: bool) -> Box<dyn Layer<Registry> + Sync + Send>
where
    W2: for<'writer> MakeWriter<'writer> + Sync + Send + 'static,
{
    match format {
        Format::Compact => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .compact()
            .boxed(),
        Format::Pretty => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .pretty()
            .boxed(),
        Format::Json => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .json()
            .boxed(),
    }
}
