//! Log output for tools embedding gradus.
//!
//! `GRADUS_LOG` (falling back to `RUST_LOG`) selects what is logged, with the
//! usual `EnvFilter` syntax. `GRADUS_LOG_FORMAT` picks the layout: `text`
//! (default), `tree` for nested relation checks, or `json`.
//!
//! ```bash
//! GRADUS_LOG=gradus_solver=debug GRADUS_LOG_FORMAT=tree cargo bench
//! GRADUS_LOG=gradus::query_json=trace GRADUS_LOG_FORMAT=json cargo bench
//! ```
//!
//! The second form streams one JSON object per relation check and interface
//! resolution; the solver only builds those events while that target is
//! enabled.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Filter directive selecting the per-query JSON events.
pub const QUERY_TRACE_FILTER: &str = "gradus::query_json=trace";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Tree,
    Json,
}

impl LogFormat {
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// A filter and a layout, ready to install as the global subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub filter: String,
    pub format: LogFormat,
}

impl LogSettings {
    /// Settings from the process environment, or `None` when logging was not
    /// requested.
    pub fn from_env() -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok();
        Self::from_vars(
            var("GRADUS_LOG").as_deref(),
            var("RUST_LOG").as_deref(),
            var("GRADUS_LOG_FORMAT").as_deref(),
        )
    }

    /// `gradus_log` takes precedence over `rust_log`.
    pub fn from_vars(
        gradus_log: Option<&str>,
        rust_log: Option<&str>,
        format: Option<&str>,
    ) -> Option<Self> {
        let filter = gradus_log.or(rust_log)?;
        Some(LogSettings {
            filter: filter.to_string(),
            format: LogFormat::parse(format.unwrap_or_default()),
        })
    }

    /// Only the query trace, as JSON.
    pub fn query_trace() -> Self {
        LogSettings {
            filter: QUERY_TRACE_FILTER.to_string(),
            format: LogFormat::Json,
        }
    }

    /// Install as the global subscriber, writing to stderr. Returns `false`
    /// when another subscriber is already installed.
    pub fn init(&self) -> bool {
        let filter = EnvFilter::builder().parse_lossy(&self.filter);
        let installed = match self.format {
            LogFormat::Tree => {
                let tree_layer = tracing_tree::HierarchicalLayer::default()
                    .with_indent_amount(2)
                    .with_indent_lines(true)
                    .with_deferred_spans(true)
                    .with_targets(true);
                Registry::default().with(filter).with(tree_layer).try_init()
            }
            LogFormat::Json => {
                let json_layer = fmt::layer().json().with_writer(std::io::stderr);
                Registry::default().with(filter).with(json_layer).try_init()
            }
            LogFormat::Text => {
                let text_layer = fmt::layer().with_writer(std::io::stderr);
                Registry::default().with(filter).with(text_layer).try_init()
            }
        };
        installed.is_ok()
    }
}

/// Install a subscriber from the environment. A no-op unless `GRADUS_LOG` or
/// `RUST_LOG` is set.
pub fn init_tracing() {
    if let Some(settings) = LogSettings::from_env() {
        settings.init();
    }
}
