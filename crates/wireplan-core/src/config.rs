//! Generator run configuration.
//!
//! Provides [`GeneratorConfig`] for configuring a generation run. Values are
//! loaded from environment variables; per-property and per-enum wire settings
//! are part of the object model itself and never live here.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{WireFormat, WirePlanError, WirePlanResult};

/// Configuration for a single generation run.
///
/// # Examples
///
/// ```
/// use wireplan_core::GeneratorConfig;
///
/// let config = GeneratorConfig::default();
/// assert!(config.parallel);
/// assert_eq!(config.formats.len(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,

    /// Whether per-type planning fans out over a thread pool.
    #[builder(default = true)]
    pub parallel: bool,

    /// Wire formats to produce plans for.
    #[builder(default = WireFormat::ALL.to_vec())]
    pub formats: Vec<WireFormat>,

    /// Whether the host binary also emits Rust type declarations.
    #[builder(default = true)]
    pub emit_types: bool,

    /// Directory the host binary writes its output into.
    #[builder(default = String::from("generated"))]
    pub output_dir: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            log_level: String::from("info"),
            parallel: true,
            formats: WireFormat::ALL.to_vec(),
            emit_types: true,
            output_dir: String::from("generated"),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `WIREPLAN_LOG_LEVEL` (or `LOG_LEVEL`) | `info` |
    /// | `WIREPLAN_PARALLEL` | `true` |
    /// | `WIREPLAN_FORMATS` | `json,xml` |
    /// | `WIREPLAN_EMIT_TYPES` | `true` |
    /// | `WIREPLAN_OUTPUT_DIR` | `generated` |
    ///
    /// # Errors
    ///
    /// Returns [`WirePlanError::UnknownFormat`] if `WIREPLAN_FORMATS` names an
    /// unsupported format, or [`WirePlanError::Config`] if it names none.
    pub fn from_env() -> WirePlanResult<Self> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("WIREPLAN_LOG_LEVEL").or_else(|_| std::env::var("LOG_LEVEL"))
        {
            config.log_level = v;
        }
        if let Ok(v) = std::env::var("WIREPLAN_PARALLEL") {
            config.parallel = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("WIREPLAN_FORMATS") {
            config.formats = parse_formats(&v)?;
        }
        if let Ok(v) = std::env::var("WIREPLAN_EMIT_TYPES") {
            config.emit_types = parse_bool(&v);
        }
        if let Ok(v) = std::env::var("WIREPLAN_OUTPUT_DIR") {
            config.output_dir = v;
        }

        Ok(config)
    }
}

/// Parse a string as a boolean, accepting `"1"` and `"true"` (case-insensitive).
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Parse a comma-separated list of format names, dropping duplicates.
fn parse_formats(value: &str) -> WirePlanResult<Vec<WireFormat>> {
    let mut formats = Vec::new();
    for name in value.split(',').filter(|s| !s.trim().is_empty()) {
        let format: WireFormat = name.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(WirePlanError::Config(
            "WIREPLAN_FORMATS must name at least one format".to_owned(),
        ));
    }
    Ok(formats)
}
