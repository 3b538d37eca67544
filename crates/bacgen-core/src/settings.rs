//! Site settings loading and derivation.
//!
//! The input file is plain JSON, optionally annotated with `//` or `#`
//! comments. [`RawConfig`] is the file as written; [`SiteSettings`] is the
//! immutable snapshot the orchestrator works from, derived once at startup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::topic::{self, TopicPatterns};
use crate::util::strip_comments;

/// Default driver endpoint identifier.
pub const DEFAULT_DRIVER_VIP: &str = "platform.driver";

/// Name of the subdirectory holding successfully generated bundles.
pub const CONFIGS_SUBDIR: &str = "configs";
/// Name of the subdirectory holding error reports.
pub const ERRORS_SUBDIR: &str = "errors";

/// The configuration file as written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default)]
    pub topic_prefix: Option<String>,
    #[serde(default)]
    pub power_meter_id: Option<String>,
    #[serde(default)]
    pub building_power_meter: Option<String>,
    #[serde(default)]
    pub config_template: Option<Value>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub driver_vip: Option<String>,
    /// Driver-family specific settings travel in the same file.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl RawConfig {
    /// Read and parse a JSON(-with-comments) configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Settings(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&strip_comments(&text))
            .map_err(|e| Error::Settings(format!("malformed config {}: {e}", path.display())))
    }
}

/// Immutable site settings, derived once at startup and read-only afterward.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub site_id: String,
    pub campus: Option<String>,
    pub building: Option<String>,
    /// Derived AHU/meter/VAV topic patterns.
    pub topics: TopicPatterns,
    /// Configured power meter equipment id, if any.
    pub power_meter_id: Option<String>,
    /// Configured power meter name, if any.
    pub power_meter_name: Option<String>,
    /// The shared config template, passed through to the driver backend.
    pub config_template: Option<Value>,
    /// Driver endpoint all generated configs are addressed to.
    pub driver_vip: String,
    pub output_dir: PathBuf,
    pub configs_dir: PathBuf,
    pub errors_dir: PathBuf,
}

impl SiteSettings {
    /// Load settings from a configuration file.
    ///
    /// `resolve_name` is the collaborator's id-to-name resolution, used when
    /// `building` has to be derived from `site_id`.
    pub fn from_file(
        path: impl AsRef<Path>,
        resolve_name: impl Fn(&str) -> String,
    ) -> Result<Self> {
        Self::from_config(RawConfig::from_file(path)?, resolve_name)
    }

    /// Derive settings from an in-memory configuration.
    ///
    /// Creates the output directory tree as a side effect and reports the
    /// resolved absolute path to the operator.
    pub fn from_config(raw: RawConfig, resolve_name: impl Fn(&str) -> String) -> Result<Self> {
        let site_id = raw.site_id;
        let mut building = raw.building.filter(|s| !s.is_empty());
        let mut campus = raw.campus.filter(|s| !s.is_empty());
        if building.is_none() && !site_id.is_empty() {
            building = Some(resolve_name(&site_id));
        }
        if campus.is_none() && !site_id.is_empty() {
            // second-to-last dot-separated segment of the site id
            campus = site_id.rsplit('.').nth(1).map(str::to_string);
        }

        let prefix = match raw.topic_prefix.filter(|s| !s.is_empty()) {
            Some(prefix) => prefix,
            None => topic::default_prefix(campus.as_deref(), building.as_deref()),
        };
        let topics = TopicPatterns::from_prefix(&prefix);

        let output_dir = raw.output_dir.unwrap_or_else(|| {
            let default_prefix = building
                .as_deref()
                .map(|b| format!("{b}_"))
                .unwrap_or_default();
            PathBuf::from(format!("{default_prefix}driver_configs"))
        });
        if !output_dir.exists() {
            fs::create_dir_all(&output_dir)?;
        } else if !output_dir.is_dir() {
            return Err(Error::Settings(format!(
                "output path {} exists and is not a directory",
                output_dir.display()
            )));
        }
        let absolute = fs::canonicalize(&output_dir).unwrap_or_else(|_| output_dir.clone());
        tracing::info!("Output directory {}", absolute.display());

        let configs_dir = output_dir.join(CONFIGS_SUBDIR);
        fs::create_dir_all(&configs_dir)?;
        let errors_dir = output_dir.join(ERRORS_SUBDIR);
        fs::create_dir_all(&errors_dir)?;

        Ok(Self {
            site_id,
            campus,
            building,
            topics,
            power_meter_id: raw.power_meter_id.filter(|s| !s.is_empty()),
            power_meter_name: raw.building_power_meter.filter(|s| !s.is_empty()),
            config_template: raw.config_template,
            driver_vip: raw
                .driver_vip
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_DRIVER_VIP.to_string()),
            output_dir,
            configs_dir,
            errors_dir,
        })
    }
}
