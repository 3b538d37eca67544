//! Config bundles and the unmapped-device accumulator.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A device configuration produced from the shared template.
pub type DeviceConfig = serde_json::Map<String, Value>;

/// One entry destined for a bundle file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleEntry {
    /// Config store name, usually the device topic.
    #[serde(rename = "config-name")]
    pub config_name: String,
    /// The config payload.
    pub config: Value,
    /// Set for registry entries (e.g. `csv`), absent for device configs.
    #[serde(
        rename = "config-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub config_type: Option<String>,
}

impl BundleEntry {
    /// Entry for a device config addressed by topic.
    pub fn device(config_name: impl Into<String>, config: DeviceConfig) -> Self {
        Self {
            config_name: config_name.into(),
            config: Value::Object(config),
            config_type: None,
        }
    }

    /// Entry for a registry/point-map file with its type tag.
    pub fn registry(
        config_name: impl Into<String>,
        content: Value,
        config_type: impl Into<String>,
    ) -> Self {
        Self {
            config_name: config_name.into(),
            config: content,
            config_type: Some(config_type.into()),
        }
    }
}

/// The set of config entries destined for one output file, keyed by the
/// driver endpoint identifier.
///
/// Serializes as `{"<driver_vip>": [entries...]}`. An empty bundle is never
/// written to disk; callers check [`ConfigBundle::is_empty`] first.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigBundle {
    driver_vip: String,
    entries: Vec<BundleEntry>,
}

impl ConfigBundle {
    pub fn new(driver_vip: impl Into<String>) -> Self {
        Self {
            driver_vip: driver_vip.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: BundleEntry) {
        self.entries.push(entry);
    }

    pub fn driver_vip(&self) -> &str {
        &self.driver_vip
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Serialize for ConfigBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.driver_vip, &self.entries)?;
        map.end()
    }
}

/// Devices that could not be mapped, with diagnostic details to help an
/// operator finish the mapping manually.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnmappedDevices(BTreeMap<String, Value>);

impl UnmappedDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record arbitrary diagnostic details for one device.
    pub fn record(&mut self, device_id: impl Into<String>, details: Value) {
        self.0.insert(device_id.into(), details);
    }

    /// Record an error message under the conventional `{"error": msg}` shape.
    pub fn record_error(&mut self, device_id: impl Into<String>, message: impl ToString) {
        self.record(
            device_id,
            serde_json::json!({ "error": message.to_string() }),
        );
    }

    pub fn get(&self, device_id: &str) -> Option<&Value> {
        self.0.get(device_id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
