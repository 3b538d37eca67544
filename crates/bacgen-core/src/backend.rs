//! Driver-family backend interface.
//!
//! Each field-bus driver family (BACnet, Modbus, ...) knows how to enumerate
//! equipment from its own external source and how to fill the shared config
//! template for one device. The orchestrator consumes that capability set
//! through [`DriverBackend`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bundle::DeviceConfig;
use crate::error::{Error, Result};
use crate::hierarchy::Hierarchy;

/// Equipment type tag passed through template and registry generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipType {
    Ahu,
    Vav,
    Meter,
}

impl EquipType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipType::Ahu => "ahu",
            EquipType::Vav => "vav",
            EquipType::Meter => "meter",
        }
    }
}

impl fmt::Display for EquipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated registry/point-map file and its type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryFile {
    /// File content (CSV text, a JSON point list, ...).
    pub content: Value,
    /// Type tag, becomes the file extension and the entry's `config-type`.
    pub config_type: String,
}

impl RegistryFile {
    pub fn new(content: Value, config_type: impl Into<String>) -> Self {
        Self {
            content,
            config_type: config_type.into(),
        }
    }
}

/// Capability set a concrete driver family supplies to the orchestrator.
///
/// Template instantiation must be idempotent and must signal a device that
/// cannot be mapped by returning `None` rather than an error, so the run can
/// continue past it.
pub trait DriverBackend {
    /// The AHU to VAV mapping for the site.
    fn ahu_and_vavs(&mut self) -> Result<Hierarchy>;

    /// The building power meter equipment id.
    ///
    /// Returns [`Error::MeterLookup`] when the meter cannot be resolved; the
    /// orchestrator records that as a diagnostic instead of aborting.
    fn building_meter(&mut self) -> Result<String>;

    /// Fill the shared config template for one device. `None` means the
    /// device cannot be mapped and contributes nothing to the run.
    fn config_from_template(&self, equip_id: &str, equip_type: EquipType) -> Option<DeviceConfig>;

    /// Canonical name for an equipment id, used in topics and file names.
    fn name_from_id(&self, equip_id: &str) -> String;

    /// Generate a registry/point-map file for one device.
    ///
    /// Driver families whose configs reference registry files must override
    /// this; the default reports a capability error. `Ok(None)` marks the
    /// device as unmapped without aborting the run.
    fn registry_config(
        &self,
        equip_id: &str,
        _equip_type: EquipType,
    ) -> Result<Option<RegistryFile>> {
        Err(Error::RegistryUnsupported(equip_id.to_string()))
    }
}
