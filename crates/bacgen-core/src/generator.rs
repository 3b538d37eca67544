//! Hierarchy walker and config orchestrator.
//!
//! Walks the AHU/VAV hierarchy and the building power meter, producing one
//! [`ConfigBundle`] per AHU group (and one for the meter). Devices whose
//! template cannot be instantiated, or whose registry file cannot be
//! generated, contribute nothing; named groups that still mapped at least one
//! device are emitted with just that subset. Groups with no parent AHU are
//! routed to the error output under [`UNMAPPED_VAVS`] instead of the configs
//! output.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::backend::{DriverBackend, EquipType};
use crate::bundle::{BundleEntry, ConfigBundle, DeviceConfig, UnmappedDevices};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use crate::settings::{RawConfig, SiteSettings};
use crate::util::is_truthy;

/// Fixed bundle name for VAVs with no parent AHU.
pub const UNMAPPED_VAVS: &str = "unmapped_vavs";
/// Diagnostics key for a building meter that could not be resolved.
pub const METER_DETAIL_KEY: &str = "building_power_meter";

/// Device config field that references the registry/point-map file.
const REGISTRY_FIELD: &str = "registry_config";

/// Outcome of a full generation run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Devices that could not be mapped, keyed by device id (or
    /// [`METER_DETAIL_KEY`] for the building meter).
    pub unmapped_devices: UnmappedDevices,
    /// Path of the diagnostics file, present when any device was unmapped.
    pub details_path: Option<PathBuf>,
}

impl RunOutcome {
    /// True when every device was mapped.
    pub fn fully_mapped(&self) -> bool {
        self.unmapped_devices.is_empty()
    }

    /// Process exit code: 0 when fully mapped, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.fully_mapped() {
            0
        } else {
            1
        }
    }

    /// Operator-facing message naming the diagnostics file, when any device
    /// was left unmapped.
    pub fn failure_message(&self) -> Option<String> {
        self.details_path.as_deref().map(|path| {
            format!(
                "Unable to generate configurations for all AHUs and VAVs. \
                 See {} for details",
                path.display()
            )
        })
    }
}

/// Drives config generation for one site against a driver-family backend.
pub struct ConfigGenerator<B: DriverBackend> {
    settings: SiteSettings,
    backend: B,
}

impl<B: DriverBackend> ConfigGenerator<B> {
    /// Derive settings from an in-memory configuration and build the
    /// generator.
    pub fn new(raw: RawConfig, backend: B) -> Result<Self> {
        let settings = SiteSettings::from_config(raw, |id| backend.name_from_id(id))?;
        Ok(Self { settings, backend })
    }

    /// Load the configuration file and build the generator.
    pub fn from_file(path: impl AsRef<Path>, backend: B) -> Result<Self> {
        Self::new(RawConfig::from_file(path)?, backend)
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Walk the hierarchy and the building meter, writing one bundle per
    /// group, and return the run outcome for exit-code mapping.
    pub fn generate(&mut self) -> Result<RunOutcome> {
        let writer = OutputWriter::new(&self.settings);
        let hierarchy = self.backend.ahu_and_vavs()?;
        tracing::info!(groups = hierarchy.len(), "processing equipment hierarchy");

        let mut unmapped = UnmappedDevices::new();
        for group in &hierarchy {
            let (ahu_name, bundle) = self.ahu_bundle(group.ahu_id.as_deref(), &group.vav_ids)?;
            if bundle.is_empty() {
                tracing::debug!(ahu = ?group.ahu_id, "no valid configs for group, skipping");
                continue;
            }
            match ahu_name {
                Some(name) => writer.write_bundle(&name, &bundle)?,
                None => writer.write_error_bundle(UNMAPPED_VAVS, &bundle)?,
            };
        }

        match self.backend.building_meter() {
            Ok(meter_id) => {
                let (meter_name, bundle) = self.meter_bundle(&meter_id)?;
                if !bundle.is_empty() {
                    writer.write_bundle(&meter_name, &bundle)?;
                }
            }
            Err(Error::MeterLookup(message)) => {
                tracing::warn!("building meter unresolved: {message}");
                unmapped.record_error(METER_DETAIL_KEY, message);
            }
            Err(other) => return Err(other),
        }

        let details_path = if unmapped.is_empty() {
            None
        } else {
            let path = writer.write_details(&unmapped)?;
            tracing::error!(
                "Unable to generate configurations for all AHUs and VAVs. See {} for details",
                path.display()
            );
            Some(path)
        };
        Ok(RunOutcome {
            unmapped_devices: unmapped,
            details_path,
        })
    }

    /// Build the bundle for one AHU group. Returns the resolved AHU name
    /// (`None` for the unmapped bucket) and the bundle, possibly empty.
    fn ahu_bundle(
        &self,
        ahu_id: Option<&str>,
        vav_ids: &[String],
    ) -> Result<(Option<String>, ConfigBundle)> {
        let mut bundle = ConfigBundle::new(&self.settings.driver_vip);
        let mut ahu_name = None;

        // The AHU itself first, fixing the VAV pattern for its children.
        let vav_pattern = match ahu_id {
            Some(ahu_id) => {
                let name = self.backend.name_from_id(ahu_id);
                let topic = self.settings.topics.ahu_topic(&name);
                let config = self.backend.config_from_template(ahu_id, EquipType::Ahu);
                if let Some(config) =
                    self.resolve_registry(config, ahu_id, EquipType::Ahu, &mut bundle)?
                {
                    bundle.push(BundleEntry::device(topic, config));
                }
                let pattern = self.settings.topics.vav_pattern_under(&name);
                ahu_name = Some(name);
                pattern
            }
            None => self.settings.topics.vav_pattern_unmapped(),
        };

        for vav_id in vav_ids {
            let vav_name = self.backend.name_from_id(vav_id);
            let topic = vav_pattern.topic(&vav_name);
            let config = self.backend.config_from_template(vav_id, EquipType::Vav);
            if let Some(config) =
                self.resolve_registry(config, vav_id, EquipType::Vav, &mut bundle)?
            {
                bundle.push(BundleEntry::device(topic, config));
            }
        }
        Ok((ahu_name, bundle))
    }

    /// Build the bundle for the building power meter.
    fn meter_bundle(&self, meter_id: &str) -> Result<(String, ConfigBundle)> {
        let mut bundle = ConfigBundle::new(&self.settings.driver_vip);
        let meter_name = self.backend.name_from_id(meter_id);
        let topic = self.settings.topics.meter_topic(&meter_name);
        let config = self.backend.config_from_template(meter_id, EquipType::Meter);
        if let Some(config) =
            self.resolve_registry(config, meter_id, EquipType::Meter, &mut bundle)?
        {
            bundle.push(BundleEntry::device(topic, config));
        }
        Ok((meter_name, bundle))
    }

    /// Registry resolver.
    ///
    /// Returns the (possibly rewritten) config when the device maps, `None`
    /// when it contributes nothing. When the config declares a registry file,
    /// the reference is rewritten in place to a config-store URI and the file
    /// is appended to the bundle ahead of the device entry.
    fn resolve_registry(
        &self,
        config: Option<DeviceConfig>,
        equip_id: &str,
        equip_type: EquipType,
        bundle: &mut ConfigBundle,
    ) -> Result<Option<DeviceConfig>> {
        let Some(mut config) = config else {
            return Ok(None);
        };
        let needs_registry = config.get(REGISTRY_FIELD).is_some_and(is_truthy);
        if needs_registry {
            let Some(file) = self.backend.registry_config(equip_id, equip_type)? else {
                tracing::debug!(%equip_id, %equip_type, "no registry file generated");
                return Ok(None);
            };
            let registry_name = format!("registry_config/{equip_id}.{}", file.config_type);
            config.insert(
                REGISTRY_FIELD.to_string(),
                Value::String(format!("config://{registry_name}")),
            );
            bundle.push(BundleEntry::registry(
                registry_name,
                file.content,
                file.config_type,
            ));
        }
        Ok(Some(config))
    }
}
