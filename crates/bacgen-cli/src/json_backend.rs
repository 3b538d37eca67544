//! JSON-file-backed driver family.
//!
//! Field-bus families (BACnet, Modbus, ...) enumerate equipment from their own
//! external sources. This backend instead reads everything from the site
//! configuration file itself, which makes it useful for sites whose hierarchy
//! was exported ahead of time and for exercising the pipeline end to end.
//!
//! Recognized keys (beyond the core site settings):
//! - `equipment`: `{"ahu_id": ["vav_id", ...]}` or `[["ahu_id"|null, [...]], ...]`;
//!   a `null` or `""` AHU id marks VAVs with no known parent
//! - `device_names`: optional `{"id": "name"}` map; unknown ids fall back to
//!   the last dot-separated segment of the id
//! - `registry_template`: optional registry file content template; its
//!   presence enables registry generation
//! - `registry_config_type`: type tag for generated registry files
//!   (default `csv`)

use serde_json::{Map, Value};

use bacgen_core::{
    DeviceConfig, DriverBackend, EquipType, Error, Hierarchy, RawConfig, RegistryFile, Result,
};

/// Driver backend reading the hierarchy, meter, names and template
/// substitutions from the configuration file.
pub struct JsonBackend {
    equipment: Option<Value>,
    device_names: Map<String, Value>,
    config_template: Option<Value>,
    power_meter_id: Option<String>,
    registry_template: Option<Value>,
    registry_type: String,
}

impl JsonBackend {
    pub fn from_config(raw: &RawConfig) -> Self {
        Self {
            equipment: raw.extra.get("equipment").cloned(),
            device_names: raw
                .extra
                .get("device_names")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            config_template: raw.config_template.clone(),
            power_meter_id: raw.power_meter_id.clone().filter(|s| !s.is_empty()),
            registry_template: raw.extra.get("registry_template").cloned(),
            registry_type: raw
                .extra
                .get("registry_config_type")
                .and_then(Value::as_str)
                .unwrap_or("csv")
                .to_string(),
        }
    }

    /// Substitute `{equip_id}`, `{equip_name}` and `{equip_type}` in every
    /// string value of the template.
    fn substitute(&self, template: &Value, equip_id: &str, equip_type: EquipType) -> Value {
        match template {
            Value::String(s) => Value::String(
                s.replace("{equip_id}", equip_id)
                    .replace("{equip_name}", &self.name_from_id(equip_id))
                    .replace("{equip_type}", equip_type.as_str()),
            ),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|v| self.substitute(v, equip_id, equip_type))
                    .collect(),
            ),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.substitute(v, equip_id, equip_type)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl DriverBackend for JsonBackend {
    fn ahu_and_vavs(&mut self) -> Result<Hierarchy> {
        let equipment = self.equipment.as_ref().ok_or_else(|| {
            Error::Settings("config has no \"equipment\" key with the AHU/VAV hierarchy".into())
        })?;
        Hierarchy::from_value(equipment)
    }

    fn building_meter(&mut self) -> Result<String> {
        self.power_meter_id
            .clone()
            .ok_or_else(|| Error::MeterLookup("no power_meter_id configured".into()))
    }

    fn config_from_template(&self, equip_id: &str, equip_type: EquipType) -> Option<DeviceConfig> {
        let template = self.config_template.as_ref()?.as_object()?;
        if template.is_empty() {
            return None;
        }
        let filled = self.substitute(&Value::Object(template.clone()), equip_id, equip_type);
        match filled {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn name_from_id(&self, equip_id: &str) -> String {
        if let Some(name) = self.device_names.get(equip_id).and_then(Value::as_str) {
            return name.to_string();
        }
        equip_id
            .rsplit('.')
            .next()
            .unwrap_or(equip_id)
            .to_string()
    }

    fn registry_config(&self, equip_id: &str, equip_type: EquipType) -> Result<Option<RegistryFile>> {
        match &self.registry_template {
            Some(template) => Ok(Some(RegistryFile::new(
                self.substitute(template, equip_id, equip_type),
                self.registry_type.clone(),
            ))),
            None => Err(Error::RegistryUnsupported(equip_id.to_string())),
        }
    }
}
