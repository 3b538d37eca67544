//! Partitioned output writing.
//!
//! Successful bundles land under `<output_dir>/configs/`, error reports under
//! `<output_dir>/errors/`. Each file is an open-write-close of 4-space
//! indented JSON; there is no locking or transactional guarantee across
//! files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::bundle::{ConfigBundle, UnmappedDevices};
use crate::error::Result;
use crate::settings::SiteSettings;

/// File name (no extension) of the unmapped-device diagnostics report.
pub const DETAILS_FILE: &str = "unmapped_device_details";

/// Writes bundles and diagnostics into the configs/errors split.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    configs_dir: PathBuf,
    errors_dir: PathBuf,
}

impl OutputWriter {
    pub fn new(settings: &SiteSettings) -> Self {
        Self {
            configs_dir: settings.configs_dir.clone(),
            errors_dir: settings.errors_dir.clone(),
        }
    }

    pub fn with_dirs(configs_dir: impl Into<PathBuf>, errors_dir: impl Into<PathBuf>) -> Self {
        Self {
            configs_dir: configs_dir.into(),
            errors_dir: errors_dir.into(),
        }
    }

    /// Write a bundle to `<configs>/<name>.json`.
    pub fn write_bundle(&self, name: &str, bundle: &ConfigBundle) -> Result<PathBuf> {
        let path = self.configs_dir.join(format!("{name}.json"));
        self.write_json(&path, bundle)?;
        tracing::debug!("wrote bundle {}", path.display());
        Ok(path)
    }

    /// Write a bundle to `<errors>/<name>.json`.
    pub fn write_error_bundle(&self, name: &str, bundle: &ConfigBundle) -> Result<PathBuf> {
        let path = self.errors_dir.join(format!("{name}.json"));
        self.write_json(&path, bundle)?;
        tracing::debug!("wrote error bundle {}", path.display());
        Ok(path)
    }

    /// Write the diagnostics map to `<errors>/unmapped_device_details`.
    pub fn write_details(&self, details: &UnmappedDevices) -> Result<PathBuf> {
        let path = self.errors_dir.join(DETAILS_FILE);
        self.write_json(&path, details)?;
        Ok(path)
    }

    fn write_json(&self, path: &Path, value: &impl Serialize) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
        value.serialize(&mut serializer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::BundleEntry;
    use serde_json::json;

    fn writer(dir: &Path) -> OutputWriter {
        let configs = dir.join("configs");
        let errors = dir.join("errors");
        std::fs::create_dir_all(&configs).unwrap();
        std::fs::create_dir_all(&errors).unwrap();
        OutputWriter::with_dirs(configs, errors)
    }

    #[test]
    fn test_bundle_files_are_indented_json() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let mut bundle = ConfigBundle::new("platform.driver");
        bundle.push(BundleEntry::device(
            "devices/b1/AHU1",
            json!({"k": "v"}).as_object().unwrap().clone(),
        ));

        let path = writer.write_bundle("AHU1", &bundle).unwrap();
        assert_eq!(path.file_name().unwrap(), "AHU1.json");
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("    \"platform.driver\""));
        let round: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(round["platform.driver"][0]["config-name"], "devices/b1/AHU1");
    }

    #[test]
    fn test_error_bundle_goes_to_errors_dir() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let bundle = ConfigBundle::new("platform.driver");
        let path = writer.write_error_bundle("unmapped_vavs", &bundle).unwrap();
        assert!(path.starts_with(dir.path().join("errors")));
    }

    #[test]
    fn test_details_file_has_no_extension() {
        let dir = tempfile::tempdir().unwrap();
        let writer = writer(dir.path());
        let mut details = UnmappedDevices::new();
        details.record_error("building_power_meter", "unresolved");
        let path = writer.write_details(&details).unwrap();
        assert_eq!(path.file_name().unwrap(), DETAILS_FILE);
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["building_power_meter"]["error"], "unresolved");
    }
}
