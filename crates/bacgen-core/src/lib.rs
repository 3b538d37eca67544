//! Driver Configuration Generation Crate
//!
//! This crate generates per-device platform driver configurations for a
//! building-automation site from a single site-level template plus the site's
//! equipment hierarchy (AHUs, their VAVs, and the building power meter).
//!
//! ## Architecture
//!
//! - **SiteSettings**: immutable snapshot derived from the JSON(-with-comments)
//!   configuration file — topic prefix, derived topic patterns, output paths
//! - **DriverBackend**: capability set a concrete driver family (BACnet,
//!   Modbus, ...) supplies — hierarchy enumeration, meter lookup, template
//!   instantiation, name resolution, optional registry generation
//! - **ConfigGenerator**: walks the hierarchy, builds one [`ConfigBundle`] per
//!   AHU group and one for the meter, and partitions output into `configs/`
//!   and `errors/` directories
//!
//! Devices that cannot be mapped are isolated rather than fatal: the run
//! completes, diagnostics land in `errors/unmapped_device_details`, and the
//! returned [`RunOutcome`] maps to a non-zero exit code.

pub mod backend;
pub mod bundle;
pub mod error;
pub mod generator;
pub mod hierarchy;
pub mod output;
pub mod settings;
pub mod topic;
pub mod util;

// Re-exports for convenience
pub use backend::{DriverBackend, EquipType, RegistryFile};
pub use bundle::{BundleEntry, ConfigBundle, DeviceConfig, UnmappedDevices};
pub use error::{Error, Result};
pub use generator::{ConfigGenerator, RunOutcome, METER_DETAIL_KEY, UNMAPPED_VAVS};
pub use hierarchy::{AhuGroup, Hierarchy};
pub use output::{OutputWriter, DETAILS_FILE};
pub use settings::{RawConfig, SiteSettings, DEFAULT_DRIVER_VIP};
pub use topic::{TopicPatterns, VavPattern};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
