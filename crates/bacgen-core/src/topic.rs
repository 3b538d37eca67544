//! Topic building for generated device configs.
//!
//! Topics are hierarchical `/`-separated names rooted at a site-wide prefix,
//! e.g. `devices/campus1/building1/AHU1/VAV2`. The prefix is derived once from
//! the site settings; per-device topics are produced by substituting names
//! into the three derived patterns.

/// Slot substituted with the AHU or meter name.
const NAME_SLOT: &str = "{}";
/// Slot substituted with the parent AHU name in the VAV pattern.
const AHU_SLOT: &str = "{ahu}";
/// Slot substituted with the VAV name.
const VAV_SLOT: &str = "{vav}";

/// Normalize a topic prefix to end with exactly one `/`.
pub fn normalize_prefix(prefix: &str) -> String {
    let mut prefix = prefix.trim_end_matches('/').to_string();
    prefix.push('/');
    prefix
}

/// Build the default topic prefix: `devices[/<campus>][/<building>]`.
pub fn default_prefix(campus: Option<&str>, building: Option<&str>) -> String {
    let mut prefix = String::from("devices");
    if let Some(campus) = campus {
        prefix.push('/');
        prefix.push_str(campus);
    }
    if let Some(building) = building {
        prefix.push('/');
        prefix.push_str(building);
    }
    prefix
}

/// The three topic patterns derived from a site prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPatterns {
    ahu: String,
    meter: String,
    vav: String,
}

impl TopicPatterns {
    /// Derive all patterns from a (possibly unnormalized) prefix.
    pub fn from_prefix(prefix: &str) -> Self {
        let prefix = normalize_prefix(prefix);
        Self {
            ahu: format!("{prefix}{NAME_SLOT}"),
            meter: format!("{prefix}{NAME_SLOT}"),
            vav: format!("{prefix}{AHU_SLOT}/{VAV_SLOT}"),
        }
    }

    /// Topic for an AHU.
    pub fn ahu_topic(&self, ahu_name: &str) -> String {
        self.ahu.replacen(NAME_SLOT, ahu_name, 1)
    }

    /// Topic for the building power meter.
    pub fn meter_topic(&self, meter_name: &str) -> String {
        self.meter.replacen(NAME_SLOT, meter_name, 1)
    }

    /// VAV pattern with the parent AHU fixed and the VAV slot left open.
    pub fn vav_pattern_under(&self, ahu_name: &str) -> VavPattern {
        VavPattern(self.vav.replacen(AHU_SLOT, ahu_name, 1))
    }

    /// VAV pattern for VAVs with no parent AHU: the AHU segment is removed and
    /// VAVs sit directly under the shared prefix.
    pub fn vav_pattern_unmapped(&self) -> VavPattern {
        VavPattern(self.vav.replacen(&format!("{AHU_SLOT}/"), "", 1))
    }
}

/// A VAV topic pattern with the AHU segment already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VavPattern(String);

impl VavPattern {
    /// Topic for one VAV.
    pub fn topic(&self, vav_name: &str) -> String {
        self.0.replacen(VAV_SLOT, vav_name, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("devices"), "devices/");
        assert_eq!(normalize_prefix("devices/"), "devices/");
        // collapse any pile-up of trailing separators to exactly one
        assert_eq!(normalize_prefix("devices///"), "devices/");
    }

    #[test]
    fn test_default_prefix() {
        assert_eq!(default_prefix(None, None), "devices");
        assert_eq!(default_prefix(Some("c1"), None), "devices/c1");
        assert_eq!(default_prefix(None, Some("b1")), "devices/b1");
        assert_eq!(default_prefix(Some("c1"), Some("b1")), "devices/c1/b1");
    }

    #[test]
    fn test_ahu_and_meter_topics() {
        let topics = TopicPatterns::from_prefix("devices/c1/b1");
        assert_eq!(topics.ahu_topic("AHU1"), "devices/c1/b1/AHU1");
        assert_eq!(topics.meter_topic("M1"), "devices/c1/b1/M1");
    }

    #[test]
    fn test_vav_under_ahu() {
        let topics = TopicPatterns::from_prefix("devices/b1/");
        let pattern = topics.vav_pattern_under("AHU1");
        assert_eq!(pattern.topic("VAV2"), "devices/b1/AHU1/VAV2");
    }

    #[test]
    fn test_vav_without_ahu_sits_under_prefix() {
        let topics = TopicPatterns::from_prefix("devices/b1");
        let pattern = topics.vav_pattern_unmapped();
        assert_eq!(pattern.topic("VAV9"), "devices/b1/VAV9");
    }
}
