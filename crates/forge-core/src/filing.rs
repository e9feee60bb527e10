//! # Filing System
//!
//! Three append-only buckets. Storage only: nothing here decides which zone
//! an item belongs in.

use serde::{Deserialize, Serialize};

/// One of the three filing zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    GreenZone,
    YellowZone,
    RedZone,
}

impl Zone {
    pub const ALL: [Self; 3] = [Self::GreenZone, Self::YellowZone, Self::RedZone];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GreenZone => "green_zone",
            Self::YellowZone => "yellow_zone",
            Self::RedZone => "red_zone",
        }
    }
}

/// Item counts per zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingCounts {
    pub green_zone: usize,
    pub yellow_zone: usize,
    pub red_zone: usize,
    pub total_items: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilingSystem {
    green_zone: Vec<String>,
    yellow_zone: Vec<String>,
    red_zone: Vec<String>,
}

impl FilingSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item to a zone.
    pub fn file(&mut self, zone: Zone, item: impl Into<String>) {
        self.zone_mut(zone).push(item.into());
    }

    #[must_use]
    pub fn items(&self, zone: Zone) -> &[String] {
        match zone {
            Zone::GreenZone => &self.green_zone,
            Zone::YellowZone => &self.yellow_zone,
            Zone::RedZone => &self.red_zone,
        }
    }

    fn zone_mut(&mut self, zone: Zone) -> &mut Vec<String> {
        match zone {
            Zone::GreenZone => &mut self.green_zone,
            Zone::YellowZone => &mut self.yellow_zone,
            Zone::RedZone => &mut self.red_zone,
        }
    }

    #[must_use]
    pub fn counts(&self) -> FilingCounts {
        let (green_zone, yellow_zone, red_zone) = (
            self.green_zone.len(),
            self.yellow_zone.len(),
            self.red_zone.len(),
        );
        FilingCounts {
            green_zone,
            yellow_zone,
            red_zone,
            total_items: green_zone + yellow_zone + red_zone,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn starts_with_three_empty_zones() {
        let filing = FilingSystem::new();
        for zone in Zone::ALL {
            assert!(filing.items(zone).is_empty());
        }
        assert_eq!(filing.counts().total_items, 0);
    }

    #[test]
    fn file_appends_in_order() {
        let mut filing = FilingSystem::new();
        filing.file(Zone::YellowZone, "first");
        filing.file(Zone::YellowZone, "second");
        filing.file(Zone::RedZone, "urgent");

        assert_eq!(filing.items(Zone::YellowZone), ["first", "second"]);
        let counts = filing.counts();
        assert_eq!(counts.yellow_zone, 2);
        assert_eq!(counts.red_zone, 1);
        assert_eq!(counts.total_items, 3);
    }

    #[test]
    fn serializes_zone_names() {
        let json = serde_json::to_value(FilingSystem::new()).unwrap();
        assert!(json.get("green_zone").is_some());
        assert!(json.get("yellow_zone").is_some());
        assert!(json.get("red_zone").is_some());
    }
}
