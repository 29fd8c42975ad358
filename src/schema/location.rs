/// Location modifiers and the lifestyle wealth scale.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::table::CatalogError;

/// Sparse `entry result → multiplier` map applied to one table's weights.
pub type Multipliers = BTreeMap<String, f64>;

/// Per-location biases applied while generating a character from there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationModifier {
    /// Positive multiplier; values below 1 make cheaper lifestyles likelier.
    pub wealth: f64,
    /// Property name → (entry result → multiplier).
    #[serde(default)]
    pub tendencies: BTreeMap<String, Multipliers>,
    /// Candidate location → weight, used to place linked characters.
    #[serde(default)]
    pub origin_weights: BTreeMap<String, f64>,
}

impl LocationModifier {
    pub fn new(wealth: f64) -> Self {
        Self {
            wealth,
            tendencies: BTreeMap::new(),
            origin_weights: BTreeMap::new(),
        }
    }
}

/// Read-only store of location modifiers keyed by location name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationCatalog {
    pub locations: FxHashMap<String, LocationModifier>,
}

impl LocationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, modifier: LocationModifier) {
        self.locations.insert(name.into(), modifier);
    }

    pub fn get(&self, name: &str) -> Option<&LocationModifier> {
        self.locations.get(name)
    }

    /// Load location modifiers from a RON file: a map of location name to modifier.
    pub fn load_from_ron(path: &Path) -> Result<LocationCatalog, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<LocationCatalog, CatalogError> {
        let locations: FxHashMap<String, LocationModifier> = ron::from_str(input)?;
        Ok(LocationCatalog { locations })
    }

    pub fn merge(&mut self, other: LocationCatalog) {
        for (name, modifier) in other.locations {
            self.locations.insert(name, modifier);
        }
    }
}

/// Lifestyle name → household wealth multiplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WealthTiers {
    pub tiers: BTreeMap<String, f64>,
}

impl Default for WealthTiers {
    fn default() -> Self {
        let tiers = [
            ("Miserável", 0.6),
            ("Esquálido", 0.8),
            ("Pobre", 0.9),
            ("Modesto", 1.0),
            ("Confortável", 1.2),
            ("Rico", 1.6),
            ("Aristocrático", 2.0),
        ];
        Self {
            tiers: tiers
                .into_iter()
                .map(|(name, wealth)| (name.to_string(), wealth))
                .collect(),
        }
    }
}

impl WealthTiers {
    pub fn get(&self, lifestyle: &str) -> Option<f64> {
        self.tiers.get(lifestyle).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tiers_rise_with_scale() {
        let tiers = WealthTiers::default();
        assert_eq!(tiers.tiers.len(), 7);
        let ordered = [
            "Miserável",
            "Esquálido",
            "Pobre",
            "Modesto",
            "Confortável",
            "Rico",
            "Aristocrático",
        ];
        for pair in ordered.windows(2) {
            assert!(tiers.get(pair[0]).unwrap() < tiers.get(pair[1]).unwrap());
        }
        assert_eq!(tiers.get("Rico"), Some(1.6));
        assert_eq!(tiers.get("Unknown"), None);
    }

    #[test]
    fn parse_locations_from_ron() {
        let catalog = LocationCatalog::parse_ron(
            r#"{
                "Zaun": (
                    wealth: 0.8,
                    tendencies: {"lifestyle": {"Pobre": 2.0}},
                    origin_weights: {"Zaun": 9.0, "Piltover": 1.0},
                ),
                "Piltover": (wealth: 1.3),
            }"#,
        )
        .unwrap();
        let zaun = catalog.get("Zaun").unwrap();
        assert_eq!(zaun.wealth, 0.8);
        assert_eq!(zaun.tendencies["lifestyle"]["Pobre"], 2.0);
        assert_eq!(zaun.origin_weights.len(), 2);
        let piltover = catalog.get("Piltover").unwrap();
        assert!(piltover.tendencies.is_empty());
        assert!(piltover.origin_weights.is_empty());
    }
}
