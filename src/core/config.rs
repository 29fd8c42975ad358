/// Generator configuration, loaded from RON. Every field is optional.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::schema::factors::Property;
use crate::schema::location::WealthTiers;
use crate::schema::table::{CatalogError, DEFAULT_LINKED_LABEL, LINKED_CHARACTER_TOKEN};

/// Default depth budget for an outermost character.
pub const DEFAULT_DEPTH: i32 = 4;

/// Designated table for each rolled property.
///
/// `class_reason` and `past_reason` have no entry here: they roll on the
/// table named by the `class` and `past` results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub location: String,
    pub class: String,
    pub past: String,
    pub parents: String,
    pub birthplace: String,
    pub tutors: String,
    pub youth: String,
    pub lifestyle: String,
    pub siblings: String,
    pub birth_order: String,
    pub grow_location: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            location: "Region".to_string(),
            class: "Classes".to_string(),
            past: "Pasts".to_string(),
            parents: "Parents".to_string(),
            birthplace: "Birthplace".to_string(),
            tutors: "Tutors".to_string(),
            youth: "Youth Memories".to_string(),
            lifestyle: "Family Lifestyle".to_string(),
            siblings: "Siblings".to_string(),
            birth_order: "Birth Order".to_string(),
            grow_location: "Childhood Home".to_string(),
        }
    }
}

impl TableNames {
    pub fn for_property(&self, property: Property) -> Option<&str> {
        let name = match property {
            Property::Location => &self.location,
            Property::Class => &self.class,
            Property::Past => &self.past,
            Property::Parents => &self.parents,
            Property::Birthplace => &self.birthplace,
            Property::Tutors => &self.tutors,
            Property::Youth => &self.youth,
            Property::Lifestyle => &self.lifestyle,
            Property::Siblings => &self.siblings,
            Property::BirthOrder => &self.birth_order,
            Property::GrowLocation => &self.grow_location,
            Property::ClassReason | Property::PastReason => return None,
        };
        Some(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Depth budget for each outermost character.
    pub depth: i32,
    pub tables: TableNames,
    pub wealth_tiers: WealthTiers,
    /// Directive prefix that spawns a linked character.
    pub linked_character_token: String,
    pub default_linked_label: String,
    /// Weights for seeding the outermost character's location.
    /// Empty means the location table is rolled instead.
    pub initial_locations: BTreeMap<String, f64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            tables: TableNames::default(),
            wealth_tiers: WealthTiers::default(),
            linked_character_token: LINKED_CHARACTER_TOKEN.to_string(),
            default_linked_label: DEFAULT_LINKED_LABEL.to_string(),
            initial_locations: BTreeMap::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn load_from_ron(path: &Path) -> Result<GeneratorConfig, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<GeneratorConfig, CatalogError> {
        Ok(ron::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = GeneratorConfig::parse_ron("()").unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.depth, 4);
        assert_eq!(config.linked_character_token, "New character");
    }

    #[test]
    fn partial_config_overrides_fields() {
        let config = GeneratorConfig::parse_ron(
            r#"(
                depth: 2,
                tables: (location: "Região"),
                initial_locations: {"Zaun": 0.7, "Piltover": 0.3},
            )"#,
        )
        .unwrap();
        assert_eq!(config.depth, 2);
        assert_eq!(config.tables.location, "Região");
        assert_eq!(config.tables.class, "Classes");
        assert_eq!(config.initial_locations.len(), 2);
    }

    #[test]
    fn reason_properties_have_no_fixed_table() {
        let names = TableNames::default();
        assert_eq!(names.for_property(Property::Siblings), Some("Siblings"));
        assert_eq!(names.for_property(Property::ClassReason), None);
        assert_eq!(names.for_property(Property::PastReason), None);
    }
}
