/// Character factors — the resolved property tree of one generated character.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::location::{LocationModifier, Multipliers};
use super::value::Value;

/// The fixed checklist of properties, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Location,
    Class,
    ClassReason,
    Past,
    PastReason,
    Parents,
    Birthplace,
    Tutors,
    Youth,
    Lifestyle,
    Siblings,
    BirthOrder,
    GrowLocation,
}

impl Property {
    pub const ALL: [Property; 13] = [
        Property::Location,
        Property::Class,
        Property::ClassReason,
        Property::Past,
        Property::PastReason,
        Property::Parents,
        Property::Birthplace,
        Property::Tutors,
        Property::Youth,
        Property::Lifestyle,
        Property::Siblings,
        Property::BirthOrder,
        Property::GrowLocation,
    ];

    /// Key used in location tendencies and exported output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Class => "class",
            Self::ClassReason => "class_reason",
            Self::Past => "past",
            Self::PastReason => "past_reason",
            Self::Parents => "parents",
            Self::Birthplace => "birthplace",
            Self::Tutors => "tutors",
            Self::Youth => "youth",
            Self::Lifestyle => "lifestyle",
            Self::Siblings => "siblings",
            Self::BirthOrder => "birth_order",
            Self::GrowLocation => "grow_location",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any resolved value in a character tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    /// A bare value: a seeded factor, a rolled location, or the sibling count.
    Scalar(Value),
    /// A table entry with its follow-ups attached.
    Entry(ResolvedEntry),
    /// A fully generated linked character.
    Character(Box<CharacterFactors>),
}

impl Resolved {
    /// The primary value: the scalar itself or the entry's `result`.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Entry(e) => Some(&e.result),
            Self::Character(_) => None,
        }
    }
}

/// A copy of a chosen entry, without its bookkeeping weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedEntry {
    pub result: Value,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
    /// Present only when the entry declared follow-ups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extras: Option<Vec<Extra>>,
}

/// One resolved follow-up attached to an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extra {
    pub label: String,
    pub value: Resolved,
}

/// The accumulating property map for one character.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CharacterFactors {
    factors: BTreeMap<Property, Resolved>,
}

impl CharacterFactors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed factors with a fixed location.
    pub fn with_location(location: impl Into<Value>) -> Self {
        let mut factors = Self::new();
        factors.insert(Property::Location, Resolved::Scalar(location.into()));
        factors
    }

    pub fn get(&self, property: Property) -> Option<&Resolved> {
        self.factors.get(&property)
    }

    pub fn contains(&self, property: Property) -> bool {
        self.factors.contains_key(&property)
    }

    pub fn insert(&mut self, property: Property, value: Resolved) {
        self.factors.insert(property, value);
    }

    /// The resolved value's `result`, if the property is present.
    pub fn result(&self, property: Property) -> Option<&Value> {
        self.get(property).and_then(Resolved::result)
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Properties in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (&Property, &Resolved)> {
        self.factors.iter()
    }

    /// True once every property in the checklist is present.
    pub fn is_complete(&self) -> bool {
        Property::ALL.iter().all(|p| self.contains(*p))
    }
}

/// Per-character weight multipliers derived from its location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tendencies {
    by_property: BTreeMap<String, Multipliers>,
}

impl Tendencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a location's tendencies in, multiplying onto existing values.
    pub fn merge_location(&mut self, modifier: &LocationModifier) {
        for (property, multipliers) in &modifier.tendencies {
            let slot = self.by_property.entry(property.clone()).or_default();
            for (key, factor) in multipliers {
                *slot.entry(key.clone()).or_insert(1.0) *= factor;
            }
        }
    }

    pub fn for_property(&self, property: Property) -> Option<&Multipliers> {
        self.by_property.get(property.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_order_matches_checklist() {
        let mut sorted = Property::ALL;
        sorted.sort();
        assert_eq!(sorted, Property::ALL);
        assert_eq!(Property::BirthOrder.name(), "birth_order");
    }

    #[test]
    fn seeded_location_is_scalar() {
        let factors = CharacterFactors::with_location("Zaun");
        assert!(matches!(
            factors.get(Property::Location),
            Some(Resolved::Scalar(Value::Text(s))) if s == "Zaun"
        ));
        assert!(!factors.is_complete());
    }

    #[test]
    fn tendencies_merge_multiplicatively() {
        let mut modifier = LocationModifier::new(1.0);
        modifier.tendencies.insert(
            "lifestyle".to_string(),
            Multipliers::from([("Pobre".to_string(), 2.0)]),
        );

        let mut tendencies = Tendencies::new();
        tendencies.merge_location(&modifier);
        tendencies.merge_location(&modifier);

        let lifestyle = tendencies.for_property(Property::Lifestyle).unwrap();
        assert_eq!(lifestyle["Pobre"], 4.0);
        assert!(tendencies.for_property(Property::Class).is_none());
    }

    #[test]
    fn entry_without_extras_serializes_without_field() {
        let entry = ResolvedEntry {
            result: Value::from("Modesto"),
            attributes: BTreeMap::new(),
            extras: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({"result": "Modesto"}));
    }
}
