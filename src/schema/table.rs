/// Weighted decision tables — entries, follow-up directives, and the catalog.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use super::value::Value;

/// Directive token that requests a brand-new linked character.
pub const LINKED_CHARACTER_TOKEN: &str = "New character";
/// Label given to a linked character whose directive has no role suffix.
pub const DEFAULT_LINKED_LABEL: &str = "Character";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid entry in table '{table}': {reason}")]
    InvalidEntry { table: String, reason: String },
}

/// Row keys that cannot be attributes: they would shadow fields of a
/// resolved entry once it is exported.
const RESERVED_KEYS: [&str; 1] = ["extras"];

/// One row of a weighted table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub result: Value,
    /// Base selection weight. Must be positive.
    pub chance: f64,
    /// Follow-up directives, raw as written in the catalog.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_rolls: Vec<String>,
    /// Every other key the catalog writes on the row.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Entry {
    pub fn new(result: impl Into<Value>, chance: f64) -> Self {
        Self {
            result: result.into(),
            chance,
            extra_rolls: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_extra_rolls(mut self, rolls: &[&str]) -> Self {
        self.extra_rolls = rolls.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Build an entry from one free-form catalog row.
    ///
    /// `result`, `chance` and `extra_rolls` are the row's own fields; any
    /// other key is kept as an attribute.
    fn from_ron_row(table: &str, row: ron::Value) -> Result<Entry, CatalogError> {
        let invalid = |reason: String| CatalogError::InvalidEntry {
            table: table.to_string(),
            reason,
        };

        let ron::Value::Map(fields) = row else {
            return Err(invalid("entry is not a record".to_string()));
        };

        let mut result = None;
        let mut chance = None;
        let mut extra_rolls = Vec::new();
        let mut attributes = BTreeMap::new();

        for (key, value) in fields {
            let ron::Value::String(key) = key else {
                return Err(invalid(format!("entry key {:?} is not a name", key)));
            };
            let bad_field = |e: ron::Error| invalid(format!("field '{}': {}", key, e));
            match key.as_str() {
                "result" => result = Some(value.into_rust::<Value>().map_err(bad_field)?),
                "chance" => chance = Some(value.into_rust::<f64>().map_err(bad_field)?),
                "extra_rolls" => {
                    extra_rolls = value.into_rust::<Vec<String>>().map_err(bad_field)?
                }
                reserved if RESERVED_KEYS.contains(&reserved) => {
                    return Err(invalid(format!("'{}' is reserved", reserved)));
                }
                _ => {
                    let value = value.into_rust::<Value>().map_err(bad_field)?;
                    attributes.insert(key, value);
                }
            }
        }

        let result = result.ok_or_else(|| invalid("entry has no result".to_string()))?;
        let chance = chance
            .ok_or_else(|| invalid(format!("entry '{}' has no chance", result)))?;
        if chance.is_nan() || chance <= 0.0 {
            return Err(invalid(format!(
                "entry '{}' has non-positive chance {}",
                result, chance
            )));
        }

        Ok(Entry {
            result,
            chance,
            extra_rolls,
            attributes,
        })
    }
}

/// A parsed follow-up directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Generate a new character related to the current one.
    LinkedCharacter { label: String },
    /// Roll once on the named table and attach the result.
    SubTable(String),
}

impl FollowUp {
    /// Parse a directive using the given linked-character token.
    ///
    /// `"<token>"` → linked character with `default_label`;
    /// `"<token> Mother"` → linked character labelled `"Mother"`;
    /// anything else → sub-table name.
    pub fn parse(directive: &str, token: &str, default_label: &str) -> FollowUp {
        match directive.strip_prefix(token) {
            Some(suffix) => {
                let label = suffix.trim();
                FollowUp::LinkedCharacter {
                    label: if label.is_empty() {
                        default_label.to_string()
                    } else {
                        label.to_string()
                    },
                }
            }
            None => FollowUp::SubTable(directive.to_string()),
        }
    }
}

/// Read-only store of named weighted tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableCatalog {
    pub tables: FxHashMap<String, Vec<Entry>>,
}

impl TableCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entries: Vec<Entry>) {
        self.tables.insert(name.into(), entries);
    }

    pub fn get(&self, name: &str) -> Option<&[Entry]> {
        self.tables.get(name).map(|v| v.as_slice())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Load a table catalog from a RON file: a map of table name to entries.
    pub fn load_from_ron(path: &Path) -> Result<TableCatalog, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a table catalog from a RON string.
    ///
    /// Rows are records of arbitrary keys, so they are read as raw RON
    /// values and split into entries afterwards.
    pub fn parse_ron(input: &str) -> Result<TableCatalog, CatalogError> {
        let raw: FxHashMap<String, Vec<ron::Value>> = ron::from_str(input)?;
        let mut tables = FxHashMap::default();

        for (name, rows) in raw {
            let entries = rows
                .into_iter()
                .map(|row| Entry::from_ron_row(&name, row))
                .collect::<Result<Vec<_>, _>>()?;
            tables.insert(name, entries);
        }

        Ok(TableCatalog { tables })
    }

    /// Merge another catalog into this one. Tables from `other`
    /// replace tables in `self` with the same name.
    pub fn merge(&mut self, other: TableCatalog) {
        for (name, entries) in other.tables {
            self.tables.insert(name, entries);
        }
    }
}
