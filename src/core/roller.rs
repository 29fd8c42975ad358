/// Table roller — one weighted draw plus recursive follow-up resolution.
///
/// A chosen entry's follow-ups are either plain sub-table rolls, which
/// consume one unit of depth, or linked characters, which start a fresh
/// resolver at the current depth.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use thiserror::Error;
use tracing::debug;

use crate::core::config::GeneratorConfig;
use crate::core::dice::{DiceError, DiceEvaluator};
use crate::core::resolver::CharacterResolver;
use crate::core::weights::{adjusted_weights, WeightTransform};
use crate::schema::factors::{CharacterFactors, Extra, Property, Resolved, ResolvedEntry};
use crate::schema::location::{LocationCatalog, Multipliers};
use crate::schema::table::{FollowUp, TableCatalog};
use crate::schema::value::Value;

#[derive(Debug, Error)]
pub enum RollError {
    #[error("unknown table: {0}")]
    UnknownTable(String),
    #[error("unknown location: {0}")]
    UnknownLocation(String),
    #[error("lifestyle '{0}' has no wealth tier")]
    UnknownLifestyle(String),
    #[error("multiplier key '{key}' matches no entry in table '{table}'")]
    UnknownMultiplierKey { table: String, key: String },
    #[error("table '{0}' has no entries")]
    EmptyTable(String),
    #[error("weights for '{0}' sum to zero")]
    ZeroWeight(String),
    #[error("invalid weights for '{table}': {reason}")]
    InvalidWeights { table: String, reason: String },
    #[error("factor '{0}' is required but has not been resolved")]
    MissingFactor(Property),
    #[error("dice error: {0}")]
    Dice(#[from] DiceError),
}

/// Per-roll inputs beyond the table name.
#[derive(Debug, Default)]
pub struct RollOptions<'o> {
    pub multipliers: Option<&'o Multipliers>,
    pub transform: Option<WeightTransform>,
    /// Remaining depth budget for this roll's follow-ups.
    pub depth: i32,
    /// Character whose location places any linked characters.
    pub character: Option<&'o CharacterFactors>,
    /// Factors shared by the linked characters this roll spawns.
    pub linked_seed: Option<CharacterFactors>,
}

impl<'o> RollOptions<'o> {
    pub fn at_depth(depth: i32) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    pub fn multipliers(mut self, multipliers: Option<&'o Multipliers>) -> Self {
        self.multipliers = multipliers;
        self
    }

    pub fn transform(mut self, transform: Option<WeightTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn character(mut self, character: &'o CharacterFactors) -> Self {
        self.character = Some(character);
        self
    }

    pub fn linked_seed(mut self, seed: CharacterFactors) -> Self {
        self.linked_seed = Some(seed);
        self
    }
}

/// Read-only view over everything a roll may consult.
#[derive(Clone, Copy)]
pub struct TableRoller<'a> {
    pub tables: &'a TableCatalog,
    pub locations: &'a LocationCatalog,
    pub config: &'a GeneratorConfig,
    pub dice: &'a dyn DiceEvaluator,
}

impl<'a> TableRoller<'a> {
    pub fn new(
        tables: &'a TableCatalog,
        locations: &'a LocationCatalog,
        config: &'a GeneratorConfig,
        dice: &'a dyn DiceEvaluator,
    ) -> Self {
        Self {
            tables,
            locations,
            config,
            dice,
        }
    }

    /// Roll once on `table` and resolve the chosen entry's follow-ups.
    pub fn resolve(
        &self,
        table: &str,
        options: RollOptions<'_>,
        rng: &mut StdRng,
    ) -> Result<ResolvedEntry, RollError> {
        let entries = self
            .tables
            .get(table)
            .ok_or_else(|| RollError::UnknownTable(table.to_string()))?;
        if entries.is_empty() {
            return Err(RollError::EmptyTable(table.to_string()));
        }

        let weights = adjusted_weights(
            table,
            entries,
            options.multipliers,
            options.transform.as_ref(),
        )?;
        let index = sample_index(table, &weights, rng)?;
        let chosen = &entries[index];
        debug!(table, index, depth = options.depth, result = %chosen.result, "rolled entry");

        let mut resolved = ResolvedEntry {
            result: chosen.result.clone(),
            attributes: chosen.attributes.clone(),
            extras: None,
        };

        if !chosen.extra_rolls.is_empty() {
            let extras = self.resolve_follow_ups(&chosen.extra_rolls, options, rng)?;
            if !extras.is_empty() {
                resolved.extras = Some(extras);
            }
        }

        Ok(resolved)
    }

    fn resolve_follow_ups(
        &self,
        directives: &[String],
        options: RollOptions<'_>,
        rng: &mut StdRng,
    ) -> Result<Vec<Extra>, RollError> {
        let RollOptions {
            depth,
            character,
            linked_seed,
            ..
        } = options;
        let mut linked_seed = linked_seed.unwrap_or_default();
        let mut extras = Vec::with_capacity(directives.len());

        for directive in directives {
            let follow_up = FollowUp::parse(
                directive,
                &self.config.linked_character_token,
                &self.config.default_linked_label,
            );
            match follow_up {
                FollowUp::LinkedCharacter { label } => {
                    if depth <= 0 {
                        debug!(%label, "depth exhausted, skipping linked character");
                        continue;
                    }
                    // Only the first linked character of a batch picks a location.
                    if linked_seed.contains(Property::Location) {
                        debug!(%label, "location already seeded, skipping linked character");
                        continue;
                    }
                    let origin = self.pick_origin(character, rng)?;
                    linked_seed.insert(Property::Location, Resolved::Scalar(Value::Text(origin)));
                    let linked =
                        CharacterResolver::new(*self, depth, linked_seed.clone()).resolve(rng)?;
                    extras.push(Extra {
                        label,
                        value: Resolved::Character(Box::new(linked)),
                    });
                }
                FollowUp::SubTable(name) => {
                    if depth <= 0 {
                        debug!(table = %name, "depth exhausted, skipping sub-roll");
                        continue;
                    }
                    let mut sub_options = RollOptions::at_depth(depth - 1);
                    sub_options.character = character;
                    let entry = self.resolve(&name, sub_options, rng)?;
                    extras.push(Extra {
                        label: name,
                        value: Resolved::Entry(entry),
                    });
                }
            }
        }

        Ok(extras)
    }

    /// Sample a home location for a linked character from the current
    /// character's `origin_weights`.
    fn pick_origin(
        &self,
        character: Option<&CharacterFactors>,
        rng: &mut StdRng,
    ) -> Result<String, RollError> {
        let location = character
            .and_then(|c| c.result(Property::Location))
            .ok_or(RollError::MissingFactor(Property::Location))?
            .as_key();
        let modifier = self
            .locations
            .get(&location)
            .ok_or_else(|| RollError::UnknownLocation(location.clone()))?;

        let names: Vec<&String> = modifier.origin_weights.keys().collect();
        let weights: Vec<f64> = modifier.origin_weights.values().copied().collect();
        let index = sample_index(&format!("origin weights of {}", location), &weights, rng)?;
        Ok(names[index].clone())
    }
}

/// Draw one index with probability proportional to its weight.
pub fn sample_index(label: &str, weights: &[f64], rng: &mut StdRng) -> Result<usize, RollError> {
    let total: f64 = weights.iter().sum();
    if total.is_nan() || total <= 0.0 {
        return Err(RollError::ZeroWeight(label.to_string()));
    }
    let dist = WeightedIndex::new(weights).map_err(|e| RollError::InvalidWeights {
        table: label.to_string(),
        reason: e.to_string(),
    })?;
    Ok(dist.sample(rng))
}
