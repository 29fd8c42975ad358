/// The top-level generator: catalogs + config + seeded randomness → characters.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::core::config::GeneratorConfig;
use crate::core::dice::{DiceEvaluator, StandardDice};
use crate::core::resolver::CharacterResolver;
use crate::core::roller::{sample_index, RollError, TableRoller};
use crate::schema::factors::{CharacterFactors, Property};
use crate::schema::location::LocationCatalog;
use crate::schema::table::{CatalogError, TableCatalog};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("roll error: {0}")]
    Roll(#[from] RollError),
}

/// Generates characters from a fixed set of catalogs. Built via
/// `BackstoryGenerator::builder()`.
pub struct BackstoryGenerator {
    tables: TableCatalog,
    locations: LocationCatalog,
    config: GeneratorConfig,
    dice: Box<dyn DiceEvaluator>,
    seed: u64,
    generation_count: u64,
}

/// Builder for constructing a `BackstoryGenerator`.
pub struct BackstoryGeneratorBuilder {
    tables_path: Option<String>,
    locations_path: Option<String>,
    config_path: Option<String>,
    seed: u64,
    depth: Option<i32>,
    /// Directly provided tables (for testing without files).
    tables: Option<TableCatalog>,
    /// Directly provided locations (for testing without files).
    locations: Option<LocationCatalog>,
    /// Directly provided config (for testing without files).
    config: Option<GeneratorConfig>,
    dice: Option<Box<dyn DiceEvaluator>>,
}

impl BackstoryGenerator {
    pub fn builder() -> BackstoryGeneratorBuilder {
        BackstoryGeneratorBuilder {
            tables_path: None,
            locations_path: None,
            config_path: None,
            seed: 0,
            depth: None,
            tables: None,
            locations: None,
            config: None,
            dice: None,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate one character. Its location is drawn from
    /// `initial_locations` when configured, otherwise rolled.
    pub fn generate(&mut self) -> Result<CharacterFactors, GeneratorError> {
        let (generation, mut rng) = self.next_rng();
        let seed = if self.config.initial_locations.is_empty() {
            CharacterFactors::new()
        } else {
            let names: Vec<&String> = self.config.initial_locations.keys().collect();
            let weights: Vec<f64> = self.config.initial_locations.values().copied().collect();
            let index = sample_index("initial locations", &weights, &mut rng)?;
            CharacterFactors::with_location(names[index].as_str())
        };
        self.resolve_with(generation, seed, rng)
    }

    /// Generate one character with some properties fixed in advance.
    pub fn generate_from(
        &mut self,
        seed: CharacterFactors,
    ) -> Result<CharacterFactors, GeneratorError> {
        let (generation, rng) = self.next_rng();
        self.resolve_with(generation, seed, rng)
    }

    /// Generate `count` independent characters in sequence.
    pub fn generate_batch(
        &mut self,
        count: usize,
    ) -> Result<Vec<CharacterFactors>, GeneratorError> {
        (0..count).map(|_| self.generate()).collect()
    }

    /// Index of the next character and its own RNG.
    fn next_rng(&mut self) -> (u64, StdRng) {
        let generation = self.generation_count;
        let rng = StdRng::seed_from_u64(self.seed.wrapping_add(generation));
        self.generation_count += 1;
        (generation, rng)
    }

    fn resolve_with(
        &self,
        generation: u64,
        seed: CharacterFactors,
        mut rng: StdRng,
    ) -> Result<CharacterFactors, GeneratorError> {
        let roller = TableRoller::new(
            &self.tables,
            &self.locations,
            &self.config,
            self.dice.as_ref(),
        );
        let factors = CharacterResolver::new(roller, self.config.depth, seed).resolve(&mut rng)?;
        info!(
            generation,
            location = %factors
                .result(Property::Location)
                .map(|v| v.as_key())
                .unwrap_or_default(),
            "generated character"
        );
        Ok(factors)
    }
}

impl BackstoryGeneratorBuilder {
    pub fn tables_path(mut self, path: &str) -> Self {
        self.tables_path = Some(path.to_string());
        self
    }

    pub fn locations_path(mut self, path: &str) -> Self {
        self.locations_path = Some(path.to_string());
        self
    }

    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Override the configured depth budget.
    pub fn depth(mut self, depth: i32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Provide tables directly (for testing without files).
    pub fn with_tables(mut self, tables: TableCatalog) -> Self {
        self.tables = Some(tables);
        self
    }

    /// Provide locations directly (for testing without files).
    pub fn with_locations(mut self, locations: LocationCatalog) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Provide config directly (for testing without files).
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the built-in dice evaluator.
    pub fn with_dice(mut self, dice: Box<dyn DiceEvaluator>) -> Self {
        self.dice = Some(dice);
        self
    }

    pub fn build(self) -> Result<BackstoryGenerator, GeneratorError> {
        let mut tables = self.tables.unwrap_or_default();
        let mut locations = self.locations.unwrap_or_default();

        // Files override directly provided data with the same names.
        if let Some(ref path) = self.tables_path {
            tables.merge(TableCatalog::load_from_ron(Path::new(path))?);
        }
        if let Some(ref path) = self.locations_path {
            locations.merge(LocationCatalog::load_from_ron(Path::new(path))?);
        }

        let mut config = match self.config_path {
            Some(ref path) => GeneratorConfig::load_from_ron(Path::new(path))?,
            None => self.config.unwrap_or_default(),
        };
        if let Some(depth) = self.depth {
            config.depth = depth;
        }

        Ok(BackstoryGenerator {
            tables,
            locations,
            config,
            dice: self.dice.unwrap_or_else(|| Box::new(StandardDice)),
            seed: self.seed,
            generation_count: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn builder_defaults() {
        let generator = BackstoryGenerator::builder().seed(12345).build().unwrap();
        assert_eq!(generator.seed, 12345);
        assert_eq!(generator.config().depth, 4);
    }

    #[test]
    fn generations_are_numbered_from_zero() {
        let mut generator = BackstoryGenerator::builder().seed(10).build().unwrap();
        let (first, mut first_rng) = generator.next_rng();
        let (second, _) = generator.next_rng();
        assert_eq!((first, second), (0, 1));
        assert_eq!(generator.generation_count, 2);

        let mut expected = StdRng::seed_from_u64(10);
        assert_eq!(first_rng.gen::<u64>(), expected.gen::<u64>());
    }

    #[test]
    fn builder_depth_overrides_config() {
        let generator = BackstoryGenerator::builder()
            .with_config(GeneratorConfig {
                depth: 9,
                ..GeneratorConfig::default()
            })
            .depth(1)
            .build()
            .unwrap();
        assert_eq!(generator.config().depth, 1);
    }

    #[test]
    fn missing_tables_file_is_an_error() {
        let result = BackstoryGenerator::builder()
            .tables_path("tests/fixtures/does_not_exist.ron")
            .build();
        assert!(matches!(
            result,
            Err(GeneratorError::Catalog(CatalogError::Io(_)))
        ));
    }

    #[test]
    fn empty_catalog_fails_on_first_roll() {
        let mut generator = BackstoryGenerator::builder().build().unwrap();
        let err = generator.generate().unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::Roll(RollError::UnknownTable(ref t)) if t == "Region"
        ));
    }
}
