/// Character resolver — walks the fixed property checklist for one character.

use rand::rngs::StdRng;
use tracing::debug;

use crate::core::roller::{RollError, RollOptions, TableRoller};
use crate::core::weights::{WealthDirection, WeightTransform};
use crate::schema::factors::{CharacterFactors, Property, Resolved, ResolvedEntry, Tendencies};
use crate::schema::location::LocationModifier;
use crate::schema::value::Value;

/// Builds one character, property by property, feeding earlier results
/// into later weights. Seeded properties are never re-rolled.
pub struct CharacterResolver<'a> {
    roller: TableRoller<'a>,
    depth: i32,
    factors: CharacterFactors,
    tendencies: Tendencies,
}

impl<'a> CharacterResolver<'a> {
    pub fn new(roller: TableRoller<'a>, depth: i32, seed: CharacterFactors) -> Self {
        Self {
            roller,
            depth,
            factors: seed,
            tendencies: Tendencies::new(),
        }
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Resolve every missing property and return the finished factors.
    pub fn resolve(mut self, rng: &mut StdRng) -> Result<CharacterFactors, RollError> {
        debug!(depth = self.depth, seeded = self.factors.len(), "resolving character");

        // The location is kept as a bare value, not an entry.
        if !self.factors.contains(Property::Location) {
            let table = self.fixed_table(Property::Location);
            let entry = self.roll(Property::Location, table, None, rng)?;
            self.factors
                .insert(Property::Location, Resolved::Scalar(entry.result));
        }
        let location = self.location_modifier()?;
        self.tendencies.merge_location(location);

        self.roll_if_absent(Property::Class, None, rng)?;
        self.roll_if_absent(Property::ClassReason, None, rng)?;
        self.roll_if_absent(Property::Past, None, rng)?;
        self.roll_if_absent(Property::PastReason, None, rng)?;
        self.roll_if_absent(Property::Parents, None, rng)?;
        self.roll_if_absent(Property::Birthplace, None, rng)?;
        self.roll_if_absent(Property::Tutors, None, rng)?;
        self.roll_if_absent(Property::Youth, None, rng)?;

        self.roll_if_absent(
            Property::Lifestyle,
            Some(WeightTransform::LocationWealth(location.wealth)),
            rng,
        )?;
        let wealth = self.household_wealth()?;

        self.roll_if_absent(
            Property::Siblings,
            Some(WeightTransform::HouseholdWealth {
                wealth,
                direction: WealthDirection::Positive,
            }),
            rng,
        )?;
        self.count_siblings(rng)?;

        self.roll_if_absent(Property::BirthOrder, None, rng)?;
        self.roll_if_absent(
            Property::GrowLocation,
            Some(WeightTransform::HouseholdWealth {
                wealth,
                direction: WealthDirection::Negative,
            }),
            rng,
        )?;

        Ok(self.factors)
    }

    fn roll_if_absent(
        &mut self,
        property: Property,
        transform: Option<WeightTransform>,
        rng: &mut StdRng,
    ) -> Result<(), RollError> {
        if self.factors.contains(property) {
            debug!(%property, "seeded, not rolling");
            return Ok(());
        }
        let table = self.table_for(property)?;
        let entry = self.roll(property, &table, transform, rng)?;
        self.factors.insert(property, Resolved::Entry(entry));
        Ok(())
    }

    fn roll(
        &self,
        property: Property,
        table: &str,
        transform: Option<WeightTransform>,
        rng: &mut StdRng,
    ) -> Result<ResolvedEntry, RollError> {
        let options = RollOptions::at_depth(self.depth - 1)
            .multipliers(self.tendencies.for_property(property))
            .transform(transform)
            .character(&self.factors);
        self.roller.resolve(table, options, rng)
    }

    /// Reason tables are named by the result they explain.
    fn table_for(&self, property: Property) -> Result<String, RollError> {
        let source = match property {
            Property::ClassReason => Property::Class,
            Property::PastReason => Property::Past,
            other => return Ok(self.fixed_table(other).to_string()),
        };
        self.factors
            .result(source)
            .map(Value::as_key)
            .ok_or(RollError::MissingFactor(source))
    }

    fn fixed_table(&self, property: Property) -> &'a str {
        self.roller
            .config
            .tables
            .for_property(property)
            .unwrap_or_default()
    }

    fn location_modifier(&self) -> Result<&'a LocationModifier, RollError> {
        let location = self
            .factors
            .result(Property::Location)
            .ok_or(RollError::MissingFactor(Property::Location))?
            .as_key();
        self.roller
            .locations
            .get(&location)
            .ok_or(RollError::UnknownLocation(location))
    }

    fn household_wealth(&self) -> Result<f64, RollError> {
        let lifestyle = self
            .factors
            .result(Property::Lifestyle)
            .ok_or(RollError::MissingFactor(Property::Lifestyle))?
            .as_key();
        self.roller
            .config
            .wealth_tiers
            .get(&lifestyle)
            .ok_or(RollError::UnknownLifestyle(lifestyle))
    }

    /// Replace the rolled sibling expression with its evaluated count.
    fn count_siblings(&mut self, rng: &mut StdRng) -> Result<(), RollError> {
        let expression = match self.factors.get(Property::Siblings) {
            Some(Resolved::Scalar(Value::Int(_))) => return Ok(()),
            Some(resolved) => resolved
                .result()
                .map(Value::as_key)
                .ok_or(RollError::MissingFactor(Property::Siblings))?,
            None => return Err(RollError::MissingFactor(Property::Siblings)),
        };
        let count = self.roller.dice.evaluate(&expression, rng)?;
        debug!(%expression, count, "counted siblings");
        self.factors
            .insert(Property::Siblings, Resolved::Scalar(Value::Int(count)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GeneratorConfig;
    use crate::core::dice::StandardDice;
    use crate::schema::location::LocationCatalog;
    use crate::schema::table::{Entry, TableCatalog};
    use rand::SeedableRng;

    #[test]
    fn missing_reason_table_is_reported_by_name() {
        let mut tables = TableCatalog::new();
        tables.insert("Classes", vec![Entry::new("Chemist", 1.0)]);
        let mut locations = LocationCatalog::new();
        locations.insert("Zaun", LocationModifier::new(0.8));
        let config = GeneratorConfig::default();
        let roller = TableRoller::new(&tables, &locations, &config, &StandardDice);
        let mut rng = StdRng::seed_from_u64(1);

        let resolver = CharacterResolver::new(roller, 2, CharacterFactors::with_location("Zaun"));
        assert_eq!(resolver.depth(), 2);
        let err = resolver.resolve(&mut rng).unwrap_err();
        assert!(matches!(err, RollError::UnknownTable(ref t) if t == "Chemist"));
    }

    #[test]
    fn unknown_seeded_location_is_fatal() {
        let tables = TableCatalog::new();
        let locations = LocationCatalog::new();
        let config = GeneratorConfig::default();
        let roller = TableRoller::new(&tables, &locations, &config, &StandardDice);
        let mut rng = StdRng::seed_from_u64(1);

        let err = CharacterResolver::new(roller, 4, CharacterFactors::with_location("Noxus"))
            .resolve(&mut rng)
            .unwrap_err();
        assert!(matches!(err, RollError::UnknownLocation(ref l) if l == "Noxus"));
    }
}
