/// Weight calculation: base chances, tendency multipliers and wealth transforms.

use crate::core::roller::RollError;
use crate::schema::location::Multipliers;
use crate::schema::table::Entry;

/// Which way a household-wealth transform pushes later entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WealthDirection {
    /// `w[i] *= wealth^-(1 + 0.2 i)`
    Positive,
    /// `w[i] *= wealth^(1 + 0.2 i)`
    Negative,
}

/// A continuous transform over a whole weight vector, indexed by position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightTransform {
    /// `w[i] *= location_wealth^(-i)`: poorer places favour earlier rows.
    LocationWealth(f64),
    /// Household wealth scaling for counts that move with lifestyle.
    HouseholdWealth {
        wealth: f64,
        direction: WealthDirection,
    },
}

impl WeightTransform {
    pub fn apply(&self, weights: &[f64]) -> Vec<f64> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| w * self.factor(i))
            .collect()
    }

    fn factor(&self, index: usize) -> f64 {
        let i = index as f64;
        match *self {
            Self::LocationWealth(wealth) => wealth.powf(-i),
            Self::HouseholdWealth { wealth, direction } => {
                let exponent = 1.0 + 0.2 * i;
                match direction {
                    WealthDirection::Positive => wealth.powf(-exponent),
                    WealthDirection::Negative => wealth.powf(exponent),
                }
            }
        }
    }
}

/// Compute final sampling weights for `entries`, position-aligned.
///
/// Each multiplier key must name the `result` of some entry; the first
/// matching entry is scaled. The transform, if any, runs last over the
/// whole vector.
pub fn adjusted_weights(
    table: &str,
    entries: &[Entry],
    multipliers: Option<&Multipliers>,
    transform: Option<&WeightTransform>,
) -> Result<Vec<f64>, RollError> {
    let mut weights: Vec<f64> = entries.iter().map(|e| e.chance).collect();

    if let Some(multipliers) = multipliers {
        for (key, factor) in multipliers {
            let index = entries
                .iter()
                .position(|e| e.result.as_key() == *key)
                .ok_or_else(|| RollError::UnknownMultiplierKey {
                    table: table.to_string(),
                    key: key.clone(),
                })?;
            weights[index] *= factor;
        }
    }

    if let Some(transform) = transform {
        weights = transform.apply(&weights);
    }

    Ok(weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(chances: &[f64]) -> Vec<Entry> {
        chances
            .iter()
            .enumerate()
            .map(|(i, c)| Entry::new(format!("row{}", i), *c))
            .collect()
    }

    #[test]
    fn base_weights_pass_through() {
        let table = entries(&[7.0, 3.0]);
        let w = adjusted_weights("Region", &table, None, None).unwrap();
        assert_eq!(w, vec![7.0, 3.0]);
    }

    #[test]
    fn multiplier_scales_matching_entry_only() {
        let table = entries(&[1.0, 1.0, 1.0]);
        let m = Multipliers::from([("row1".to_string(), 3.0)]);
        let w = adjusted_weights("T", &table, Some(&m), None).unwrap();
        assert_eq!(w, vec![1.0, 3.0, 1.0]);
    }

    #[test]
    fn unknown_multiplier_key_is_an_error() {
        let table = entries(&[1.0, 1.0]);
        let m = Multipliers::from([("missing".to_string(), 2.0)]);
        let err = adjusted_weights("T", &table, Some(&m), None).unwrap_err();
        assert!(matches!(
            err,
            RollError::UnknownMultiplierKey { ref table, ref key } if table == "T" && key == "missing"
        ));
    }

    #[test]
    fn length_and_order_preserved_with_all_adjustments() {
        let table = entries(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let m = Multipliers::from([("row0".to_string(), 0.5), ("row4".to_string(), 10.0)]);
        let t = WeightTransform::LocationWealth(1.3);
        let w = adjusted_weights("T", &table, Some(&m), Some(&t)).unwrap();
        assert_eq!(w.len(), table.len());
        assert!(w.iter().all(|x| *x > 0.0));
        assert!((w[0] - 2.5).abs() < 1e-9);
        assert!((w[4] - 10.0 * 1.3f64.powi(-4)).abs() < 1e-9);
    }

    #[test]
    fn location_wealth_below_one_favours_later_rows() {
        let t = WeightTransform::LocationWealth(0.5);
        let w = t.apply(&[1.0, 1.0, 1.0]);
        assert_eq!(w, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn positive_direction_ratio_falls_as_wealth_rises() {
        let ratio = |wealth: f64| {
            let t = WeightTransform::HouseholdWealth {
                wealth,
                direction: WealthDirection::Positive,
            };
            let w = t.apply(&[1.0, 1.0, 1.0]);
            (w[1] / w[0], w[2] / w[0])
        };
        let (poor1, poor2) = ratio(0.6);
        let (rich1, rich2) = ratio(2.0);
        assert!(rich1 < poor1);
        assert!(rich2 < poor2);
    }

    #[test]
    fn negative_direction_ratio_rises_with_wealth() {
        let ratio = |wealth: f64| {
            let t = WeightTransform::HouseholdWealth {
                wealth,
                direction: WealthDirection::Negative,
            };
            let w = t.apply(&[1.0, 1.0, 1.0]);
            w[2] / w[0]
        };
        assert!(ratio(2.0) > ratio(1.2));
        assert!(ratio(1.2) > ratio(0.8));
    }

    #[test]
    fn rich_household_orders_equal_rows_descending() {
        let t = WeightTransform::HouseholdWealth {
            wealth: 1.6,
            direction: WealthDirection::Positive,
        };
        let w = t.apply(&[1.0, 1.0, 1.0]);
        assert!(w[0] > w[1]);
        assert!(w[1] > w[2]);
    }
}
