/// Dice expressions such as `2d4+1`, `d6`, `1d3-1` and `0`.

use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;

/// Upper bound on dice rolled for a single term.
const MAX_DICE: u32 = 1000;

#[derive(Debug, Error)]
pub enum DiceError {
    #[error("invalid dice expression '{expression}': {reason}")]
    Parse { expression: String, reason: String },
    #[error("dice expression '{expression}' overflows")]
    Overflow { expression: String },
}

/// Turns a textual dice expression into an integer.
pub trait DiceEvaluator {
    fn evaluate(&self, expression: &str, rng: &mut StdRng) -> Result<i64, DiceError>;
}

/// One additive term of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Term {
    Dice { count: u32, sides: u32 },
    Constant(i64),
}

/// Sums of `NdM` rolls and integer constants joined by `+` or `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDice;

impl StandardDice {
    fn parse(expression: &str) -> Result<Vec<(i64, Term)>, DiceError> {
        let parse_err = |reason: &str| DiceError::Parse {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let compact: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(parse_err("empty expression"));
        }

        let mut terms = Vec::new();
        let mut sign = 1i64;
        let mut current = String::new();

        // Trailing '+' flushes the last term.
        for c in compact.chars().chain(std::iter::once('+')) {
            if c == '+' || c == '-' {
                if current.is_empty() {
                    if terms.is_empty() && c == '-' && sign == 1 {
                        sign = -1;
                        continue;
                    }
                    return Err(parse_err("missing term"));
                }
                let term = Self::parse_term(&current).map_err(|r| parse_err(r.as_str()))?;
                terms.push((sign, term));
                current.clear();
                sign = if c == '-' { -1 } else { 1 };
            } else {
                current.push(c);
            }
        }

        Ok(terms)
    }

    fn parse_term(term: &str) -> Result<Term, String> {
        match term.split_once(['d', 'D']) {
            Some((count, sides)) => {
                let count = if count.is_empty() {
                    1
                } else {
                    count
                        .parse::<u32>()
                        .map_err(|_| format!("bad dice count '{}'", count))?
                };
                let sides = sides
                    .parse::<u32>()
                    .map_err(|_| format!("bad die size '{}'", sides))?;
                if sides == 0 {
                    return Err("dice must have at least one side".to_string());
                }
                if count > MAX_DICE {
                    return Err(format!("more than {} dice in one term", MAX_DICE));
                }
                Ok(Term::Dice { count, sides })
            }
            None => term
                .parse::<i64>()
                .map(Term::Constant)
                .map_err(|_| format!("bad constant '{}'", term)),
        }
    }
}

impl DiceEvaluator for StandardDice {
    fn evaluate(&self, expression: &str, rng: &mut StdRng) -> Result<i64, DiceError> {
        let overflow = || DiceError::Overflow {
            expression: expression.to_string(),
        };

        let mut total = 0i64;
        for (sign, term) in Self::parse(expression)? {
            let value = match term {
                Term::Constant(n) => n,
                Term::Dice { count, sides } => (0..count)
                    .map(|_| rng.gen_range(1..=sides as i64))
                    .sum(),
            };
            total = value
                .checked_mul(sign)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(overflow)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn constant_expression() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(StandardDice.evaluate("0", &mut rng).unwrap(), 0);
        assert_eq!(StandardDice.evaluate(" 3 ", &mut rng).unwrap(), 3);
    }

    #[test]
    fn dice_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let n = StandardDice.evaluate("2d4+1", &mut rng).unwrap();
            assert!((3..=9).contains(&n), "out of range: {}", n);
            let m = StandardDice.evaluate("d3-1", &mut rng).unwrap();
            assert!((0..=2).contains(&m), "out of range: {}", m);
        }
    }

    #[test]
    fn leading_minus_negates_first_term() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(StandardDice.evaluate("-2+5", &mut rng).unwrap(), 3);
    }

    #[test]
    fn deterministic_for_same_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        let x: Vec<i64> = (0..10)
            .map(|_| StandardDice.evaluate("3d6", &mut a).unwrap())
            .collect();
        let y: Vec<i64> = (0..10)
            .map(|_| StandardDice.evaluate("3d6", &mut b).unwrap())
            .collect();
        assert_eq!(x, y);
    }

    #[test]
    fn malformed_expressions_are_errors() {
        let mut rng = StdRng::seed_from_u64(1);
        for bad in ["", "2d", "xd6", "1d0", "1++2", "3-", "2d4d6"] {
            assert!(
                matches!(StandardDice.evaluate(bad, &mut rng), Err(DiceError::Parse { .. })),
                "expected parse error for '{}'",
                bad
            );
        }
    }
}
