use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamic value stored as a table entry's `result`.
///
/// Untagged so catalogs can write `result: "Zaun"` or `result: 3`
/// directly instead of wrapping every value in a variant name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Text form used to match tendency keys and to name follow-up tables.
    pub fn as_key(&self) -> String {
        self.to_string()
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_of_text_is_the_text() {
        assert_eq!(Value::from("Zaun").as_key(), "Zaun");
        assert_eq!(Value::Int(3).as_key(), "3");
    }

    #[test]
    fn untagged_ron_values() {
        let v: Vec<Value> = ron::from_str(r#"["Piltover", 2, 1.5, true, ["a", 1]]"#).unwrap();
        assert_eq!(v[0], Value::Text("Piltover".to_string()));
        assert_eq!(v[1], Value::Int(2));
        assert_eq!(v[2], Value::Float(1.5));
        assert_eq!(v[3], Value::Bool(true));
        assert!(matches!(&v[4], Value::List(items) if items.len() == 2));
    }
}
