/// JSON export of finished characters.

use serde_json::Value as Json;

use crate::schema::factors::CharacterFactors;

/// Serialize a character, collapsing every `{"result": x}` object into `x`.
///
/// Entries that carry attributes or extras keep their full shape.
pub fn to_json(factors: &CharacterFactors) -> Result<Json, serde_json::Error> {
    let mut json = serde_json::to_value(factors)?;
    collapse_bare_results(&mut json);
    Ok(json)
}

/// Pretty-printed form of [`to_json`].
pub fn to_json_pretty(factors: &CharacterFactors) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&to_json(factors)?)
}

fn collapse_bare_results(json: &mut Json) {
    let bare = matches!(json, Json::Object(map) if map.len() == 1 && map.contains_key("result"));
    if bare {
        let result = json["result"].take();
        *json = result;
        collapse_bare_results(json);
        return;
    }

    match json {
        Json::Object(map) => {
            for value in map.values_mut() {
                collapse_bare_results(value);
            }
        }
        Json::Array(items) => {
            for item in items {
                collapse_bare_results(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::factors::{Extra, Property, Resolved, ResolvedEntry};
    use crate::schema::value::Value;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn bare(result: &str) -> ResolvedEntry {
        ResolvedEntry {
            result: Value::from(result),
            attributes: BTreeMap::new(),
            extras: None,
        }
    }

    #[test]
    fn bare_entries_collapse_to_their_result() {
        let mut factors = CharacterFactors::with_location("Zaun");
        factors.insert(Property::Class, Resolved::Entry(bare("Chemist")));
        factors.insert(Property::Siblings, Resolved::Scalar(Value::Int(2)));

        let json = to_json(&factors).unwrap();
        assert_eq!(
            json,
            json!({"location": "Zaun", "class": "Chemist", "siblings": 2})
        );
    }

    #[test]
    fn extras_and_linked_characters_are_filtered_recursively() {
        let mut mother = CharacterFactors::with_location("Piltover");
        mother.insert(Property::Youth, Resolved::Entry(bare("Quiet")));

        let parents = ResolvedEntry {
            result: Value::from("Both alive"),
            attributes: BTreeMap::new(),
            extras: Some(vec![
                Extra {
                    label: "Mother".to_string(),
                    value: Resolved::Character(Box::new(mother)),
                },
                Extra {
                    label: "Occupation".to_string(),
                    value: Resolved::Entry(bare("Miner")),
                },
            ]),
        };
        let mut factors = CharacterFactors::with_location("Zaun");
        factors.insert(Property::Parents, Resolved::Entry(parents));

        let json = to_json(&factors).unwrap();
        assert_eq!(
            json["parents"],
            json!({
                "result": "Both alive",
                "extras": [
                    {"label": "Mother", "value": {"location": "Piltover", "youth": "Quiet"}},
                    {"label": "Occupation", "value": "Miner"},
                ]
            })
        );
    }

    #[test]
    fn pretty_output_is_valid_json() {
        let factors = CharacterFactors::with_location("Zaun");
        let text = to_json_pretty(&factors).unwrap();
        let parsed: Json = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({"location": "Zaun"}));
    }
}
