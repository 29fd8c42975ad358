/// Table Linter — validates table and location catalogs against each other.
///
/// Usage: table_linter --tables <file.ron> --locations <file.ron> [--config <file.ron>]
use backstory_engine::core::config::GeneratorConfig;
use backstory_engine::schema::factors::Property;
use backstory_engine::schema::location::LocationCatalog;
use backstory_engine::schema::table::{FollowUp, TableCatalog};
use std::path::Path;
use std::process;

const USAGE: &str =
    "Usage: table_linter --tables <file.ron> --locations <file.ron> [--config <file.ron>]";

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut tables_path = None;
    let mut locations_path = None;
    let mut config_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" if i + 1 < args.len() => {
                i += 1;
                tables_path = Some(args[i].clone());
            }
            "--locations" if i + 1 < args.len() => {
                i += 1;
                locations_path = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--help" | "-h" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", USAGE);
                process::exit(1);
            }
        }
        i += 1;
    }

    let (tables_path, locations_path) = match (tables_path, locations_path) {
        (Some(t), Some(l)) => (t, l),
        _ => {
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let tables = TableCatalog::load_from_ron(Path::new(&tables_path)).unwrap_or_else(|e| {
        eprintln!("ERROR: Failed to load tables: {}", e);
        process::exit(1);
    });
    let locations =
        LocationCatalog::load_from_ron(Path::new(&locations_path)).unwrap_or_else(|e| {
            eprintln!("ERROR: Failed to load locations: {}", e);
            process::exit(1);
        });
    let config = match config_path {
        Some(ref path) => GeneratorConfig::load_from_ron(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("ERROR: Failed to load config: {}", e);
            process::exit(1);
        }),
        None => GeneratorConfig::default(),
    };

    println!(
        "Loaded {} tables and {} locations",
        tables.tables.len(),
        locations.locations.len()
    );

    let (errors, warnings) = lint(&tables, &locations, &config);

    println!("\n=== Table Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint(
    tables: &TableCatalog,
    locations: &LocationCatalog,
    config: &GeneratorConfig,
) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Designated tables must exist.
    for property in Property::ALL {
        if let Some(name) = config.tables.for_property(property) {
            if !tables.contains(name) {
                errors.push(format!("table '{}' for property '{}' is missing", name, property));
            }
        }
    }

    // Reason tables are named by class and past results.
    for property in [Property::Class, Property::Past] {
        let Some(entries) = config.tables.for_property(property).and_then(|n| tables.get(n))
        else {
            continue;
        };
        for entry in entries {
            let reason = entry.result.as_key();
            if !tables.contains(&reason) {
                errors.push(format!(
                    "{} '{}' has no reason table of the same name",
                    property, reason
                ));
            }
        }
    }

    // Lifestyles must map to a wealth tier.
    if let Some(entries) = tables.get(&config.tables.lifestyle) {
        for entry in entries {
            if config.wealth_tiers.get(&entry.result.as_key()).is_none() {
                errors.push(format!("lifestyle '{}' has no wealth tier", entry.result));
            }
        }
    }

    // Follow-ups must name real tables.
    let mut names: Vec<&String> = tables.tables.keys().collect();
    names.sort();
    for name in names {
        let entries = &tables.tables[name];
        if entries.is_empty() {
            errors.push(format!("table '{}' has no entries", name));
        }
        for entry in entries {
            for directive in &entry.extra_rolls {
                let follow_up = FollowUp::parse(
                    directive,
                    &config.linked_character_token,
                    &config.default_linked_label,
                );
                if let FollowUp::SubTable(target) = follow_up {
                    if !tables.contains(&target) {
                        errors.push(format!(
                            "table '{}' entry '{}' references unknown table '{}'",
                            name, entry.result, target
                        ));
                    }
                }
            }
        }
    }

    // Tendencies must match entries; origins must be known locations.
    let mut location_names: Vec<&String> = locations.locations.keys().collect();
    location_names.sort();
    for location in location_names {
        let modifier = &locations.locations[location];
        if modifier.wealth <= 0.0 {
            errors.push(format!("location '{}' has non-positive wealth", location));
        }
        for (property_name, multipliers) in &modifier.tendencies {
            let Some(property) = Property::ALL.iter().find(|p| p.name() == property_name)
            else {
                warnings.push(format!(
                    "location '{}' has tendencies for unknown property '{}'",
                    location, property_name
                ));
                continue;
            };
            let Some(entries) = config
                .tables
                .for_property(*property)
                .and_then(|n| tables.get(n))
            else {
                continue;
            };
            for key in multipliers.keys() {
                if !entries.iter().any(|e| e.result.as_key() == *key) {
                    errors.push(format!(
                        "location '{}' tendency '{}' matches no {} entry",
                        location, key, property
                    ));
                }
            }
        }
        if modifier.origin_weights.is_empty() {
            warnings.push(format!(
                "location '{}' has no origin weights; linked characters cannot be placed",
                location
            ));
        }
        for origin in modifier.origin_weights.keys() {
            if locations.get(origin).is_none() {
                errors.push(format!(
                    "location '{}' lists unknown origin '{}'",
                    location, origin
                ));
            }
        }
    }

    for origin in config.initial_locations.keys() {
        if locations.get(origin).is_none() {
            errors.push(format!("initial location '{}' is not a known location", origin));
        }
    }

    (errors, warnings)
}
