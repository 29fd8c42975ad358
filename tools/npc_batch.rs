/// NPC Batch — generates characters and writes one JSON file per character.
///
/// Usage: npc_batch --tables <file.ron> --locations <file.ron> [--config <file.ron>]
///                  [--count <n>] [--seed <n>] [--out <dir>]
use backstory_engine::core::export;
use backstory_engine::core::generator::BackstoryGenerator;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: npc_batch --tables <file.ron> --locations <file.ron> [--config <file.ron>] [--count <n>] [--seed <n>] [--out <dir>]";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut tables = None;
    let mut locations = None;
    let mut config = None;
    let mut count = 50usize;
    let mut seed = 0u64;
    let mut out = PathBuf::from("NPCs");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--tables" if i + 1 < args.len() => {
                i += 1;
                tables = Some(args[i].clone());
            }
            "--locations" if i + 1 < args.len() => {
                i += 1;
                locations = Some(args[i].clone());
            }
            "--config" if i + 1 < args.len() => {
                i += 1;
                config = Some(args[i].clone());
            }
            "--count" if i + 1 < args.len() => {
                i += 1;
                count = args[i].parse().unwrap_or_else(|_| {
                    eprintln!("Error: --count must be a non-negative integer");
                    process::exit(1);
                });
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or_else(|_| {
                    eprintln!("Error: --seed must be an integer");
                    process::exit(1);
                });
            }
            "--out" if i + 1 < args.len() => {
                i += 1;
                out = PathBuf::from(&args[i]);
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

    let (tables, locations) = match (tables, locations) {
        (Some(t), Some(l)) => (t, l),
        _ => {
            eprintln!("Error: --tables and --locations are required");
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let mut builder = BackstoryGenerator::builder()
        .seed(seed)
        .tables_path(&tables)
        .locations_path(&locations);
    if let Some(ref path) = config {
        builder = builder.config_path(path);
    }
    let mut generator = builder.build().unwrap_or_else(|e| {
        eprintln!("Error loading catalogs: {}", e);
        process::exit(1);
    });

    std::fs::create_dir_all(&out).unwrap_or_else(|e| {
        eprintln!("Error creating output directory '{}': {}", out.display(), e);
        process::exit(1);
    });

    let mut written = 0;
    for index in 0..count {
        let factors = match generator.generate() {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(index, error = %e, "character generation failed");
                continue;
            }
        };
        let text = export::to_json_pretty(&factors).unwrap_or_else(|e| {
            eprintln!("Error serializing character {}: {}", index, e);
            process::exit(1);
        });
        let path = out.join(format!("NPC {}.json", index));
        std::fs::write(&path, text).unwrap_or_else(|e| {
            eprintln!("Error writing '{}': {}", path.display(), e);
            process::exit(1);
        });
        written += 1;
    }

    println!("Wrote {} of {} characters to '{}'", written, count, out.display());
}
