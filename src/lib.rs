//! Backstory Engine — procedural character backstories from weighted tables.
//!
//! Characters are resolved property by property from weighted decision
//! tables. Earlier results bias later weights (location tendencies,
//! household wealth), and table entries can trigger nested rolls or spawn
//! fully generated linked characters such as parents.

pub mod core;
pub mod schema;
