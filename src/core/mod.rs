pub mod config;
pub mod dice;
pub mod export;
pub mod generator;
pub mod resolver;
pub mod roller;
pub mod weights;
