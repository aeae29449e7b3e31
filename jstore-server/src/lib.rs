pub mod config;
pub mod errors;
pub mod id_generator;
pub mod identifier;
pub mod params;
pub mod services;
