pub mod agents;
pub mod completions;
pub mod config;
pub mod console;
pub mod experiment;
pub mod realms;
pub mod render;
pub mod traverse;
