pub mod cli;
pub mod config;
pub mod error;
pub mod node;
pub mod registry;
pub mod swarm;
