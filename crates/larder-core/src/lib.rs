//! Configuration loading, food domain types, prompt rendering, and the food gateway.

pub mod config;
pub mod error;
pub mod food;
pub mod gateway;
pub mod plan;
pub mod prompt;
pub mod vault;

pub use error::GatewayError;
pub use gateway::FoodGateway;
