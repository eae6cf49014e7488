//! Session management: configuration and the connection-owning controller.

pub mod config;
pub mod controller;

pub use config::{Config, ConfigBuilder};
pub use controller::{Controller, QuoteCallback, State, TradeCallback};
