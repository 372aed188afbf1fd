//! Mapbind: declarative configuration bootstrap for a SQL mapping engine.
//!
//! Turns a hierarchical configuration document into a fully-wired
//! [`Configuration`]: variables resolved first, settings schema-gated,
//! extension points (plugins, factories, handlers) instantiated by name and
//! configured via property maps, exactly one environment bound, mapping
//! sources delegated to the statement-parsing stage.

pub mod builder;
pub mod config;
pub mod copier;
pub mod document;
pub mod error;
pub mod extensions;
pub mod logging;
pub mod registry;
pub mod resources;

pub use builder::ConfigurationBuilder;
pub use config::{Configuration, Environment, Settings};
pub use document::{Node, Properties};
pub use error::BuildError;
