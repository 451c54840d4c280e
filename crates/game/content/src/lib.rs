//! Data-driven content for the combat engine.
//!
//! This crate turns data files into the values `combat-core` consumes:
//! - Living templates (data-driven via RON)
//! - Combat tuning (data-driven via TOML)
//!
//! Content is read once at startup and never mutated by combat.

pub mod templates;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use templates::{LivingTemplate, TemplateCatalog, TemplateKind};

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult, TemplateLoader};
