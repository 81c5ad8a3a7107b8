//! Shared configuration for the bookshelf workspace.

pub mod settings;

pub use settings::{CatalogSettings, Environment, LogFormat, Settings, TelemetrySettings};
