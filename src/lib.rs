//! Lamina
//!
//! Layered, schema-driven configuration resolution: merge values from TOML/
//! JSON files, dotenv files, and environment variables into one flat,
//! case-insensitive key space, then resolve that space into strongly-typed
//! records with defaults and required-field enforcement.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//!
//! use lamina::{Configurable, EnvSource, Loader};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, Configurable)]
//! struct Target {
//!     #[config(key = "provider")]
//!     provider: String,
//!     #[config(key = "api_key")]
//!     api_key: String,
//! }
//!
//! #[derive(Debug, Deserialize, Configurable)]
//! struct AiConfig {
//!     #[config(key = "targets")]
//!     targets: HashMap<String, Target>,
//! }
//!
//! #[derive(Debug, Deserialize, Configurable)]
//! struct AppConfig {
//!     #[config(key = "host", default = "localhost")]
//!     host: String,
//!     #[config(key = "port", default = "8080")]
//!     port: u16,
//!     #[config(key = "ai")]
//!     ai: AiConfig,
//! }
//!
//! # fn main() -> Result<(), lamina::ConfigError> {
//! let config: AppConfig = Loader::new()
//!     .with_source(EnvSource::from_iter([(
//!         "AI__TARGETS__DEFAULT__PROVIDER",
//!         "anthropic",
//!     )]))
//!     .load()?;
//!
//! assert_eq!(config.host, "localhost");
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.ai.targets["default"].provider, "anthropic");
//! assert_eq!(config.ai.targets["default"].api_key, "");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;
pub mod resolve;
pub mod schema;
pub mod source;
pub mod store;
pub mod types;

pub use error::ConfigError;
pub use loader::{Loader, Profile};
pub use schema::{
    Configurable, ElementKind, FieldDecl, MetaKind, MetaNode, ScalarKind, Shape, reflect,
};
pub use source::{DotenvFile, EnvSource, JsonFile, Source, TomlFile, aggregate};
pub use store::{FlatMap, SEPARATOR};
pub use types::{MetricFloat, MetricInt};

pub use macros::Configurable;
