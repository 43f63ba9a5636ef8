//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse, deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → PollerConfig (validated, immutable)
//!     → each component receives its own section at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError};
pub use schema::{
    AlertConfig, BreakerConfig, LogFormat, ObservabilityConfig, PolicyConfig, PollerConfig,
    ScheduleConfig, SinkConfig, SourceConfig, TimeoutConfig,
};
pub use validation::ValidationError;
