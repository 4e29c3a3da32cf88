//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! route file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → loader.rs build_descriptors (resolve view keys via ViewRegistry)
//!     → RouteTable
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → Router rebuilds the table and swaps it in atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a full rebuild
//! - All fields have defaults to allow minimal route files
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{build_descriptors, load_config, parse_config, ConfigError};
pub use schema::{
    HistoryConfig, LoaderConfig, NavigationConfig, ObservabilityConfig, RouteConfig, RouterConfig,
};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
