pub mod config;
pub mod error;
pub mod transform;
pub mod types;

pub use config::{ConfigError, ResolverConfig};
pub use error::{ResolveError, Result};
pub use transform::Transform;
pub use types::ObjectPath;
