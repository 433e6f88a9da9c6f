mod loader;
mod types;

pub use loader::{ConfigError, MAX_PER_PAGE};
pub use types::{ApiConfig, Config, ListConfig, StorageConfig};
