pub mod config_store;

pub use config_store::{Binding, ConfigStore, Mapping, StoreError, DEFAULT_FILE_NAME};
