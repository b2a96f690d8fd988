pub mod loader;
pub mod schema;
pub mod settings;

pub use loader::{
    default_config_path, load_config, load_config_from_str, load_or_default, store_layout,
    validate_config,
};
pub use schema::{ChecksConfig, DoctorConfig, StoreConfig, TablesConfig};
pub use settings::StoreSettings;
