/// Admin role ids from the environment
pub mod roles;

/// Settings from config.toml and the environment
pub mod settings;
