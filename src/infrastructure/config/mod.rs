mod settings;

pub use settings::{LogConfig, LogFormat, PackagesConfig, ServerConfig, Settings, ENV_PREFIX};
