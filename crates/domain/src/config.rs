pub mod errors;
pub mod logging;
pub mod probe;
pub mod root;

pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use probe::ProbeConfig;
pub use root::{CliOverrides, Config};
