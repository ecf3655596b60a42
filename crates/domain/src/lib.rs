//! qrewrite domain layer
pub mod address_family;
pub mod config;
pub mod errors;
pub mod marker;
pub mod probe_size;

pub use address_family::AddressFamily;
pub use config::{CliOverrides, Config, ConfigError, LoggingConfig, ProbeConfig};
pub use errors::DomainError;
pub use marker::{MarkerDigit, MarkerLabel};
pub use probe_size::ProbeSize;
