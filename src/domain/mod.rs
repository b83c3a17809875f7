// Component configuration value objects
pub mod config;

// Domain-specific error types
pub mod errors;

// Market data value objects
pub mod market;

// Port interfaces
pub mod ports;

// Zone records, events and analysis outputs
pub mod zones;
