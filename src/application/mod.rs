// Agent modules - scanning and monitoring loops
pub mod agents;

// Technical indicator library
pub mod indicators;

// Market data access
pub mod market_data;

// Price monitoring and alert deduplication
pub mod monitoring;

// Zone detection and scoring
pub mod zones;
