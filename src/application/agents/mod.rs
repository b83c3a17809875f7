// Agent modules - long-running drivers of the zone engine
pub mod scanner;
pub mod scanner_config;

pub use scanner::{SymbolScanResult, ZoneScanner};
pub use scanner_config::ScannerConfig;
