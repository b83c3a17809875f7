// Zone detection and scoring
pub mod analyzer;
pub mod detector;
pub mod enhanced_analyzer;

pub use analyzer::ZoneAnalyzer;
pub use detector::ZoneDetector;
pub use enhanced_analyzer::EnhancedZoneAnalyzer;
