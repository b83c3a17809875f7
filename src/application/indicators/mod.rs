// Technical indicator calculations feeding the confirmation analyzer
pub mod library;
pub mod momentum;
pub mod order_flow;
pub mod smc;
pub mod swings;
pub mod volume_profile;

pub use library::{IndicatorBundle, IndicatorLibrary};

use serde::{Deserialize, Serialize};

/// Directional read shared by every indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MarketBias {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}
