// External market data access: retry policy and price caching
pub mod fetch_policy;
pub mod price_cache;

pub use fetch_policy::FetchPolicy;
pub use price_cache::PriceCache;
