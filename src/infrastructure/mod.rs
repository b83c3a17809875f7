pub mod alerts;
pub mod csv_market_data;
pub mod mock;
pub mod repositories;

pub use alerts::{ChannelAlertSink, TracingAlertSink};
pub use csv_market_data::CsvMarketDataSource;
pub use mock::MockMarketDataSource;
pub use repositories::InMemoryZoneStore;
