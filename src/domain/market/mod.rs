// Market data value objects
pub mod bar;

pub use bar::Bar;
