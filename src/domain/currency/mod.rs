//! Currency value object and canonical catalog.

mod catalog;
mod currency;

pub use catalog::CurrencyCatalog;
pub use currency::Currency;
