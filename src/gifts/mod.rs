mod collect;
mod history;
mod item;
mod parse;
mod source;

pub use collect::{load_collections, load_gifts};
pub use history::{PricePoint, Timeframe, sentiment, simulated_history};
pub use item::{CollectionList, Freshness, GiftSnapshot, ItemStatus, PricedItem};
pub use parse::PLACEHOLDER_IMAGE;
pub use source::{HttpPriceSource, MockPriceSource, PriceSource};
