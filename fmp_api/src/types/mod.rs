mod quote;
pub use self::quote::{ProfileRecord, QuoteRecord};

mod search;
pub use self::search::SearchRecord;
