mod client;
mod errors;
mod query;
pub mod types;
pub use self::client::{Api, BaseUrls, Client};
pub use self::errors::Error;
pub use self::query::{
    EodQuery, FxQuery, IntradayQuery, ProfileQuery, Query, QuoteQuery, SearchQuery,
};
