use serde::{Deserialize, Serialize};

/// One element of the `/search` array.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRecord {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub stock_exchange: Option<String>,
    #[serde(default)]
    pub exchange_short_name: Option<String>,
}
