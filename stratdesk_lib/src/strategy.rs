//! Laddered buy/sell plan calculator.
//!
//! Each order buys a fixed step further below the base price and sells at a
//! target profit over its own buy price. Pure arithmetic, no upstream calls.

use serde::{Deserialize, Serialize};

use crate::error::StratdeskError;
use crate::quote::round2;
use crate::validation::{validate_percent, validate_positive};

pub const MAX_ORDERS: u32 = 100;

/// Inputs for a sell plan. Percentages are whole numbers (5 means 5%).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellPlan {
    pub base_price: f64,
    #[serde(default = "default_drop_rate")]
    pub drop_rate: f64,
    #[serde(default = "default_first_target")]
    pub first_target_profit: f64,
    #[serde(default = "default_other_target")]
    pub other_target_profit: f64,
    #[serde(default = "default_num_orders")]
    pub num_orders: u32,
}

fn default_drop_rate() -> f64 {
    5.0
}

fn default_first_target() -> f64 {
    10.0
}

fn default_other_target() -> f64 {
    3.0
}

fn default_num_orders() -> u32 {
    4
}

impl SellPlan {
    /// A plan with the default ladder around `base_price`.
    pub fn new(base_price: f64) -> Self {
        Self {
            base_price,
            drop_rate: default_drop_rate(),
            first_target_profit: default_first_target(),
            other_target_profit: default_other_target(),
            num_orders: default_num_orders(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellOrder {
    pub order: u32,
    pub buy_price: f64,
    pub target_profit: f64,
    pub sell_price: f64,
    /// Cumulative drop from the base price, in percent.
    pub drop_rate: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellStrategy {
    pub sell_strategy: Vec<SellOrder>,
    pub count: usize,
    pub summary: SellPlanSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SellPlanSummary {
    pub base_price: f64,
    pub drop_rate: f64,
    pub first_target_profit: f64,
    pub other_target_profit: f64,
    pub total_orders: u32,
}

/// Computes the order ladder for `plan`.
pub fn sell_strategy(plan: &SellPlan) -> Result<SellStrategy, StratdeskError> {
    let base_price = validate_positive("basePrice", plan.base_price)?;
    let drop_rate = validate_percent("dropRate", plan.drop_rate)?;
    let first = validate_percent("firstTargetProfit", plan.first_target_profit)?;
    let other = validate_percent("otherTargetProfit", plan.other_target_profit)?;
    if plan.num_orders == 0 || plan.num_orders > MAX_ORDERS {
        return Err(StratdeskError::InvalidInput(format!(
            "numOrders must be between 1 and {}, got {}",
            MAX_ORDERS, plan.num_orders
        )));
    }

    let orders: Vec<SellOrder> = (1..=plan.num_orders)
        .map(|order| {
            let cumulative_drop = f64::from(order - 1) * drop_rate;
            let buy_price = base_price * (1.0 - cumulative_drop / 100.0);
            let target_profit = if order == 1 { first } else { other };
            let sell_price = buy_price * (1.0 + target_profit / 100.0);
            SellOrder {
                order,
                buy_price: round2(buy_price),
                target_profit,
                sell_price: round2(sell_price),
                drop_rate: cumulative_drop,
            }
        })
        .collect();

    Ok(SellStrategy {
        count: orders.len(),
        sell_strategy: orders,
        summary: SellPlanSummary {
            base_price,
            drop_rate,
            first_target_profit: first,
            other_target_profit: other,
            total_orders: plan.num_orders,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ladder() {
        let result = sell_strategy(&SellPlan::new(100.0)).unwrap();
        assert_eq!(result.count, 4);

        let buys: Vec<f64> = result.sell_strategy.iter().map(|o| o.buy_price).collect();
        assert_eq!(buys, vec![100.0, 95.0, 90.0, 85.0]);

        let sells: Vec<f64> = result.sell_strategy.iter().map(|o| o.sell_price).collect();
        assert_eq!(sells, vec![110.0, 97.85, 92.7, 87.55]);

        assert_eq!(result.sell_strategy[0].target_profit, 10.0);
        assert_eq!(result.sell_strategy[1].target_profit, 3.0);
        assert_eq!(result.sell_strategy[3].drop_rate, 15.0);
        assert_eq!(result.summary.total_orders, 4);
    }

    #[test]
    fn deserializes_with_defaults() {
        let plan: SellPlan = serde_json::from_str(r#"{"basePrice": 50}"#).unwrap();
        assert_eq!(plan, SellPlan::new(50.0));
    }

    #[test]
    fn rejects_non_positive_base() {
        let err = sell_strategy(&SellPlan::new(0.0)).unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert!(sell_strategy(&SellPlan::new(-10.0)).is_err());
    }

    #[test]
    fn rejects_order_count_out_of_range() {
        let mut plan = SellPlan::new(100.0);
        plan.num_orders = 0;
        assert!(sell_strategy(&plan).is_err());
        plan.num_orders = MAX_ORDERS + 1;
        assert!(sell_strategy(&plan).is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let result = sell_strategy(&SellPlan::new(10.0)).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["sellStrategy"].is_array());
        assert_eq!(json["sellStrategy"][0]["buyPrice"], 10.0);
        assert_eq!(json["summary"]["totalOrders"], 4);
    }
}
