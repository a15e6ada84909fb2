use serde::{Deserialize, Serialize};

use crate::constants::CLUB;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: u64,
    pub date: String,
    pub phone: String,
    pub amount: f64,
    #[serde(default)]
    pub profit: f64,
}

impl Purchase {
    pub fn is_over_threshold(&self) -> bool {
        is_over_threshold(self.amount)
    }
}

pub fn is_over_threshold(amount: f64) -> bool {
    amount > CLUB.purchase_threshold
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub phone: String,
    pub name: String,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub total_profit: f64,
    #[serde(default)]
    pub num_purchases: u64,
    #[serde(default)]
    pub num_over_thresh: u64,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
}

impl Customer {
    pub fn flagged_purchases(&self) -> usize {
        self.purchases.iter().filter(|p| p.is_over_threshold()).count()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewPurchase {
    pub amount: f64,
    pub profit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PurchaseEdit {
    pub amount: f64,
    pub profit: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServerMessage {
    pub message: String,
}
