use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u64,
    pub ingredient_name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    /// e.g. "Refrigerator", "Pantry", "Freezer"
    pub storage_location: Option<String>,
    pub notes: Option<String>,
}

impl InventoryItem {
    pub fn days_until_expiration(&self, today: NaiveDate) -> Option<i64> {
        self.expiration_date.map(|date| (date - today).num_days())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<InventoryItem>,
    /// Highest item id ever handed out; ids are never reused.
    #[serde(skip)]
    pub last_item_id: u64,
}

impl Record for Inventory {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Inventory {
    pub fn view(&self, today: NaiveDate) -> InventoryView {
        InventoryView {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            items: self.items.iter().map(|item| item.view(today)).collect(),
        }
    }
}

impl InventoryItem {
    pub fn view(&self, today: NaiveDate) -> InventoryItemView {
        InventoryItemView {
            days_until_expiration: self.days_until_expiration(today),
            item: self.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub days_until_expiration: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<InventoryItemView>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryPayload {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryItemPayload {
    pub ingredient_name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub purchase_date: Option<String>,
    pub expiration_date: Option<String>,
    pub storage_location: Option<String>,
    pub notes: Option<String>,
}
