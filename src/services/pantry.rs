use std::sync::Arc;

use chrono::{NaiveDate, TimeDelta, Utc};

use crate::error::{AppError, Result};
use crate::models::{Inventory, InventoryItem, InventoryItemPayload, InventoryPayload, non_blank, parse_iso_date};
use crate::store::MemoryStore;

const DEFAULT_PANTRY_NAME: &str = "My Pantry";

#[derive(Clone)]
pub struct PantryService {
    inventories: Arc<MemoryStore<Inventory>>,
}

impl PantryService {
    pub fn new(inventories: Arc<MemoryStore<Inventory>>) -> Self {
        PantryService { inventories }
    }

    pub fn list(&self) -> Result<Vec<Inventory>> {
        self.inventories.all()
    }

    pub fn get(&self, id: u64) -> Result<Option<Inventory>> {
        self.inventories.get(id)
    }

    pub fn create(&self, payload: InventoryPayload) -> Result<Inventory> {
        let name = non_blank(payload.name.as_deref()).unwrap_or(DEFAULT_PANTRY_NAME).to_string();
        let inventory = self.inventories.insert(|id| {
            let now = Utc::now();
            Ok(Inventory { id, name, created_at: now, updated_at: now, items: Vec::new(), last_item_id: 0 })
        })?;
        tracing::info!(inventory_id = inventory.id, name = %inventory.name, "created pantry");
        Ok(inventory)
    }

    pub fn delete(&self, id: u64) -> Result<bool> {
        self.inventories.remove(id)
    }

    /// `Ok(None)` when the inventory does not exist.
    pub fn add_item(&self, inventory_id: u64, payload: InventoryItemPayload) -> Result<Option<InventoryItem>> {
        let ingredient_name = non_blank(payload.ingredient_name.as_deref())
            .ok_or_else(|| AppError::Validation("'ingredient_name' is required".to_string()))?
            .to_string();
        let purchase_date = parse_iso_date(payload.purchase_date.as_deref())?;
        let expiration_date = parse_iso_date(payload.expiration_date.as_deref())?;

        let mut added = None;
        self.inventories.update(inventory_id, |inventory| {
            inventory.last_item_id += 1;
            let id = inventory.last_item_id;
            let item = InventoryItem {
                id,
                ingredient_name,
                quantity: payload.quantity,
                unit: payload.unit,
                purchase_date,
                expiration_date,
                storage_location: payload.storage_location,
                notes: payload.notes,
            };
            inventory.items.push(item.clone());
            inventory.updated_at = Utc::now();
            added = Some(item);
            Ok(())
        })?;

        if let Some(item) = &added {
            tracing::debug!(inventory_id, item_id = item.id, name = %item.ingredient_name, "stocked pantry item");
        }
        Ok(added)
    }

    /// `Ok(None)` when the inventory or the item does not exist.
    pub fn remove_item(&self, inventory_id: u64, item_id: u64) -> Result<Option<Inventory>> {
        let mut removed = false;
        let inventory = self.inventories.update(inventory_id, |inventory| {
            let before = inventory.items.len();
            inventory.items.retain(|item| item.id != item_id);
            removed = inventory.items.len() < before;
            if removed {
                inventory.updated_at = Utc::now();
            }
            Ok(())
        })?;
        Ok(inventory.filter(|_| removed))
    }

    /// Items expiring on or before `today + within_days` (already expired
    /// included), soonest first.
    pub fn expiring(&self, inventory_id: u64, within_days: i64, today: NaiveDate) -> Result<Option<Vec<InventoryItem>>> {
        let Some(inventory) = self.inventories.get(inventory_id)? else {
            return Ok(None);
        };
        let cutoff = TimeDelta::try_days(within_days)
            .and_then(|window| today.checked_add_signed(window))
            .ok_or_else(|| AppError::Validation(format!("'days' is out of range: {}", within_days)))?;

        let mut items: Vec<InventoryItem> = inventory
            .items
            .into_iter()
            .filter(|item| item.expiration_date.is_some_and(|date| date <= cutoff))
            .collect();
        items.sort_by_key(|item| item.expiration_date);
        Ok(Some(items))
    }
}
