use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::{Delivery, DeliveryStatus};

/// In-memory storage collaborator for delivery records.
///
/// Owns the records: all reads hand out clones, and the only write paths
/// are the atomic `insert` (which enforces order-id uniqueness) and the
/// versioned `update`. A transition that raced another writer fails with
/// `ConcurrencyConflict` instead of silently overwriting.
pub struct DeliveryStore {
    deliveries: DashMap<Uuid, Delivery>,
    order_index: DashMap<Uuid, Uuid>,
}

impl DeliveryStore {
    pub fn new() -> Self {
        Self {
            deliveries: DashMap::new(),
            order_index: DashMap::new(),
        }
    }

    /// Persists a new record. Fails with `DuplicateOrder` when a record
    /// already exists for the same order id; the uniqueness check and the
    /// index insert happen under one entry lock, so two racing creates
    /// cannot both succeed.
    pub fn insert(&self, delivery: Delivery) -> Result<Delivery, AppError> {
        match self.order_index.entry(delivery.order_id) {
            Entry::Occupied(_) => Err(AppError::DuplicateOrder(delivery.order_id)),
            Entry::Vacant(slot) => {
                slot.insert(delivery.id);
                self.deliveries.insert(delivery.id, delivery.clone());
                Ok(delivery)
            }
        }
    }

    /// Commits an updated record if nobody else has written since the
    /// caller's snapshot was taken, comparing on `version`.
    pub fn update(&self, updated: Delivery) -> Result<Delivery, AppError> {
        let mut entry = self
            .deliveries
            .get_mut(&updated.id)
            .ok_or_else(|| AppError::NotFound(format!("delivery {} not found", updated.id)))?;

        if entry.version != updated.version {
            return Err(AppError::ConcurrencyConflict(updated.id));
        }

        let mut committed = updated;
        committed.version += 1;
        *entry = committed.clone();
        Ok(committed)
    }

    pub fn find_by_id(&self, id: Uuid) -> Option<Delivery> {
        self.deliveries.get(&id).map(|entry| entry.value().clone())
    }

    pub fn find_by_order_id(&self, order_id: Uuid) -> Option<Delivery> {
        let delivery_id = *self.order_index.get(&order_id)?;
        self.find_by_id(delivery_id)
    }

    pub fn exists_by_order_id(&self, order_id: Uuid) -> bool {
        self.order_index.contains_key(&order_id)
    }

    pub fn find_by_driver_id(&self, driver_id: Uuid) -> Vec<Delivery> {
        self.deliveries
            .iter()
            .filter(|entry| entry.value().driver_id == Some(driver_id))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn find_by_status(&self, status: DeliveryStatus) -> Vec<Delivery> {
        self.deliveries
            .iter()
            .filter(|entry| entry.value().status == status)
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn find_by_driver_and_status(
        &self,
        driver_id: Uuid,
        status: DeliveryStatus,
    ) -> Vec<Delivery> {
        self.deliveries
            .iter()
            .filter(|entry| {
                let delivery = entry.value();
                delivery.driver_id == Some(driver_id) && delivery.status == status
            })
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn find_all(&self) -> Vec<Delivery> {
        self.deliveries
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}

impl Default for DeliveryStore {
    fn default() -> Self {
        Self::new()
    }
}
