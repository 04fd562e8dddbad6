use std::sync::Arc;

use tracing::{debug, info};

use crate::store::WarehouseStore;
use crate::{AvailableProducts, BatchReport, NewProduct, Product, ServiceError};

/// Applies batch transitions between "available" and "reserved".
///
/// Ids are handled one at a time in input order. A store failure returns
/// immediately through `?`; whatever earlier ids already committed stays
/// committed, since no transaction spans the batch.
#[derive(Clone)]
pub struct ReservationEngine {
    store: Arc<dyn WarehouseStore>,
}

impl ReservationEngine {
    pub fn new(store: Arc<dyn WarehouseStore>) -> Self {
        Self { store }
    }

    pub async fn list_available(&self) -> Result<AvailableProducts, ServiceError> {
        let all_count = self.store.sum_available_count().await?;
        let goods = self.store.list_available().await?;
        Ok(AvailableProducts { all_count, goods })
    }

    pub async fn add_product(&self, product: NewProduct) -> Result<Product, ServiceError> {
        let stored = self.store.insert_product(product).await?;
        info!("Added product {} ({})", stored.id, stored.name);
        Ok(stored)
    }

    pub async fn reserve(&self, ids: &[i64]) -> Result<BatchReport, ServiceError> {
        let mut reserved = Vec::new();
        let mut already_reserved = 0;

        for &id in ids {
            let Some(product) = self.store.find_by_id(id).await? else {
                debug!("Skipping unknown product id {}", id);
                continue;
            };

            if self.store.reservation_exists(&product.name).await? {
                already_reserved += 1;
                continue;
            }

            self.store.insert_reservation(&product.name).await?;
            reserved.push(product);
        }

        info!(
            "Reserve batch of {}: {} reserved, {} already reserved",
            ids.len(),
            reserved.len(),
            already_reserved
        );
        Ok(BatchReport::reserve(reserved, already_reserved))
    }

    pub async fn release(&self, ids: &[i64]) -> Result<BatchReport, ServiceError> {
        let mut released = Vec::new();

        for &id in ids {
            let Some(product) = self.store.find_reserved(id).await? else {
                debug!("Product id {} is unknown or not reserved", id);
                continue;
            };

            self.store.delete_reservation(&product.name).await?;
            released.push(product);
        }

        info!("Release batch of {}: {} released", ids.len(), released.len());
        Ok(BatchReport::release(released))
    }

    pub async fn delete_products(&self, ids: &[i64]) -> Result<BatchReport, ServiceError> {
        let mut deleted = Vec::new();

        for &id in ids {
            let Some(product) = self.store.find_by_id(id).await? else {
                continue;
            };

            self.store.delete_by_id(id).await?;
            // Runs even when the product was never reserved.
            self.store.delete_reservation(&product.name).await?;
            deleted.push(product);
        }

        info!("Delete batch of {}: {} deleted", ids.len(), deleted.len());
        Ok(BatchReport::delete(deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, Outcome};

    fn new_product(name: &str, size: &str, count: i32) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            size: size.to_string(),
            count,
        }
    }

    async fn seeded() -> (Arc<MemoryStore>, ReservationEngine) {
        let store = Arc::new(MemoryStore::new());
        let engine = ReservationEngine::new(store.clone());
        engine.add_product(new_product("milk", "0.2m", 15)).await.unwrap();
        engine.add_product(new_product("tables", "1.5m", 20)).await.unwrap();
        (store, engine)
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[tokio::test]
    async fn listing_excludes_reserved_products() {
        let (_, engine) = seeded().await;

        let available = engine.list_available().await.unwrap();
        assert_eq!(available.all_count, 35);
        assert_eq!(names(&available.goods), ["milk", "tables"]);

        let report = engine.reserve(&[1, 2]).await.unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(names(&report.products), ["milk", "tables"]);

        let available = engine.list_available().await.unwrap();
        assert_eq!(available.all_count, 0);
        assert!(available.goods.is_empty());
    }

    #[tokio::test]
    async fn reserving_one_product_removes_it_from_count_and_list() {
        let (_, engine) = seeded().await;
        engine.reserve(&[2]).await.unwrap();

        let available = engine.list_available().await.unwrap();
        assert_eq!(available.all_count, 15);
        assert_eq!(names(&available.goods), ["milk"]);
    }

    #[tokio::test]
    async fn unknown_ids_are_none_found() {
        let (_, engine) = seeded().await;

        let report = engine.reserve(&[999999]).await.unwrap();
        assert_eq!(report.outcome, Outcome::NoneFound);
        assert!(report.products.is_empty());

        let report = engine.release(&[999999, 123123123]).await.unwrap();
        assert_eq!(report.outcome, Outcome::NothingToRelease);

        let report = engine.delete_products(&[999999]).await.unwrap();
        assert_eq!(report.outcome, Outcome::NoneFound);
    }

    #[tokio::test]
    async fn second_reserve_counts_already_reserved() {
        let (store, engine) = seeded().await;
        engine.reserve(&[1]).await.unwrap();

        let report = engine.reserve(&[1, 404]).await.unwrap();
        assert_eq!(report.outcome, Outcome::AllAlreadyReservedOrUnknown);
        assert_eq!(report.already_reserved, 1);
        assert_eq!(store.reservation_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_id_in_one_batch_is_already_reserved() {
        let (store, engine) = seeded().await;

        let report = engine.reserve(&[2, 1, 2]).await.unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(names(&report.products), ["tables", "milk"]);
        assert_eq!(report.already_reserved, 1);
        assert_eq!(store.reservation_count(), 2);
    }

    #[tokio::test]
    async fn products_sharing_a_name_share_a_reservation() {
        let (_, engine) = seeded().await;
        let other_milk = engine.add_product(new_product("milk", "1l", 4)).await.unwrap();

        let report = engine.reserve(&[1, other_milk.id]).await.unwrap();
        assert_eq!(names(&report.products), ["milk"]);
        assert_eq!(report.already_reserved, 1);

        let available = engine.list_available().await.unwrap();
        assert_eq!(names(&available.goods), ["tables"]);

        let report = engine.release(&[other_milk.id]).await.unwrap();
        assert_eq!(report.products, vec![other_milk]);
        assert_eq!(engine.list_available().await.unwrap().all_count, 39);
    }

    #[tokio::test]
    async fn release_only_matches_reserved_products() {
        let (_, engine) = seeded().await;
        engine.reserve(&[1]).await.unwrap();

        let report = engine.release(&[2, 1, 1]).await.unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(names(&report.products), ["milk"]);

        let report = engine.release(&[1]).await.unwrap();
        assert_eq!(report.outcome, Outcome::NothingToRelease);
        assert_eq!(engine.list_available().await.unwrap().all_count, 35);
    }

    #[tokio::test]
    async fn delete_cleans_up_reservation() {
        let (store, engine) = seeded().await;
        engine.reserve(&[1]).await.unwrap();

        let report = engine.delete_products(&[1, 2]).await.unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(names(&report.products), ["milk", "tables"]);
        assert_eq!(store.reservation_count(), 0);

        let report = engine.release(&[1]).await.unwrap();
        assert_eq!(report.outcome, Outcome::NothingToRelease);
    }

    #[tokio::test]
    async fn store_failure_aborts_and_keeps_earlier_work() {
        let (store, engine) = seeded().await;
        // find(1) + exists + insert succeed, then find(2) fails.
        store.fail_after(3);

        let err = engine.reserve(&[1, 2]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));

        store.recover();
        let available = engine.list_available().await.unwrap();
        assert_eq!(names(&available.goods), ["tables"]);
    }

    #[tokio::test]
    async fn listing_fails_when_either_query_fails() {
        let (store, engine) = seeded().await;
        store.fail_after(1);

        let err = engine.list_available().await.unwrap_err();
        assert!(!err.is_client_error());
    }
}
