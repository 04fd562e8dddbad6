use anyhow::Result;
use async_trait::async_trait;

use crate::{NewProduct, Product};

/// Product records, independent of reservation state except for the
/// "available" and "reserved" filters, which join on product name.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product>;

    async fn delete_by_id(&self, id: i64) -> Result<()>;

    /// Sum of `count` over products with no reservation entry; 0 when there are none.
    async fn sum_available_count(&self) -> Result<i64>;

    /// Products with no reservation entry, ordered by id.
    async fn list_available(&self) -> Result<Vec<Product>>;

    /// Like `find_by_id`, but only matches a product whose name is reserved.
    async fn find_reserved(&self, id: i64) -> Result<Option<Product>>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn reservation_exists(&self, product_name: &str) -> Result<bool>;

    async fn insert_reservation(&self, product_name: &str) -> Result<()>;

    /// Deleting a name with no entry is not an error.
    async fn delete_reservation(&self, product_name: &str) -> Result<()>;
}

pub trait WarehouseStore: CatalogStore + ReservationStore {}

impl<T: CatalogStore + ReservationStore> WarehouseStore for T {}
