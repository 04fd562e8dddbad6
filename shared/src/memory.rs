use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::store::{CatalogStore, ReservationStore};
use crate::{NewProduct, Product};

#[derive(Default)]
struct State {
    next_id: i64,
    products: BTreeMap<i64, Product>,
    reservations: HashSet<String>,
    // Remaining calls before every operation starts failing.
    calls_left: Option<usize>,
}

/// In-process store with the same semantics as the Postgres one.
///
/// `fail_after` makes it return errors once a number of further calls have
/// gone through, which is how tests exercise mid-batch store failures.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_after(&self, calls: usize) {
        self.lock().calls_left = Some(calls);
    }

    pub fn recover(&self) {
        self.lock().calls_left = None;
    }

    pub fn reservation_count(&self) -> usize {
        self.lock().reservations.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.lock();
        if let Some(left) = state.calls_left.as_mut() {
            if *left == 0 {
                return Err(anyhow!("memory store: injected failure"));
            }
            *left -= 1;
        }
        Ok(state)
    }
}

impl State {
    fn available(&self) -> impl Iterator<Item = &Product> {
        self.products
            .values()
            .filter(move |p| !self.reservations.contains(&p.name))
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        Ok(self.begin()?.products.get(&id).cloned())
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        let mut state = self.begin()?;
        state.next_id += 1;
        let stored = Product {
            id: state.next_id,
            name: product.name,
            size: product.size,
            count: product.count,
        };
        state.products.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.begin()?.products.remove(&id);
        Ok(())
    }

    async fn sum_available_count(&self) -> Result<i64> {
        let state = self.begin()?;
        let sum = state.available().map(|p| i64::from(p.count)).sum();
        Ok(sum)
    }

    async fn list_available(&self) -> Result<Vec<Product>> {
        let state = self.begin()?;
        let goods = state.available().cloned().collect();
        Ok(goods)
    }

    async fn find_reserved(&self, id: i64) -> Result<Option<Product>> {
        let state = self.begin()?;
        let product = state
            .products
            .get(&id)
            .filter(|p| state.reservations.contains(&p.name))
            .cloned();
        Ok(product)
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn reservation_exists(&self, product_name: &str) -> Result<bool> {
        Ok(self.begin()?.reservations.contains(product_name))
    }

    async fn insert_reservation(&self, product_name: &str) -> Result<()> {
        let mut state = self.begin()?;
        if !state.reservations.insert(product_name.to_string()) {
            return Err(anyhow!(
                "duplicate key value violates unique constraint on reservations.product_name ({})",
                product_name
            ));
        }
        Ok(())
    }

    async fn delete_reservation(&self, product_name: &str) -> Result<()> {
        self.begin()?.reservations.remove(product_name);
        Ok(())
    }
}
