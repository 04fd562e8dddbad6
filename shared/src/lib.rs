use serde::{Deserialize, Serialize};

pub mod batch;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod store;

pub use batch::{parse_batch, parse_new_product};
pub use engine::ReservationEngine;
pub use error::ServiceError;
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryStore;
pub use store::{CatalogStore, ReservationStore, WarehouseStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_id")]
    pub id: i64,
    pub name: String,
    pub size: String,
    pub count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub count: i32,
}

/// Products whose name has no reservation entry, with their summed count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableProducts {
    pub all_count: i64,
    pub goods: Vec<Product>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Reserve,
    Release,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    AllAlreadyReservedOrUnknown,
    NoneFound,
    NothingToRelease,
}

impl Outcome {
    /// Decision table for a finished reserve batch. Evaluated in order: an
    /// empty result with skipped duplicates wins over an empty result alone.
    pub fn for_reserve(reserved: usize, already_reserved: usize) -> Self {
        if reserved == 0 && already_reserved > 0 {
            Outcome::AllAlreadyReservedOrUnknown
        } else if reserved == 0 {
            Outcome::NoneFound
        } else {
            Outcome::Success
        }
    }

    pub fn for_release(released: usize) -> Self {
        if released == 0 {
            Outcome::NothingToRelease
        } else {
            Outcome::Success
        }
    }

    pub fn for_delete(deleted: usize) -> Self {
        if deleted == 0 {
            Outcome::NoneFound
        } else {
            Outcome::Success
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

/// Caller-visible text for a batch that had no effect.
pub fn rejection_message(transition: Transition, outcome: Outcome) -> &'static str {
    match (transition, outcome) {
        (_, Outcome::AllAlreadyReservedOrUnknown) => {
            "requested items are already reserved or not in the catalog"
        }
        (Transition::Reserve, Outcome::NoneFound) => "no such products in stock",
        (_, Outcome::NoneFound) => "no products with these ids",
        (_, Outcome::NothingToRelease) => {
            "requested items are already released or were never reserved"
        }
        (_, Outcome::Success) => "ok",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub transition: Transition,
    pub products: Vec<Product>,
    pub already_reserved: usize,
    pub outcome: Outcome,
}

impl BatchReport {
    pub fn reserve(products: Vec<Product>, already_reserved: usize) -> Self {
        let outcome = Outcome::for_reserve(products.len(), already_reserved);
        Self {
            transition: Transition::Reserve,
            products,
            already_reserved,
            outcome,
        }
    }

    pub fn release(products: Vec<Product>) -> Self {
        let outcome = Outcome::for_release(products.len());
        Self {
            transition: Transition::Release,
            products,
            already_reserved: 0,
            outcome,
        }
    }

    pub fn delete(products: Vec<Product>) -> Self {
        let outcome = Outcome::for_delete(products.len());
        Self {
            transition: Transition::Delete,
            products,
            already_reserved: 0,
            outcome,
        }
    }

    pub fn into_result(self) -> Result<Vec<Product>, ServiceError> {
        if self.outcome.is_success() {
            Ok(self.products)
        } else {
            Err(ServiceError::Rejected {
                transition: self.transition,
                outcome: self.outcome,
            })
        }
    }
}
