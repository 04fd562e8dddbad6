use anyhow::Result;
use async_trait::async_trait;
use diesel::dsl::{exists, sum};
use diesel::prelude::*;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use shared::{CatalogStore, NewProduct, Product, ReservationStore};

use crate::models::*;
use crate::schema::*;

// Products whose name has no reservation entry (anti-join on name).
macro_rules! available_products {
    () => {
        products::table
            .left_join(reservations::table.on(reservations::product_name.eq(products::product_name)))
            .filter(reservations::product_name.is_null())
    };
}

// A product by id, only if its name is reserved.
macro_rules! reserved_product {
    ($id:expr) => {
        products::table
            .inner_join(reservations::table.on(reservations::product_name.eq(products::product_name)))
            .filter(products::id.eq($id))
            .select(ProductRow::as_select())
    };
}

pub type DbPool = bb8::Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Postgres-backed catalog and reservation store. Each method runs as a
/// single statement on a pooled connection.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Product>> {
        let mut conn = self.pool.get().await?;

        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(row.map(Product::from))
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product> {
        let mut conn = self.pool.get().await?;

        let row = diesel::insert_into(products::table)
            .values(NewProductRow::from(product))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await?;

        Ok(row.into())
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let mut conn = self.pool.get().await?;

        diesel::delete(products::table.find(id))
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn sum_available_count(&self) -> Result<i64> {
        let mut conn = self.pool.get().await?;

        let total: Option<i64> = available_products!()
            .select(sum(products::count))
            .first(&mut conn)
            .await?;

        Ok(total.unwrap_or(0))
    }

    async fn list_available(&self) -> Result<Vec<Product>> {
        let mut conn = self.pool.get().await?;

        let rows = available_products!()
            .select(ProductRow::as_select())
            .order(products::id.asc())
            .load(&mut conn)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_reserved(&self, id: i64) -> Result<Option<Product>> {
        let mut conn = self.pool.get().await?;

        let row = reserved_product!(id)
            .first(&mut conn)
            .await
            .optional()?;

        Ok(row.map(Product::from))
    }
}

#[async_trait]
impl ReservationStore for PgStore {
    async fn reservation_exists(&self, product_name: &str) -> Result<bool> {
        let mut conn = self.pool.get().await?;

        let found = diesel::select(exists(
            reservations::table.filter(reservations::product_name.eq(product_name)),
        ))
        .get_result(&mut conn)
        .await?;

        Ok(found)
    }

    async fn insert_reservation(&self, product_name: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;

        let new_reservation = NewReservation {
            product_name,
            reservable: true,
        };

        diesel::insert_into(reservations::table)
            .values(&new_reservation)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    async fn delete_reservation(&self, product_name: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;

        diesel::delete(reservations::table.filter(reservations::product_name.eq(product_name)))
            .execute(&mut conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;
    use diesel::pg::Pg;

    use super::*;

    const NAME_JOIN: &str = r#""reservations"."product_name" = "products"."product_name""#;

    #[test]
    fn available_sum_excludes_reserved_names() {
        let query = available_products!().select(sum(products::count));
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(
            sql.to_lowercase().contains(r#"sum("products"."count")"#),
            "{sql}"
        );
        assert!(sql.contains(r#"LEFT OUTER JOIN "reservations""#), "{sql}");
        assert!(sql.contains(NAME_JOIN), "{sql}");
        assert!(sql.contains("WHERE"), "{sql}");
        assert!(sql.contains(r#""reservations"."product_name" IS NULL"#), "{sql}");
        assert!(!sql.contains("ORDER BY"), "{sql}");
    }

    #[test]
    fn available_listing_is_ordered_by_id() {
        let query = available_products!()
            .select(ProductRow::as_select())
            .order(products::id.asc());
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains(r#"LEFT OUTER JOIN "reservations""#), "{sql}");
        assert!(sql.contains(NAME_JOIN), "{sql}");
        assert!(sql.contains(r#""reservations"."product_name" IS NULL"#), "{sql}");
        assert!(sql.contains(r#"ORDER BY "products"."id" ASC"#), "{sql}");
    }

    #[test]
    fn reserved_lookup_joins_on_name() {
        let query = reserved_product!(7_i64);
        let sql = debug_query::<Pg, _>(&query).to_string();

        assert!(sql.contains(r#"INNER JOIN "reservations""#), "{sql}");
        assert!(sql.contains(NAME_JOIN), "{sql}");
        assert!(sql.contains(r#""products"."id" = $1"#), "{sql}");
        assert!(!sql.contains("IS NULL"), "{sql}");
        assert!(sql.contains("binds: [7]"), "{sql}");
    }
}
