use diesel::prelude::*;
use shared::{NewProduct, Product};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i64,
    pub product_name: String,
    pub size: String,
    pub count: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProductRow {
    pub product_name: String,
    pub size: String,
    pub count: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::reservations)]
pub struct NewReservation<'a> {
    pub product_name: &'a str,
    pub reservable: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.product_name,
            size: row.size,
            count: row.count,
        }
    }
}

impl From<NewProduct> for NewProductRow {
    fn from(product: NewProduct) -> Self {
        Self {
            product_name: product.name,
            size: product.size,
            count: product.count,
        }
    }
}
