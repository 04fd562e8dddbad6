diesel::table! {
    products (id) {
        id -> Int8,
        product_name -> Varchar,
        size -> Varchar,
        count -> Int4,
    }
}

diesel::table! {
    reservations (product_name) {
        product_name -> Varchar,
        reservable -> Bool,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    products,
    reservations,
);
