use crate::{NewProduct, ServiceError};

/// Decodes a raw request body into an ordered batch of product ids.
///
/// Anything other than a JSON array of integers is `MalformedBatch`; an empty
/// array or `null` is `EmptyBatch`. Duplicates are kept in place.
pub fn parse_batch(body: &[u8]) -> Result<Vec<i64>, ServiceError> {
    let ids: Option<Vec<i64>> =
        serde_json::from_slice(body).map_err(|_| ServiceError::MalformedBatch)?;
    let ids = ids.unwrap_or_default();
    if ids.is_empty() {
        return Err(ServiceError::EmptyBatch);
    }
    Ok(ids)
}

pub fn parse_new_product(body: &[u8]) -> Result<NewProduct, ServiceError> {
    let product: NewProduct =
        serde_json::from_slice(body).map_err(|_| ServiceError::MalformedProduct)?;
    if product.name.trim().is_empty() || product.count < 0 {
        return Err(ServiceError::MalformedProduct);
    }
    Ok(product)
}
