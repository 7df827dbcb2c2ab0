use std::sync::Arc;

use tracing::info;

use super::domain::{NewProduct, Product, ProductId};
use super::repository::ProductRepository;
use crate::repository::RepositoryError;

pub struct ProductService<R> {
    repository: Arc<R>,
}

impl<R> ProductService<R>
where
    R: ProductRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn list(&self) -> Result<Vec<Product>, ProductServiceError> {
        Ok(self.repository.list()?)
    }

    pub fn get(&self, id: ProductId) -> Result<Product, ProductServiceError> {
        self.repository
            .find_by_id(id)?
            .ok_or(ProductServiceError::NotFound(id))
    }

    pub fn create(&self, product: NewProduct) -> Result<Product, ProductServiceError> {
        if product.name.trim().is_empty() {
            return Err(ProductServiceError::Invalid(
                "product name must not be empty",
            ));
        }
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(ProductServiceError::Invalid(
                "product price must be a non-negative amount",
            ));
        }

        let stored = self.repository.save(product)?;
        info!(product_id = %stored.id, merchant_id = stored.merchant_id, "product created");
        Ok(stored)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProductServiceError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error("product {0} does not exist")]
    NotFound(ProductId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
