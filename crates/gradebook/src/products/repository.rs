use super::domain::{NewProduct, Product, ProductId};
use crate::repository::RepositoryError;

pub trait ProductRepository: Send + Sync {
    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    fn save(&self, product: NewProduct) -> Result<Product, RepositoryError>;
}
