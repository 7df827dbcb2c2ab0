//! Merchant product catalog.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{NewProduct, Product, ProductId};
pub use repository::ProductRepository;
pub use router::{product_admin_router, product_router};
pub use service::{ProductService, ProductServiceError};
