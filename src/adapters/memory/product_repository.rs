//! In-memory implementation of ProductRepository.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ProductId};
use crate::domain::pricing::Product;
use crate::ports::ProductRepository;

/// In-memory product store for tests and local development.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn save(&self, product: &Product) -> Result<(), DomainError> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), DomainError> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Err(DomainError::new(ErrorCode::ProductNotFound, "Product not found"));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.products.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by_key(|p| std::cmp::Reverse(p.created_at));
        Ok(products)
    }

    async fn find_with_schedules(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self
            .products
            .read()
            .await
            .values()
            .filter(|p| p.has_schedules())
            .cloned()
            .collect())
    }
}
