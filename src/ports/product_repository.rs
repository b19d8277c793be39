//! Product persistence port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ProductId};
use crate::domain::pricing::Product;

/// Port for product persistence.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product.
    async fn save(&self, product: &Product) -> Result<(), DomainError>;

    /// Persist changes to an existing product.
    async fn update(&self, product: &Product) -> Result<(), DomainError>;

    /// Find a product by its id.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    /// All products, newest first.
    async fn find_all(&self) -> Result<Vec<Product>, DomainError>;

    /// Products holding at least one schedule entry, for the pricing sweep.
    async fn find_with_schedules(&self) -> Result<Vec<Product>, DomainError>;
}
