// pizza-client/src/catalog.rs
// Catalog - product list loading and the employee "create product" form

use rust_decimal::Decimal;
use shared::{CatalogItem, ProductCategory, ProductCreate, ProductSize};

use crate::backend::{Backend, ProductPhoto};
use crate::error::{ClientResult, ValidationError};
use crate::notify::Notification;

pub const LOAD_FAILED: &str = "Could not load products.";

/// Result of loading the catalog
///
/// A failed load degrades to an empty list plus an inline message.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    Loaded(Vec<CatalogItem>),
    Failed { message: String },
}

impl CatalogState {
    /// Products to display (empty after a failure)
    pub fn items(&self) -> &[CatalogItem] {
        match self {
            Self::Loaded(items) => items,
            Self::Failed { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Loaded(_) => None,
            Self::Failed { message } => Some(message),
        }
    }
}

/// `GET /products`
pub async fn load_catalog(backend: &dyn Backend) -> CatalogState {
    match backend.list_products().await {
        Ok(items) => {
            tracing::debug!(count = items.len(), "Catalog loaded");
            CatalogState::Loaded(items)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch products");
            CatalogState::Failed {
                message: LOAD_FAILED.to_string(),
            }
        }
    }
}

/// "Create product" form contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: Option<Decimal>,
    /// Initial stock
    pub stock: Option<Decimal>,
    pub category: Option<ProductCategory>,
    pub size: Option<ProductSize>,
}

impl ProductDraft {
    /// Changing the category always resets the size
    pub fn set_category(&mut self, category: ProductCategory) {
        self.category = Some(category);
        self.size = None;
    }

    pub fn validate(&self) -> Result<ProductCreate, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("Name"));
        }
        let category = self.category.ok_or(ValidationError::MissingField("Category"))?;
        let price = self.price.ok_or(ValidationError::MissingField("Price"))?;
        let stock = self.stock.ok_or(ValidationError::MissingField("Stock"))?;
        if price < Decimal::ZERO {
            return Err(ValidationError::Negative("Price"));
        }
        if stock < Decimal::ZERO {
            return Err(ValidationError::Negative("Stock"));
        }

        let size = if category.requires_size() {
            let size = self.size.ok_or(ValidationError::SizeRequired(category))?;
            if !size.fits(category) {
                return Err(ValidationError::SizeMismatch { category, size });
            }
            Some(size)
        } else {
            None
        };

        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(ProductCreate {
            name: name.to_string(),
            description,
            price,
            total_amount: stock,
            category,
            size,
        })
    }
}

/// Validate and upload a new product
pub async fn submit_product(
    backend: &dyn Backend,
    draft: &ProductDraft,
    photo: Option<ProductPhoto>,
) -> ClientResult<CatalogItem> {
    let product = draft.validate()?;
    let created = backend.create_product(&product, photo).await.map_err(|e| {
        tracing::error!(name = %product.name, error = %e, "Failed to create product");
        e
    })?;
    tracing::info!(product_id = created.id, name = %created.name, "Product created");
    Ok(created)
}

/// [`submit_product`] folded into the notification the employee sees
pub async fn create_product(
    backend: &dyn Backend,
    draft: &ProductDraft,
    photo: Option<ProductPhoto>,
) -> Notification {
    match submit_product(backend, draft, photo).await {
        Ok(_) => Notification::product_created(),
        Err(e) => Notification::product_failed(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::testing::{FakeBackend, catalog_item};
    use http::StatusCode;

    fn pizza_draft() -> ProductDraft {
        let mut draft = ProductDraft {
            name: "Diavola".into(),
            price: Some(Decimal::new(1150, 2)),
            stock: Some(Decimal::from(20)),
            ..Default::default()
        };
        draft.set_category(ProductCategory::Pizza);
        draft.size = Some(ProductSize::Medium);
        draft
    }

    #[tokio::test]
    async fn test_load_catalog() {
        let fake = FakeBackend::new();
        fake.set_products(vec![catalog_item(
            1,
            "Margherita",
            Decimal::new(950, 2),
            ProductCategory::Pizza,
        )]);
        let state = load_catalog(&fake).await;
        assert_eq!(state.items().len(), 1);
        assert_eq!(state.error(), None);
    }

    #[tokio::test]
    async fn test_load_failure_degrades_to_empty() {
        let fake = FakeBackend::new();
        fake.fail("list_products", StatusCode::INTERNAL_SERVER_ERROR, None);
        let state = load_catalog(&fake).await;
        assert!(state.items().is_empty());
        assert_eq!(state.error(), Some(LOAD_FAILED));
    }

    #[test]
    fn test_required_fields() {
        let draft = ProductDraft::default();
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("Name")));

        let mut draft = pizza_draft();
        draft.stock = None;
        assert_eq!(draft.validate(), Err(ValidationError::MissingField("Stock")));

        let mut draft = pizza_draft();
        draft.price = Some(Decimal::new(-1, 0));
        assert_eq!(draft.validate(), Err(ValidationError::Negative("Price")));
    }

    #[test]
    fn test_size_rules() {
        let mut draft = pizza_draft();
        draft.set_category(ProductCategory::Drink);
        assert_eq!(
            draft.validate(),
            Err(ValidationError::SizeRequired(ProductCategory::Drink))
        );

        draft.size = Some(ProductSize::Large);
        assert_eq!(
            draft.validate(),
            Err(ValidationError::SizeMismatch {
                category: ProductCategory::Drink,
                size: ProductSize::Large
            })
        );

        draft.size = Some(ProductSize::Ml500);
        assert_eq!(draft.validate().unwrap().size, Some(ProductSize::Ml500));
    }

    #[test]
    fn test_sauce_drops_size() {
        let mut draft = pizza_draft();
        draft.category = Some(ProductCategory::Sauce);
        let product = draft.validate().unwrap();
        assert_eq!(product.size, None);

        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("size").is_none());
        assert!(value.get("description").is_none());
    }

    #[tokio::test]
    async fn test_submit_product_sends_photo() {
        let fake = FakeBackend::new();
        let photo = ProductPhoto {
            file_name: "diavola.png".into(),
            mime: "image/png".into(),
            bytes: vec![0x89, 0x50],
        };

        let created = submit_product(&fake, &pizza_draft(), Some(photo)).await.unwrap();
        assert_eq!(created.name, "Diavola");
        assert_eq!(created.has_image, Some(true));

        let sent = fake.last_payload("create_product").unwrap();
        assert_eq!(sent["photo"], "diavola.png");
        assert_eq!(sent["request"]["totalAmount"], 20.0);
        assert_eq!(sent["request"]["size"], "MEDIUM");
    }

    #[tokio::test]
    async fn test_create_product_notifications() {
        let fake = FakeBackend::new();
        assert_eq!(
            create_product(&fake, &pizza_draft(), None).await,
            Notification::product_created()
        );

        fake.fail("create_product", StatusCode::CONFLICT, Some("Product already exists"));
        let notification = create_product(&fake, &pizza_draft(), None).await;
        assert!(notification.is_error());
        assert_eq!(notification.text, "Product already exists");

        let notification = create_product(&fake, &ProductDraft::default(), None).await;
        assert_eq!(notification.text, "Name is required.");
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_backend() {
        let fake = FakeBackend::new();
        let err = submit_product(&fake, &ProductDraft::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(fake.calls("create_product"), 0);
    }
}
