use std::sync::Arc;

use bigdecimal::RoundingMode;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::fulfillment::{
    catalog_variant_id, SyncProductRequest, SyncVariantRequest, PLACEHOLDER_PRINT_FILE,
};
use crate::domain::ports::{FulfillmentProvider, ImageHost, ImageUpload, ProductRepository};
use crate::domain::product::{NewProduct, Product, ProductChanges, ProductDraft};

use super::blocking;

fn not_found() -> DomainError {
    DomainError::NotFound("Product not found".to_string())
}

pub struct CatalogService {
    products: Arc<dyn ProductRepository>,
    fulfillment: Arc<dyn FulfillmentProvider>,
    images: Arc<dyn ImageHost>,
}

impl CatalogService {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        fulfillment: Arc<dyn FulfillmentProvider>,
        images: Arc<dyn ImageHost>,
    ) -> Self {
        Self {
            products,
            fulfillment,
            images,
        }
    }

    pub async fn list(&self) -> Result<Vec<Product>, DomainError> {
        let repo = self.products.clone();
        blocking(move || repo.list()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Product, DomainError> {
        let repo = self.products.clone();
        blocking(move || repo.find_by_id(id)).await?.ok_or_else(not_found)
    }

    /// Resolves a UUID as an id and anything else as a slug.
    pub async fn get_by_id_or_slug(&self, key: &str) -> Result<Product, DomainError> {
        let repo = self.products.clone();
        let found = match Uuid::parse_str(key) {
            Ok(id) => blocking(move || repo.find_by_id(id)).await?,
            Err(_) => {
                let slug = key.to_string();
                blocking(move || repo.find_by_slug(&slug)).await?
            }
        };
        found.ok_or_else(not_found)
    }

    pub async fn create(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        let mut product = draft.into_new_product()?;
        self.sync_with_fulfillment(&mut product).await;

        let repo = self.products.clone();
        let created = blocking(move || repo.create(product)).await?;
        log::info!("Created product {} ({})", created.id, created.slug);
        Ok(created)
    }

    /// Registers the product with the fulfillment provider and records the ids it assigns.
    ///
    /// Failures are logged and leave the product unlinked.
    async fn sync_with_fulfillment(&self, product: &mut NewProduct) {
        let retail_price = product
            .price
            .with_scale_round(2, RoundingMode::HalfUp)
            .to_string();
        let print_file = product
            .images
            .first()
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER_PRINT_FILE.to_string());

        let request = SyncProductRequest {
            name: product.name.clone(),
            thumbnail: product.images.first().cloned(),
            variants: product
                .variants
                .iter()
                .map(|v| SyncVariantRequest {
                    catalog_variant_id: catalog_variant_id(&v.color, &v.size),
                    retail_price: retail_price.clone(),
                    file_url: print_file.clone(),
                })
                .collect(),
        };

        match self.fulfillment.create_sync_product(request).await {
            Ok(synced) => {
                product.fulfillment_sync_product_id = Some(synced.id);
                for (variant, id) in product.variants.iter_mut().zip(synced.variant_ids) {
                    variant.fulfillment_variant_id = Some(id);
                }
            }
            Err(e) => log::error!("Fulfillment sync failed, continuing without linking: {e}"),
        }
    }

    pub async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, DomainError> {
        let changes = changes.normalize()?;
        let repo = self.products.clone();
        blocking(move || repo.update(id, changes)).await?.ok_or_else(not_found)
    }

    /// Deletes the product, then each of its hosted images.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let repo = self.products.clone();
        let deleted = blocking(move || repo.delete(id)).await?.ok_or_else(not_found)?;

        for url in &deleted.images {
            if let Err(e) = self.images.delete(url).await {
                log::error!("Failed to delete image {url}: {e}");
            }
        }
        log::info!("Deleted product {id}");
        Ok(())
    }

    pub async fn upload_image(&self, image: ImageUpload) -> Result<String, DomainError> {
        self.images.upload(image).await
    }
}
