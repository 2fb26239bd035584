use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

pub const MAX_IMAGE_URL_LEN: usize = 2000;
/// Width of the `name` and `slug` columns.
pub const MAX_NAME_LEN: usize = 255;
/// Exclusive upper bound of a `NUMERIC(12, 2)` price.
const PRICE_LIMIT: i64 = 10_000_000_000;

/// A size/color option of a product. Stored as part of the product document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub size: String,
    pub color: String,
    pub stock: i32,
    /// Sync variant id assigned by the fulfillment provider.
    #[serde(
        default,
        alias = "printfulVariantId",
        skip_serializing_if = "Option::is_none"
    )]
    pub fulfillment_variant_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Major currency units (dollars).
    pub price: BigDecimal,
    pub images: Vec<String>,
    pub slug: String,
    pub variants: Vec<Variant>,
    pub fulfillment_sync_product_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price of one unit in minor currency units.
    pub fn unit_amount(&self) -> Result<i64, DomainError> {
        to_minor_units(&self.price)
    }

    /// The variant an order was placed for. Both size and color must match.
    pub fn find_variant(&self, size: Option<&str>, color: Option<&str>) -> Option<&Variant> {
        let (size, color) = (size?, color?);
        self.variants
            .iter()
            .find(|v| v.size == size && v.color == color)
    }
}

/// Admin input for a new product, before normalization.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub images: Vec<String>,
    pub image_url: Option<String>,
    pub slug: Option<String>,
    pub variants: Vec<Variant>,
    pub fulfillment_sync_product_id: Option<i64>,
}

/// A validated product ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub images: Vec<String>,
    pub slug: String,
    pub variants: Vec<Variant>,
    pub fulfillment_sync_product_id: Option<i64>,
}

impl ProductDraft {
    pub fn into_new_product(self) -> Result<NewProduct, DomainError> {
        validate_name(&self.name)?;
        validate_description(&self.description)?;
        validate_price(&self.price)?;
        validate_variants(&self.variants)?;

        let images = fold_legacy_image(self.images, self.image_url);
        validate_images(&images)?;

        let slug = match self.slug {
            Some(s) if !s.trim().is_empty() => slugify(&s),
            _ => slugify(&self.name),
        };
        validate_slug(&slug)?;

        Ok(NewProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            images,
            slug,
            variants: self.variants,
            fulfillment_sync_product_id: self.fulfillment_sync_product_id,
        })
    }
}

/// Partial admin update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<BigDecimal>,
    pub images: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub slug: Option<String>,
    pub variants: Option<Vec<Variant>>,
    pub fulfillment_sync_product_id: Option<i64>,
}

impl ProductChanges {
    /// Validates the supplied fields and folds a legacy `image_url` into `images`.
    pub fn normalize(mut self) -> Result<Self, DomainError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        if let Some(price) = &self.price {
            validate_price(price)?;
        }
        if let Some(variants) = &self.variants {
            validate_variants(variants)?;
        }
        if let Some(url) = self.image_url.take() {
            if self.images.as_ref().map_or(true, Vec::is_empty) {
                self.images = Some(vec![url]);
            }
        }
        if let Some(images) = &self.images {
            validate_images(images)?;
        }
        if let Some(slug) = self.slug.take() {
            let slug = slugify(&slug);
            validate_slug(&slug)?;
            self.slug = Some(slug);
        }
        Ok(self)
    }
}

/// Converts a major-unit amount to minor units, rounding half away from zero.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    (amount * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_i64()
        .ok_or_else(|| DomainError::validation("Price is out of range"))
}

/// Lowercases and collapses every run of non-alphanumeric characters to `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

fn fold_legacy_image(images: Vec<String>, image_url: Option<String>) -> Vec<String> {
    match image_url {
        Some(url) if images.is_empty() => vec![url],
        _ => images,
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("Name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "Name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), DomainError> {
    if slug.is_empty() {
        return Err(DomainError::validation("Slug must contain letters or digits"));
    }
    if slug.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "Slug must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.trim().is_empty() {
        return Err(DomainError::validation("Description is required"));
    }
    Ok(())
}

fn validate_price(price: &BigDecimal) -> Result<(), DomainError> {
    if *price < BigDecimal::from(0) {
        return Err(DomainError::validation("Price must be at least 0"));
    }
    if price.with_scale_round(2, RoundingMode::HalfUp) >= BigDecimal::from(PRICE_LIMIT) {
        return Err(DomainError::validation(format!("Price must be less than {PRICE_LIMIT}")));
    }
    Ok(())
}

fn validate_images(images: &[String]) -> Result<(), DomainError> {
    for url in images {
        if url.len() > MAX_IMAGE_URL_LEN {
            return Err(DomainError::validation("URL too long"));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(DomainError::validation("Must be a valid URL"));
        }
    }
    Ok(())
}

fn validate_variants(variants: &[Variant]) -> Result<(), DomainError> {
    if variants.iter().any(|v| v.stock < 0) {
        return Err(DomainError::validation("Variant stock must be at least 0"));
    }
    Ok(())
}
