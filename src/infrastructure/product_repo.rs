use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::schema::products;

use super::models::{variants_to_json, NewProductRow, ProductChangeset, ProductRow};

fn map_write_error(e: DieselError) -> DomainError {
    match e {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DomainError::validation("A product with this slug already exists")
        }
        other => other.into(),
    }
}

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        products::table
            .select(ProductRow::as_select())
            .order(products::created_at.desc())
            .load(&mut conn)?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn find_by_slug(&self, slug: &str) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        products::table
            .filter(products::slug.eq(slug))
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }

    fn find_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows: Vec<(Uuid, String)> = products::table
            .filter(products::id.eq_any(ids))
            .select((products::id, products::name))
            .load(&mut conn)?;
        Ok(rows.into_iter().collect())
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;

        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                variants: variants_to_json(&product.variants)?,
                name: product.name,
                description: product.description,
                price: product.price,
                images: product.images,
                slug: product.slug,
                fulfillment_sync_product_id: product.fulfillment_sync_product_id,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .map_err(map_write_error)?;
        Product::try_from(row)
    }

    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let changeset = ProductChangeset {
            variants: changes.variants.as_deref().map(variants_to_json).transpose()?,
            name: changes.name,
            description: changes.description,
            price: changes.price,
            images: changes.images,
            slug: changes.slug,
            fulfillment_sync_product_id: changes.fulfillment_sync_product_id,
            updated_at: Utc::now(),
        };
        diesel::update(products::table.find(id))
            .set(&changeset)
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()
            .map_err(map_write_error)?
            .map(Product::try_from)
            .transpose()
    }

    fn delete(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        diesel::delete(products::table.find(id))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?
            .map(Product::try_from)
            .transpose()
    }
}
