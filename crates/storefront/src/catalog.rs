//! Product catalog loaded from a JSON file at startup.
//!
//! The listing page renders from it, and "add to cart" resolves posted
//! product IDs against it so the cart never trusts client-supplied prices.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use sleep_outside_core::{Price, ProductId};

/// A product offered in the listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub color_name: Option<String>,
}

impl Product {
    /// Price for display.
    #[must_use]
    pub fn display_price(&self) -> Price {
        Price::usd(self.price)
    }
}

/// Errors raised while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Duplicate product id: {0}")]
    DuplicateId(ProductId),
}

/// Immutable product list, cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
    index: Arc<HashMap<ProductId, usize>>,
}

impl Catalog {
    /// Load products from a JSON array on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a product array,
    /// or repeats an ID.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Io(format!("{}: {e}", path.display())))?;
        let products: Vec<Product> =
            serde_json::from_str(&text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let catalog = Self::from_products(products)?;
        tracing::info!(products = catalog.len(), path = %path.display(), "Catalog loaded");
        Ok(catalog)
    }

    /// Build a catalog from products, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two products share an ID.
    pub fn from_products(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if index.insert(product.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }
        Ok(Self {
            products: Arc::new(products),
            index: Arc::new(index),
        })
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.index
            .get(id)
            .and_then(|position| self.products.get(*position))
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"id":"880RR","name":"Marmot Ajax Tent","brand":"Marmot","price":199.99,
         "image":"/images/tents/marmot-ajax.jpg","colorName":"Pale Pumpkin"},
        {"id":"985RF","name":"The North Face Talus Tent","price":"199.99"}
    ]"#;

    fn sample() -> Catalog {
        Catalog::from_products(serde_json::from_str(SAMPLE).unwrap()).unwrap()
    }

    #[test]
    fn test_lookup_by_id() {
        let catalog = sample();
        let id = ProductId::parse("985RF").unwrap();
        let product = catalog.get(&id).unwrap();
        assert_eq!(product.name, "The North Face Talus Tent");
        assert_eq!(product.brand, "");
        assert!(product.image.is_none());
        assert_eq!(product.display_price().display(), "$199.99");
    }

    #[test]
    fn test_keeps_file_order() {
        let catalog = sample();
        let ids: Vec<&str> = catalog.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["880RR", "985RF"]);
    }

    #[test]
    fn test_reads_color_name() {
        let catalog = sample();
        let product = catalog.get(&ProductId::parse("880RR").unwrap()).unwrap();
        assert_eq!(product.color_name.as_deref(), Some("Pale Pumpkin"));
    }

    #[test]
    fn test_unknown_id() {
        assert!(sample().get(&ProductId::parse("nope").unwrap()).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let products: Vec<Product> =
            serde_json::from_str(r#"[{"id":"A","name":"a","price":1},{"id":"A","name":"b","price":2}]"#)
                .unwrap();
        assert!(matches!(
            Catalog::from_products(products),
            Err(CatalogError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = Catalog::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("content/products.json");
        let catalog = Catalog::from_path(&path).unwrap();
        assert!(!catalog.is_empty());
    }

    #[test]
    fn test_bundled_images_are_shipped() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let catalog = Catalog::from_path(&root.join("content/products.json")).unwrap();

        let mut images: Vec<&str> = catalog
            .products()
            .iter()
            .filter_map(|product| product.image.as_deref())
            .collect();
        images.push(crate::cart::PLACEHOLDER_IMAGE);

        for image in images {
            let file = root.join("static").join(image.trim_start_matches('/'));
            assert!(file.is_file(), "missing {}", file.display());
        }
    }
}
