//! Seed the catalog from a YAML product list.
//!
//! The file is a list of product inputs in the same shape the admin API
//! accepts:
//!
//! ```yaml
//! - name: Galaxy Black PLA
//!   type: PLA
//!   color: Galaxy Black
//!   hex: "#1B1B2F"
//!   price: "19.99"
//!   weight: 1kg
//!   stock: 40
//!   available: true
//! ```

use std::collections::HashSet;
use std::path::Path;

use tracing::{error, info};

use filament_shop_core::ProductInput;
use filament_shop_storefront::db::CatalogStore;

use super::{CliError, connect};

/// Outcome of a seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Parse and validate a product list. Every entry is checked before any is
/// written, so a bad file leaves the catalog untouched.
///
/// # Errors
///
/// Returns `CliError::Yaml` for malformed YAML, `CliError::Invalid` listing
/// every entry that fails validation.
pub fn parse_products(content: &str) -> Result<Vec<ProductInput>, CliError> {
    let products: Vec<ProductInput> = serde_yaml::from_str(content)?;

    let errors: Vec<String> = products
        .iter()
        .enumerate()
        .filter_map(|(index, product)| {
            product
                .validate()
                .err()
                .map(|e| format!("entry {} ({}): {e}", index + 1, product.name))
        })
        .collect();

    if !errors.is_empty() {
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CliError::Invalid(format!(
            "{} validation errors found",
            errors.len()
        )));
    }

    Ok(products)
}

/// Create every product whose name is not already in the catalog.
///
/// # Errors
///
/// Returns an error if listing or creating a product fails.
pub async fn apply<S: CatalogStore + ?Sized>(
    store: &S,
    products: Vec<ProductInput>,
) -> Result<SeedSummary, CliError> {
    let mut existing: HashSet<String> = store
        .list_products()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut summary = SeedSummary::default();
    for input in products {
        if existing.contains(&input.name) {
            info!(name = %input.name, "Skipping existing product");
            summary.skipped += 1;
            continue;
        }
        let product = store.create_product(input).await?;
        info!(id = %product.id, name = %product.name, stock = product.stock, "Created product");
        existing.insert(product.name);
        summary.created += 1;
    }

    Ok(summary)
}

/// Seed products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or the
/// database rejects a write.
pub async fn products(file_path: &str) -> Result<(), CliError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading products from file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: file_path.to_owned(),
            source,
        })?;
    let products = parse_products(&content)?;
    info!(products = products.len(), "Configuration validated successfully");

    let store = connect().await?;
    let summary = apply(&store, products).await?;

    info!("Seeding complete!");
    info!("  Products created: {}", summary.created);
    info!("  Products skipped (already exist): {}", summary.skipped);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use filament_shop_core::{FilamentType, Money};
    use filament_shop_storefront::db::MemoryStore;

    use super::*;

    const CATALOG: &str = r##"
- name: Galaxy Black PLA
  type: PLA
  color: Galaxy Black
  hex: "#1B1B2F"
  price: "19.99"
  weight: 1kg
  stock: 40
  available: true
- name: Clear PETG
  type: PETG
  price: "24.50"
  stock: 12
"##;

    #[test]
    fn test_parse_products_reads_api_shape() {
        let products = parse_products(CATALOG).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].filament_type, FilamentType::Pla);
        assert_eq!(products[0].price, Money::from_cents(1999));
        assert_eq!(products[1].filament_type, FilamentType::Petg);
        assert_eq!(products[1].stock, 12);
    }

    #[test]
    fn test_parse_products_rejects_any_invalid_entry() {
        let yaml = r#"
- name: Good
  price: "1.00"
- name: "  "
  price: "1.00"
"#;
        let err = parse_products(yaml).unwrap_err();
        assert!(matches!(err, CliError::Invalid(ref msg) if msg.starts_with("1 validation")));
    }

    #[tokio::test]
    async fn test_apply_skips_existing_names() {
        let store = MemoryStore::new();
        let first = apply(&store, parse_products(CATALOG).unwrap())
            .await
            .unwrap();
        assert_eq!(first, SeedSummary { created: 2, skipped: 0 });

        let second = apply(&store, parse_products(CATALOG).unwrap())
            .await
            .unwrap();
        assert_eq!(second, SeedSummary { created: 0, skipped: 2 });
        assert_eq!(store.list_products().await.unwrap().len(), 2);
    }
}
