use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A product page to watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductTarget {
    /// Display name used in logs, notifications and artifact file names.
    pub name: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductsFile {
    pub products: Vec<ProductTarget>,
}

impl ProductsFile {
    /// Find a product by name, ignoring case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&ProductTarget> {
        let key = name_key(name);
        self.products.iter().find(|p| name_key(&p.name) == key)
    }
}

/// Case-folded form under which product names are compared.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Load and validate the products file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_products(path: &Path) -> Result<ProductsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProductsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_products(&content)
}

fn parse_products(content: &str) -> Result<ProductsFile, ConfigError> {
    let products_file: ProductsFile =
        serde_yaml::from_str(content).map_err(ConfigError::ProductsFileParse)?;

    validate_products(&products_file)?;

    Ok(products_file)
}

fn validate_products(products_file: &ProductsFile) -> Result<(), ConfigError> {
    if products_file.products.is_empty() {
        return Err(ConfigError::Validation(
            "at least one product must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for product in &products_file.products {
        if product.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "product name must be non-empty".to_string(),
            ));
        }

        let url = product.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "product '{}' has invalid url '{}'; must start with http:// or https://",
                product.name, product.url
            )));
        }

        if !seen_names.insert(name_key(&product.name)) {
            return Err(ConfigError::Validation(format!(
                "duplicate product name: '{}'",
                product.name
            )));
        }
    }

    Ok(())
}
