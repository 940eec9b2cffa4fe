//! Catalog Loader
//!
//! Reads product records and role scripts from local files. Products come from
//! a JSON array when `products.json` exists, otherwise from a CSV table with a
//! header row. Scripts are one plain-text file per role
//! (`seller_script.txt`, `buyer_script.txt`).
//!
//! Load failures never propagate out of [`Catalog`]: they are logged and the
//! affected data stays empty. The loose functions return `EngineError` so the
//! `doctor` command can report exactly what went wrong.

use crate::config::DataConfig;
use sdk::errors::EngineError;
use sdk::types::{Price, ProductRecord, Role, RoleScript};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Load product records, preferring the JSON source over the CSV one
///
/// Returns an empty list when neither file exists.
pub fn load_products(json_path: &Path, csv_path: &Path) -> Result<Vec<ProductRecord>, EngineError> {
    if json_path.exists() {
        let contents = fs::read_to_string(json_path).map_err(|e| {
            EngineError::CatalogLoad(format!("Failed to read {}: {}", json_path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            EngineError::CatalogLoad(format!("Failed to parse {}: {}", json_path.display(), e))
        })
    } else if csv_path.exists() {
        let file = fs::File::open(csv_path).map_err(|e| {
            EngineError::CatalogLoad(format!("Failed to read {}: {}", csv_path.display(), e))
        })?;
        parse_csv_products(file).map_err(|e| {
            EngineError::CatalogLoad(format!("Failed to parse {}: {}", csv_path.display(), e))
        })
    } else {
        tracing::debug!(
            json = %json_path.display(),
            csv = %csv_path.display(),
            "No product source found"
        );
        Ok(Vec::new())
    }
}

/// Parse a CSV product table; columns other than name/price/description are ignored
fn parse_csv_products<R: Read>(reader: R) -> Result<Vec<ProductRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (name_col, price_col, desc_col) = (column("name"), column("price"), column("description"));

    let mut products = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |col: Option<usize>| col.and_then(|i| row.get(i)).map(String::from);
        products.push(ProductRecord {
            name: field(name_col),
            price: field(price_col).map(Price::Text),
            description: field(desc_col),
        });
    }

    Ok(products)
}

/// Path of the script file for `role` inside `dir`
pub fn script_path(dir: &Path, role: Role) -> PathBuf {
    dir.join(format!("{}_script.txt", role))
}

/// Load one role's script; a missing file yields an empty script
pub fn load_script(dir: &Path, role: Role) -> Result<RoleScript, EngineError> {
    let path = script_path(dir, role);
    if !path.exists() {
        return Ok(RoleScript::default());
    }

    fs::read_to_string(&path)
        .map(|text| RoleScript::from_text(&text))
        .map_err(|e| EngineError::ScriptLoad {
            role: role.to_string(),
            reason: e.to_string(),
        })
}

/// Load every role's script, logging and skipping the ones that fail
pub fn load_scripts(dir: &Path) -> HashMap<Role, RoleScript> {
    Role::ALL
        .into_iter()
        .map(|role| {
            let script = load_script(dir, role).unwrap_or_else(|e| {
                tracing::error!(role = %role, error = %e, "Error loading role script");
                RoleScript::default()
            });
            (role, script)
        })
        .collect()
}

/// Process-scoped catalog state
///
/// Products can be reloaded while the server runs; scripts are read once.
pub struct Catalog {
    sources: DataConfig,
    products: RwLock<Vec<ProductRecord>>,
    scripts: HashMap<Role, RoleScript>,
}

impl Catalog {
    /// Load products and scripts from the configured files
    pub fn load(sources: DataConfig) -> Self {
        let scripts = load_scripts(&sources.script_dir);
        let catalog = Self {
            sources,
            products: RwLock::new(Vec::new()),
            scripts,
        };
        catalog.reload();
        catalog
    }

    /// Build a catalog from in-memory data; `reload` still reads `sources`
    pub fn from_parts(
        sources: DataConfig,
        products: Vec<ProductRecord>,
        scripts: HashMap<Role, RoleScript>,
    ) -> Self {
        Self {
            sources,
            products: RwLock::new(products),
            scripts,
        }
    }

    /// Re-read the product source
    ///
    /// On failure the error is logged and the current products are kept.
    /// Returns the number of products held afterwards.
    pub fn reload(&self) -> usize {
        match load_products(&self.sources.products_json, &self.sources.products_csv) {
            Ok(products) => {
                let count = products.len();
                *self.products.write().expect("catalog lock poisoned") = products;
                tracing::info!(products = count, "Product catalog loaded");
                count
            }
            Err(e) => {
                tracing::error!(error = %e, "Error loading product data");
                self.len()
            }
        }
    }

    /// Reload only when no products are held
    pub fn ensure_loaded(&self) {
        if self.is_empty() {
            tracing::debug!("Product catalog empty, attempting reload");
            self.reload();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.products.read().expect("catalog lock poisoned").len()
    }

    /// All products in source order
    pub fn products(&self) -> Vec<ProductRecord> {
        self.products.read().expect("catalog lock poisoned").clone()
    }

    /// The first `limit` products in source order
    pub fn excerpt(&self, limit: usize) -> Vec<ProductRecord> {
        self.products
            .read()
            .expect("catalog lock poisoned")
            .iter()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Script lines for `role`; empty when none were loaded
    pub fn script(&self, role: Role) -> &[String] {
        self.scripts
            .get(&role)
            .map(|script| script.lines.as_slice())
            .unwrap_or(&[])
    }
}
