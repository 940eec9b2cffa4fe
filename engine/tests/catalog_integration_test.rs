//! Integration tests for catalog and script loading from disk

use roleplay_engine::catalog::{load_products, load_script, Catalog};
use roleplay_engine::composer::compose_prompt;
use roleplay_engine::config::DataConfig;
use sdk::errors::EngineError;
use sdk::types::{Price, Role};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn sources(dir: &Path) -> DataConfig {
    DataConfig {
        products_json: dir.join("products.json"),
        products_csv: dir.join("products.csv"),
        script_dir: dir.to_path_buf(),
        ..DataConfig::default()
    }
}

const PRODUCTS_JSON: &str = r#"[
    {"name": "Standing Desk", "price": 499, "description": "Electric height adjustment"},
    {"name": "Monitor Arm", "price": 89.5}
]"#;

const PRODUCTS_CSV: &str = "name,price,description,sku\n\
                            Ergo Chair,289.00,Mesh back,CH-1\n\
                            Desk Lamp,25,\"Warm, dimmable LED\",LA-2\n";

#[test]
fn test_json_products_are_loaded() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.json"), PRODUCTS_JSON).unwrap();

    let catalog = Catalog::load(sources(dir.path()));
    assert_eq!(catalog.len(), 2);

    let products = catalog.products();
    assert_eq!(products[0].name.as_deref(), Some("Standing Desk"));
    assert_eq!(products[1].description, None);
    assert_eq!(products[1].render(), "- Monitor Arm ($89.5)\n  ");
}

#[test]
fn test_csv_is_used_when_json_is_absent() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.csv"), PRODUCTS_CSV).unwrap();

    let catalog = Catalog::load(sources(dir.path()));
    let products = catalog.excerpt(5);

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].price, Some(Price::Text("289.00".to_string())));
    assert_eq!(products[1].description.as_deref(), Some("Warm, dimmable LED"));
}

#[test]
fn test_json_is_preferred_over_csv() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.json"), PRODUCTS_JSON).unwrap();
    fs::write(dir.path().join("products.csv"), PRODUCTS_CSV).unwrap();

    let products = load_products(
        &dir.path().join("products.json"),
        &dir.path().join("products.csv"),
    )
    .unwrap();
    assert_eq!(products[0].name.as_deref(), Some("Standing Desk"));
}

#[test]
fn test_malformed_json_leaves_catalog_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.json"), "{ not json").unwrap();

    let err = load_products(
        &dir.path().join("products.json"),
        &dir.path().join("products.csv"),
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::CatalogLoad(_)));

    let catalog = Catalog::load(sources(dir.path()));
    assert!(catalog.is_empty());
}

#[test]
fn test_excerpt_is_limited() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.json"), PRODUCTS_JSON).unwrap();

    let catalog = Catalog::load(sources(dir.path()));
    assert_eq!(catalog.excerpt(1).len(), 1);
}

#[test]
fn test_empty_catalog_reloads_on_demand() {
    let dir = TempDir::new().unwrap();
    let catalog = Catalog::load(sources(dir.path()));
    assert!(catalog.is_empty());

    fs::write(dir.path().join("products.json"), PRODUCTS_JSON).unwrap();
    catalog.ensure_loaded();
    assert_eq!(catalog.len(), 2);
}

#[test]
fn test_loaded_catalog_is_not_reloaded() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("products.json"), PRODUCTS_JSON).unwrap();
    let catalog = Catalog::load(sources(dir.path()));

    fs::write(dir.path().join("products.json"), "[]").unwrap();
    catalog.ensure_loaded();
    assert_eq!(catalog.len(), 2);
}

#[test]
fn test_scripts_are_read_per_role() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("seller_script.txt"),
        "\n  Introduce yourself\nAsk what they need\n\n",
    )
    .unwrap();

    let catalog = Catalog::load(sources(dir.path()));
    assert_eq!(
        catalog.script(Role::Seller),
        ["Introduce yourself".to_string(), "Ask what they need".to_string()].as_slice()
    );
    assert!(catalog.script(Role::Buyer).is_empty());
}

#[test]
fn test_blank_script_keeps_empty_script_section() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("seller_script.txt"), "   \n\n").unwrap();

    let script = load_script(dir.path(), Role::Seller).unwrap();
    assert_eq!(script.lines, vec![""]);

    let catalog = Catalog::load(sources(dir.path()));
    let prompt = compose_prompt(Role::Seller, "opening", &[], catalog.script(Role::Seller), "Hi");
    assert!(
        prompt.ends_with("No product data.\n\nScript:\n\n\nUser: Hi\nRespond naturally."),
        "got {:?}",
        prompt
    );
}

#[test]
fn test_missing_script_has_no_lines() {
    let dir = TempDir::new().unwrap();
    assert!(load_script(dir.path(), Role::Buyer).unwrap().is_empty());
}

#[test]
fn test_ragged_csv_rows_are_kept() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("products.csv"),
        "name,price,description\nDesk,199,Oak desk\nLamp,25\n",
    )
    .unwrap();

    let catalog = Catalog::load(sources(dir.path()));
    let products = catalog.products();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].render(), "- Desk ($199)\n  Oak desk");
    assert_eq!(products[1].render(), "- Lamp ($25)\n  ");
}
