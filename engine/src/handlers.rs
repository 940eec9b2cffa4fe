//! Command handlers
//!
//! Implementation of the `serve` and `doctor` subcommands.

use crate::api;
use crate::catalog::{load_products, load_script, script_path};
use crate::config::Config;
use crate::llm::gemini::GeminiProvider;
use crate::llm::LLMProvider;
use crate::secrets::scrub_secrets;
use crate::state::AppState;
use anyhow::{Context, Result};
use sdk::errors::{EngineError, RoleplayErrorExt};
use sdk::types::Role;
use serde_json::json;

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Run the HTTP server until Ctrl-C
pub async fn handle_serve(
    config: &Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);

    let state = AppState::from_config(config);
    tracing::info!(
        products = state.catalog.len(),
        transcript_scope = ?state.transcript.scope(),
        "Application state initialized"
    );

    api::serve(state, &addr, shutdown_signal())
        .await
        .with_context(|| format!("Failed to serve on {}", addr))?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Run diagnostics on configuration, data files and the model credential
///
/// Problems are reported, not returned as errors; the server itself tolerates
/// all of them at runtime.
pub async fn handle_doctor(config: &Config, ping: bool, format: OutputFormat) -> Result<()> {
    let mut issues = Vec::new();
    let mut checks: Vec<(String, String)> = Vec::new();

    // Configuration was validated when loaded
    checks.push(("Configuration".to_string(), "Valid".to_string()));
    checks.push(("Bind address".to_string(), config.bind_addr()));
    checks.push(("Model".to_string(), config.llm.gemini.model.clone()));
    checks.push((
        "Transcript scope".to_string(),
        format!("{:?}", config.transcript.scope).to_lowercase(),
    ));

    // Product catalog
    match load_products(&config.data.products_json, &config.data.products_csv) {
        Ok(products) if products.is_empty() => {
            checks.push(("Product catalog".to_string(), "Empty".to_string()));
            issues.push(format!(
                "No products found in {} or {}",
                config.data.products_json.display(),
                config.data.products_csv.display()
            ));
        }
        Ok(products) => {
            checks.push((
                "Product catalog".to_string(),
                format!("{} products", products.len()),
            ));
        }
        Err(e) => {
            checks.push(("Product catalog".to_string(), "Failed".to_string()));
            issues.push(format!("{} ({})", e, e.user_hint()));
        }
    }

    // Role scripts
    for role in Role::ALL {
        let label = format!("{} script", role);
        match load_script(&config.data.script_dir, role) {
            Ok(script) if script.is_empty() => {
                checks.push((label, "Not found".to_string()));
                issues.push(format!(
                    "No script at {}",
                    script_path(&config.data.script_dir, role).display()
                ));
            }
            Ok(script) => checks.push((label, format!("{} lines", script.lines.len()))),
            Err(e) => {
                checks.push((label, "Failed".to_string()));
                issues.push(format!("{} ({})", e, e.user_hint()));
            }
        }
    }

    // Credential
    let provider = GeminiProvider::from_env(config.llm.gemini.clone());
    if provider.check_health().await {
        checks.push(("Gemini API key".to_string(), "Configured".to_string()));
    } else {
        checks.push(("Gemini API key".to_string(), "Not configured".to_string()));
        issues.push(format!(
            "Set {} to enable generation",
            config.llm.gemini.api_key_env
        ));
    }

    if ping {
        match provider.generate_text("Reply with the single word: ok").await {
            Ok(_) => checks.push(("Gemini request".to_string(), "OK".to_string())),
            Err(e) => {
                checks.push(("Gemini request".to_string(), "Failed".to_string()));
                let err = EngineError::LLMProvider(scrub_secrets(&e.to_string()));
                issues.push(format!("{} ({})", err, err.user_hint()));
            }
        }
    }

    match format {
        OutputFormat::Text => {
            println!("Roleplay Diagnostics");
            println!("====================");
            println!();

            for (check, status) in &checks {
                println!("  {:<20} {}", format!("{}:", check), status);
            }

            println!();

            if issues.is_empty() {
                println!("✓ All checks passed!");
            } else {
                println!("⚠ Issues found:");
                println!();
                for (i, issue) in issues.iter().enumerate() {
                    println!("  {}. {}", i + 1, issue);
                }
            }
        }
        OutputFormat::Json => {
            let output = json!({
                "checks": checks.iter().map(|(name, status)| {
                    json!({
                        "name": name,
                        "status": status
                    })
                }).collect::<Vec<_>>(),
                "issues": issues,
                "healthy": issues.is_empty()
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
