//! Indicator catalogue command.

use anyhow::Result;
use stockta_config::AppConfig;
use stockta_indicators::IndicatorEngine;

pub async fn run(config: &AppConfig) -> Result<()> {
    let engine = IndicatorEngine::new(config.engine.to_engine_settings());

    println!("Indicator Catalogue");
    println!("═══════════════════════════════════════════════════════════");
    println!("  {:<14} {:<12} {:>12}", "field", "family", "first bar");
    println!("  ───────────────────────────────────────────────────────");

    for entry in engine.catalog() {
        println!(
            "  {:<14} {:<12} {:>12}",
            entry.field.name(),
            entry.family.to_string(),
            entry.first_index
        );
    }

    println!();
    println!("Bars before the first bar index carry no value for that field.");

    Ok(())
}
