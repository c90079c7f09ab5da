use crate::settings::{load_config, Overrides};
use crate::ui;
use anyhow::Result;
use bridge_core::Table;
use colored::Colorize;
use std::path::PathBuf;

pub async fn execute(config_file: PathBuf, overrides: Overrides) -> Result<()> {
    ui::print_header("Validating Config");
    println!("File: {}", config_file.display());

    match load_config(Some(&config_file), &overrides).await {
        Ok(config) => {
            println!("\n{}", "✓ Config is valid!".green().bold());
            println!("\nBridge Settings:");
            println!("  Store: {}", config.source.url);
            for table in Table::ALL {
                println!(
                    "  {} table: {}",
                    table.description(),
                    config.source.table_name(table)
                );
            }
            println!("  Order column: {}", config.source.order_column);
            println!("  Listen: {}", config.exposition.listen);
            println!("  Refresh interval: {:?}", config.refresh.interval);

            if config.refresh.interval < config.source.fetch_timeout * 2 {
                ui::print_warning(
                    "Refresh interval is shorter than two fetch timeouts; slow cycles will drop ticks",
                );
            }

            Ok(())
        }
        Err(e) => {
            println!("\n{}", "✗ Config is invalid!".red().bold());
            println!("\nError: {:#}", e);
            Err(e)
        }
    }
}
