use crate::{print_info, print_success};
use colored::*;
use harvest_core::HarvestConfig;
use std::path::Path;

pub fn handle(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    print_info(&format!("Validating {}...", path.display()));
    let config = HarvestConfig::load_from_file(path)?;

    config
        .validate()
        .map_err(|e| format!("Invalid config: {}", e))?;

    let sale = &config.sale;
    println!();
    println!("{} {}", "Sale:".bold(), sale.sale_address.green());
    println!("{} {}", "Vault:".bold(), sale.vault_address);
    println!("{} {}", "Owner:".bold(), sale.owner);
    println!(
        "{} [{}, {})",
        "Window:".bold(),
        sale.start_time,
        sale.end_time
    );
    println!(
        "{} min {} / max {} tokens",
        "Caps:".bold(),
        sale.min_cap.to_string().cyan(),
        sale.max_cap.to_string().cyan()
    );
    println!(
        "{} base × {}, secondary × {}",
        "Rates:".bold(),
        sale.base_rate,
        sale.secondary_rate
    );
    if sale.managed_allocation > 0 {
        println!(
            "{} {} → {}",
            "Managed:".bold(),
            sale.managed_allocation,
            sale.management_wallet
        );
    }
    println!(
        "{} {}",
        "Distributor:".bold(),
        config.distributor.address.green()
    );
    println!();
    print_success("Config is valid");
    Ok(())
}
