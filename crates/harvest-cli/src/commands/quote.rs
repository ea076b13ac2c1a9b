use crate::{parse_amount, print_info, print_success};
use colored::*;
use harvest_core::{HarvestConfig, Host, Registry, SaleConfig, TokenLedger};
use harvest_sale::{Quote, TokenSale};
use std::path::Path;

/// Minimal host carrying just the two ledgers a sale needs to deploy.
pub fn dry_run_host(sale: &SaleConfig) -> Result<Host, String> {
    let mut host = Host::new(Registry::new(&sale.owner));
    host.add_ledger(TokenLedger::new(&sale.token_ledger, "SALE", &sale.sale_address, 0)?)?;
    host.add_ledger(TokenLedger::new(&sale.secondary_ledger, "SEC", &sale.owner, 0)?)?;
    Ok(host)
}

pub fn quote(
    sale: &SaleConfig,
    base: Option<&str>,
    secondary: Option<&str>,
) -> Result<Quote, Box<dyn std::error::Error>> {
    let host = dry_run_host(sale)?;
    let engine = TokenSale::new(sale.clone(), &host)?;
    let quote = match (base, secondary) {
        (Some(raw), None) => engine.quote_base(parse_amount(raw)?)?,
        (None, Some(raw)) => engine.quote_secondary(parse_amount(raw)?)?,
        _ => return Err("Specify exactly one of --base or --secondary".into()),
    };
    Ok(quote)
}

pub fn handle(
    path: &Path,
    base: Option<&str>,
    secondary: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = HarvestConfig::load_from_file(path)?;
    config.validate()?;
    let sale = &config.sale;

    let (currency, raw) = match (base, secondary) {
        (Some(b), _) => ("base", b),
        (_, Some(s)) => ("secondary", s),
        _ => return Err("Specify --base or --secondary".into()),
    };
    print_info(&format!("Quoting {} {} units...", raw, currency));
    let q = quote(sale, base, secondary)?;

    println!();
    println!("{} {}", "Tokens:".bold(), q.tokens.to_string().green());
    println!("{} {}", "Base equivalent:".bold(), q.base_equivalent);
    if q.base_equivalent < sale.min_purchase_base {
        println!(
            "{} below minimum purchase of {}",
            "Note:".yellow().bold(),
            sale.min_purchase_base
        );
    }
    if q.tokens > sale.max_cap {
        println!(
            "{} exceeds the hard cap of {}",
            "Note:".yellow().bold(),
            sale.max_cap
        );
    }
    println!();
    print_success("Quote complete");
    Ok(())
}
