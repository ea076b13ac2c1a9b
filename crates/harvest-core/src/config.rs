// SPDX-License-Identifier: AGPL-3.0-only
//! Deployment configuration for a sale and its distributor, stored as TOML.
//!
//! ```toml
//! [sale]
//! sale_address = "HRVsale"
//! start_time = 1_800_000_000
//! max_cap = "1000000000000"
//! # ...
//!
//! [distributor]
//! address = "HRVdistributor"
//! owner = "HRVowner"
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::Path;

/// Environment variable naming the config file for `load_from_env`.
pub const CONFIG_ENV_VAR: &str = "HARVEST_CONFIG";

/// Serde adapter for u128: serialize as string, deserialize from string or integer.
/// TOML has no native u128, so amounts round-trip through strings. JSON
/// integers above `u64::MAX` arrive as floats and are rejected; write them
/// as strings.
pub mod u128_flex {
    use super::*;

    pub fn serialize<S: Serializer>(val: &u128, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u128, D::Error> {
        use serde::de::{self, Visitor};
        struct U128Visitor;

        impl<'de> Visitor<'de> for U128Visitor {
            type Value = u128;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a u128 as a string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<u128, E> {
                v.replace('_', "").parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<u128, E> {
                Ok(v as u128)
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<u128, E> {
                Ok(v)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<u128, E> {
                Err(E::custom(format!(
                    "amount {} is not an exact integer; quote amounts above {} as strings",
                    v,
                    u64::MAX
                )))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<u128, E> {
                if v >= 0 {
                    Ok(v as u128)
                } else {
                    Err(E::custom("negative value for u128"))
                }
            }
        }

        d.deserialize_any(U128Visitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleConfig {
    /// Account the sale acts as (token ledger minter, approval spender)
    pub sale_address: String,
    /// Escrow account holding contributions until finalization
    pub vault_address: String,
    pub owner: String,
    /// Success destination for escrowed funds
    pub wallet: String,
    /// Ledger the sale mints into
    pub token_ledger: String,
    /// Ledger of the secondary purchase unit
    pub secondary_ledger: String,
    pub start_time: u64,
    pub end_time: u64,
    /// Soft cap, destination-token units
    #[serde(with = "u128_flex")]
    pub min_cap: u128,
    /// Hard cap, destination-token units
    #[serde(with = "u128_flex")]
    pub max_cap: u128,
    /// Tokens per base-currency unit
    #[serde(with = "u128_flex")]
    pub base_rate: u128,
    /// Tokens per secondary unit
    #[serde(with = "u128_flex")]
    pub secondary_rate: u128,
    /// Minimum purchase, expressed in base-currency units
    #[serde(default, with = "u128_flex")]
    pub min_purchase_base: u128,
    /// Fixed management allocation minted once by the owner
    #[serde(default, with = "u128_flex")]
    pub managed_allocation: u128,
    #[serde(default)]
    pub management_wallet: String,
}

impl SaleConfig {
    pub fn validate(&self) -> Result<(), String> {
        let addresses = [
            ("sale_address", &self.sale_address),
            ("vault_address", &self.vault_address),
            ("owner", &self.owner),
            ("wallet", &self.wallet),
            ("token_ledger", &self.token_ledger),
            ("secondary_ledger", &self.secondary_ledger),
        ];
        for (name, value) in addresses {
            if value.is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
        }
        if self.sale_address == self.vault_address {
            return Err("sale_address and vault_address must differ".to_string());
        }
        if self.start_time >= self.end_time {
            return Err(format!(
                "start_time {} must be before end_time {}",
                self.start_time, self.end_time
            ));
        }
        if self.base_rate == 0 || self.secondary_rate == 0 {
            return Err("Rates must be > 0".to_string());
        }
        if self.max_cap == 0 {
            return Err("max_cap must be > 0".to_string());
        }
        if self.min_cap > self.max_cap {
            return Err(format!(
                "min_cap {} exceeds max_cap {}",
                self.min_cap, self.max_cap
            ));
        }
        if self.managed_allocation > 0 && self.management_wallet.is_empty() {
            return Err("management_wallet required for a managed allocation".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributorConfig {
    /// Account holding pull credits until withdrawn
    pub address: String,
    pub owner: String,
}

impl DistributorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.address.is_empty() {
            return Err("distributor address cannot be empty".to_string());
        }
        if self.owner.is_empty() {
            return Err("distributor owner cannot be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestConfig {
    pub sale: SaleConfig,
    pub distributor: DistributorConfig,
}

impl HarvestConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config: HarvestConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from the file named by `HARVEST_CONFIG`.
    pub fn load_from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let path = std::env::var(CONFIG_ENV_VAR)
            .map_err(|_| format!("{} not set", CONFIG_ENV_VAR))?;
        Self::load_from_file(Path::new(&path))
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.sale.validate()?;
        self.distributor.validate()?;
        if self.distributor.address == self.sale.vault_address
            || self.distributor.address == self.sale.sale_address
        {
            return Err("distributor address must not reuse a sale account".to_string());
        }
        Ok(())
    }
}
