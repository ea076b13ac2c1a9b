// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// HARVEST - CORE MODULE
//
// Shared primitives for the token-sale and profit-distribution engines:
// error taxonomy, role checks against the eligibility registry, the holder
// ledger and base-currency bank collaborators, the transactional host, and
// TOML configuration. All amounts are u128 atomic units (no floating-point).
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub mod bank;
pub mod config;
pub mod error;
pub mod holders;
pub mod host;
pub mod ledger;
pub mod math;
pub mod roles;

pub use bank::NativeBank;
pub use config::{DistributorConfig, HarvestConfig, SaleConfig};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use holders::HolderSet;
pub use host::{CallContext, Host};
pub use ledger::{HolderLedger, TokenLedger};
pub use roles::{authorize, require_registered, EligibilityGate, Registry, Role};

/// Largest representable amount. A distribution funded with this value is
/// treated as a sentinel ("unlimited" approval) and rejected.
pub const AMOUNT_CEILING: u128 = u128::MAX;

// ─────────────────────────────────────────────────────────────
// u128 ↔ String serialization (JSON doesn't support 128-bit integers)
// ─────────────────────────────────────────────────────────────

pub mod u128_str {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(val: &u128, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&val.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u128, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(serde::de::Error::custom)
    }
}

/// `Vec<u128>` as a list of decimal strings.
pub mod u128_vec_str {
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(vals: &[u128], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(vals.iter().map(|v| v.to_string()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u128>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        raw.iter()
            .map(|s| s.parse::<u128>().map_err(serde::de::Error::custom))
            .collect()
    }
}
