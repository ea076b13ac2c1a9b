// SPDX-License-Identifier: AGPL-3.0-only
//! # Eligibility Gate
//!
//! The engine never decides whether an address may participate; it asks an
//! [`EligibilityGate`]. Privileged entry points declare the minimal [`Role`]
//! they need and check it with [`authorize`].
//!
//! ```text
//!   Owner  ──satisfies──▶ Manager ──satisfies──▶ Operator
//!   (engine-local)        (gate role)            (gate role)
//! ```
//!
//! [`Registry`] is the in-process reference gate used by tests, the CLI
//! simulator and light tooling.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Engine owner. Held per engine instance, never granted by the gate.
    Owner,
    Manager,
    Operator,
}

/// Read surface of the external registry.
pub trait EligibilityGate {
    fn is_registered(&self, addr: &str) -> bool;
    fn is_special(&self, addr: &str) -> bool;
    fn has_role(&self, addr: &str, role: Role) -> bool;
}

/// Capability check with the `Owner > Manager > Operator` hierarchy.
pub fn authorize(
    gate: &dyn EligibilityGate,
    owner: &str,
    caller: &str,
    required: Role,
) -> EngineResult<()> {
    if caller == owner {
        return Ok(());
    }
    let allowed = match required {
        Role::Owner => false,
        Role::Manager => gate.has_role(caller, Role::Manager),
        Role::Operator => {
            gate.has_role(caller, Role::Operator) || gate.has_role(caller, Role::Manager)
        }
    };
    if allowed {
        Ok(())
    } else {
        log::warn!("rejected {:?} call from {}", required, caller);
        Err(EngineError::Unauthorized {
            caller: caller.to_string(),
            required,
        })
    }
}

pub fn require_registered(gate: &dyn EligibilityGate, addr: &str) -> EngineResult<()> {
    if gate.is_registered(addr) {
        Ok(())
    } else {
        Err(EngineError::Eligibility(addr.to_string()))
    }
}

// ─────────────────────────────────────────────────────────────
// REFERENCE REGISTRY
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    pub owner: String,
    registered: BTreeSet<String>,
    special: BTreeSet<String>,
    roles: BTreeMap<String, BTreeSet<Role>>,
}

impl Registry {
    pub fn new(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            registered: BTreeSet::new(),
            special: BTreeSet::new(),
            roles: BTreeMap::new(),
        }
    }

    fn ensure_owner(&self, caller: &str) -> Result<(), String> {
        if caller != self.owner {
            return Err(format!("Registry: {} is not the registry owner", caller));
        }
        Ok(())
    }

    pub fn register(&mut self, caller: &str, addr: &str) -> Result<(), String> {
        self.ensure_owner(caller)?;
        if addr.is_empty() {
            return Err("Registry: address is empty".to_string());
        }
        self.registered.insert(addr.to_string());
        Ok(())
    }

    /// Removing registration does not touch balances or holder sets.
    pub fn unregister(&mut self, caller: &str, addr: &str) -> Result<(), String> {
        self.ensure_owner(caller)?;
        self.registered.remove(addr);
        Ok(())
    }

    pub fn set_special(&mut self, caller: &str, addr: &str, special: bool) -> Result<(), String> {
        self.ensure_owner(caller)?;
        if special {
            self.special.insert(addr.to_string());
        } else {
            self.special.remove(addr);
        }
        Ok(())
    }

    pub fn grant_role(&mut self, caller: &str, addr: &str, role: Role) -> Result<(), String> {
        self.ensure_owner(caller)?;
        if role == Role::Owner {
            return Err("Registry: Owner is not a grantable role".to_string());
        }
        self.roles.entry(addr.to_string()).or_default().insert(role);
        Ok(())
    }

    pub fn revoke_role(&mut self, caller: &str, addr: &str, role: Role) -> Result<(), String> {
        self.ensure_owner(caller)?;
        if let Some(set) = self.roles.get_mut(addr) {
            set.remove(&role);
        }
        Ok(())
    }
}

impl EligibilityGate for Registry {
    fn is_registered(&self, addr: &str) -> bool {
        self.registered.contains(addr)
    }

    fn is_special(&self, addr: &str) -> bool {
        self.special.contains(addr)
    }

    fn has_role(&self, addr: &str, role: Role) -> bool {
        self.roles.get(addr).is_some_and(|r| r.contains(&role))
    }
}
