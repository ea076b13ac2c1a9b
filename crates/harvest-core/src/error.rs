// SPDX-License-Identifier: AGPL-3.0-only
//! Engine error taxonomy.
//!
//! Every entry point either completes or returns one of these errors with
//! zero side effects. There is no internal retry.

use crate::roles::Role;
use serde::{Deserialize, Serialize};

/// Coarse classification of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller or beneficiary lacks registration or role
    Eligibility,
    /// Call outside the open sale window
    Window,
    /// Purchase would exceed the max cap
    Cap,
    /// Purchase below the minimum threshold
    Threshold,
    /// Overflow in rate conversion or share computation
    Arithmetic,
    /// Call not valid in the current lifecycle state
    State,
    /// A collaborator ledger refused a balance movement
    Transfer,
    /// Malformed argument
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Address is not registered with the eligibility gate.
    Eligibility(String),
    /// Caller does not hold the role an entry point requires.
    Unauthorized { caller: String, required: Role },
    Window(String),
    Cap { requested: u128, remaining: u128 },
    Threshold { value: u128, minimum: u128 },
    Arithmetic(String),
    State(String),
    Transfer(String),
    InvalidInput(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Eligibility(_) | EngineError::Unauthorized { .. } => {
                ErrorKind::Eligibility
            }
            EngineError::Window(_) => ErrorKind::Window,
            EngineError::Cap { .. } => ErrorKind::Cap,
            EngineError::Threshold { .. } => ErrorKind::Threshold,
            EngineError::Arithmetic(_) => ErrorKind::Arithmetic,
            EngineError::State(_) => ErrorKind::State,
            EngineError::Transfer(_) => ErrorKind::Transfer,
            EngineError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// Shorthand for an overflow in `a op b`.
    pub fn overflow(what: &str) -> Self {
        EngineError::Arithmetic(format!("{} overflows u128", what))
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            EngineError::Eligibility(addr) => write!(f, "Address not registered: {}", addr),
            EngineError::Unauthorized { caller, required } => {
                write!(f, "{} lacks required role {:?}", caller, required)
            }
            EngineError::Window(msg) => write!(f, "Sale window: {}", msg),
            EngineError::Cap {
                requested,
                remaining,
            } => write!(
                f,
                "Cap exceeded: requested {} tokens, {} remaining",
                requested, remaining
            ),
            EngineError::Threshold { value, minimum } => write!(
                f,
                "Below minimum purchase: {} < {}",
                value, minimum
            ),
            EngineError::Arithmetic(msg) => write!(f, "Arithmetic error: {}", msg),
            EngineError::State(msg) => write!(f, "Invalid state: {}", msg),
            EngineError::Transfer(msg) => write!(f, "Transfer failed: {}", msg),
            EngineError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
