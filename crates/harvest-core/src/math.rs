// SPDX-License-Identifier: AGPL-3.0-only
//! Integer helpers shared by the sale and distribution engines.
//!
//! Pure integer math, floor rounding. An intermediate product that does not
//! fit in `u128` is an error; nothing here clamps, saturates or falls back
//! to divide-first precision loss.

use crate::error::{EngineError, EngineResult};

/// `a × b`, rejecting overflow.
pub fn checked_product(a: u128, b: u128, what: &str) -> EngineResult<u128> {
    a.checked_mul(b).ok_or_else(|| EngineError::overflow(what))
}

/// `floor(a × b / d)`. The product is checked before dividing.
pub fn mul_div_floor(a: u128, b: u128, d: u128) -> EngineResult<u128> {
    if d == 0 {
        return Err(EngineError::Arithmetic("division by zero".to_string()));
    }
    let product = checked_product(a, b, "profit × balance")?;
    Ok(product / d)
}

/// `a + b`, rejecting overflow.
pub fn checked_sum(a: u128, b: u128, what: &str) -> EngineResult<u128> {
    a.checked_add(b).ok_or_else(|| EngineError::overflow(what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_mul_div_floor_rounds_down() {
        assert_eq!(mul_div_floor(10, 1, 3).unwrap(), 3);
        assert_eq!(mul_div_floor(4, 2, 4).unwrap(), 2);
        assert_eq!(mul_div_floor(0, 5, 7).unwrap(), 0);
    }

    #[test]
    fn test_mul_div_floor_rejects_overflowing_product() {
        // Result would fit (MAX × 2 / 2 = MAX) but the product does not.
        let err = mul_div_floor(u128::MAX, 2, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Arithmetic);
    }

    #[test]
    fn test_zero_divisor() {
        assert!(mul_div_floor(1, 1, 0).is_err());
    }

    #[test]
    fn test_checked_sum() {
        assert_eq!(checked_sum(1, 2, "x").unwrap(), 3);
        assert!(checked_sum(u128::MAX, 1, "x").is_err());
    }
}
