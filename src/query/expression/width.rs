// Numeric Width Propagation
//
// Precision and scale inference for arithmetic. Each rule combines the
// accumulated width of the operands folded so far with the next operand.

use serde::{Deserialize, Serialize};

use crate::common::types::MAX_PRECISION;

/// Precision (`max_length`) and scale attached to a numeric expression.
///
/// `None` in either field means no fixed-point constraint applies. Once an
/// operand is unconstrained, every width derived from it is too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NumericWidth {
    pub max_length: Option<u32>,
    pub scale: Option<u32>,
}

impl NumericWidth {
    pub const UNCONSTRAINED: NumericWidth = NumericWidth {
        max_length: None,
        scale: None,
    };

    /// Width of a result whose operands carried no usable constraint
    pub const SATURATED: NumericWidth = NumericWidth {
        max_length: Some(MAX_PRECISION),
        scale: None,
    };

    pub const fn new(max_length: Option<u32>, scale: Option<u32>) -> Self {
        NumericWidth { max_length, scale }
    }

    pub const fn fixed(max_length: u32, scale: u32) -> Self {
        NumericWidth {
            max_length: Some(max_length),
            scale: Some(scale),
        }
    }

    /// Both fields as signed integers, when both are set
    fn resolved(self) -> Option<(i64, i64)> {
        Some((self.max_length? as i64, self.scale? as i64))
    }

    fn combine(self, rhs: NumericWidth, rule: impl FnOnce(i64, i64, i64, i64) -> (i64, i64)) -> NumericWidth {
        match (self.resolved(), rhs.resolved()) {
            (Some((lp, ls)), Some((rp, rs))) => {
                let (precision, scale) = rule(lp, ls, rp, rs);
                NumericWidth::fixed(clamp(precision), clamp(scale))
            }
            _ => NumericWidth::SATURATED,
        }
    }

    pub fn divide(self, rhs: NumericWidth) -> NumericWidth {
        let max = MAX_PRECISION as i64;
        self.combine(rhs, |lp, ls, rp, rs| {
            let scale = (max - lp + ls - rs).max(0).min(max);
            (scale + lp - ls + rp, scale)
        })
    }

    pub fn add(self, rhs: NumericWidth) -> NumericWidth {
        self.combine(rhs, |lp, ls, rp, rs| {
            let scale = ls.max(rs);
            ((lp - ls).max(rp - rs) + scale + 1, scale)
        })
    }

    pub fn subtract(self, rhs: NumericWidth) -> NumericWidth {
        self.add(rhs)
    }

    pub fn multiply(self, rhs: NumericWidth) -> NumericWidth {
        self.combine(rhs, |lp, ls, rp, rs| (lp + rp, ls + rs))
    }
}

fn clamp(value: i64) -> u32 {
    value.clamp(0, MAX_PRECISION as i64) as u32
}
