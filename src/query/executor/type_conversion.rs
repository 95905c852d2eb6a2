// Type Conversion Utilities
//
// Fixed-point helpers and casts between values and declared column types.

use crate::common::types::MAX_PRECISION;
use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::parser::ast::DataType;

/// `10^exp`, or `None` when it does not fit in an `i128`
pub fn pow10(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

/// Number of decimal digits in the unscaled value (zero has one digit)
pub fn decimal_digits(value: i128) -> u32 {
    let mut magnitude = value.unsigned_abs();
    let mut digits = 1;
    while magnitude >= 10 {
        magnitude /= 10;
        digits += 1;
    }
    digits
}

/// Change the scale of an unscaled value, rounding half away from zero when
/// digits are dropped. `None` on overflow.
pub fn rescale_decimal(value: i128, from: u32, to: u32) -> Option<i128> {
    if to >= from {
        return value.checked_mul(pow10(to - from)?);
    }
    let divisor = pow10(from - to)?;
    Some(round_half_up(value / divisor, value % divisor, divisor))
}

fn round_half_up(quotient: i128, remainder: i128, divisor: i128) -> i128 {
    if remainder.unsigned_abs() * 2 >= divisor.unsigned_abs() {
        if (remainder < 0) == (divisor < 0) { quotient + 1 } else { quotient - 1 }
    } else {
        quotient
    }
}

pub fn decimal_to_f64(value: i128, scale: u32) -> f64 {
    value as f64 / 10f64.powi(scale as i32)
}

/// Divide `l * 10^-ls` by `r * 10^-rs`, producing an unscaled result at
/// `target_scale`, rounded half away from zero
pub fn divide_decimal(l: i128, ls: u32, r: i128, rs: u32, target_scale: u32) -> QueryResult<i128> {
    if r == 0 {
        return Err(QueryError::DivisionByZero);
    }
    let exp = target_scale as i64 + rs as i64 - ls as i64;
    let (numerator, denominator) = if exp >= 0 {
        let factor = pow10(exp as u32).ok_or(QueryError::NumericOverflow)?;
        (l.checked_mul(factor).ok_or(QueryError::NumericOverflow)?, r)
    } else {
        let factor = pow10((-exp) as u32).ok_or(QueryError::NumericOverflow)?;
        (l, r.checked_mul(factor).ok_or(QueryError::NumericOverflow)?)
    };
    let quotient = numerator.checked_div(denominator).ok_or(QueryError::NumericOverflow)?;
    let remainder = numerator.checked_rem(denominator).ok_or(QueryError::NumericOverflow)?;
    Ok(round_half_up(quotient, remainder, denominator))
}

/// Fail if the value carries more digits than `max_length` allows
pub fn check_precision(value: i128, max_length: Option<u32>) -> QueryResult<()> {
    match max_length {
        Some(max) if decimal_digits(value) > max => Err(QueryError::NumericOverflow),
        _ => Ok(()),
    }
}

/// Cast a value to a declared type. NULL casts to NULL.
pub fn cast_to_type(value: DataValue, target: &DataType) -> QueryResult<DataValue> {
    match (value, target) {
        (DataValue::Null, _) => Ok(DataValue::Null),

        (DataValue::Integer(i), DataType::Integer) => {
            i32::try_from(i).map_err(|_| QueryError::NumericOverflow)?;
            Ok(DataValue::Integer(i))
        }
        (DataValue::Integer(i), DataType::BigInt) => Ok(DataValue::Integer(i)),
        (DataValue::Decimal { value, scale }, DataType::Integer | DataType::BigInt) => {
            let truncated = value / pow10(scale).ok_or(QueryError::NumericOverflow)?;
            let int = i64::try_from(truncated).map_err(|_| QueryError::NumericOverflow)?;
            cast_to_type(DataValue::Integer(int), target)
        }

        (value @ (DataValue::Integer(_) | DataValue::Decimal { .. }), DataType::Decimal { precision, scale }) => {
            let Some((unscaled, from)) = value.as_decimal() else {
                return Err(QueryError::TypeError(format!("{:?} is not an exact numeric", value)));
            };
            let to = scale.unwrap_or(from).min(MAX_PRECISION);
            let rescaled = rescale_decimal(unscaled, from, to).ok_or(QueryError::NumericOverflow)?;
            check_precision(rescaled, *precision)?;
            Ok(DataValue::Decimal { value: rescaled, scale: to })
        }

        (value @ (DataValue::Integer(_) | DataValue::Decimal { .. } | DataValue::Float(_)), DataType::Double) => {
            // as_f64 covers every numeric variant matched above
            Ok(DataValue::Float(value.as_f64().unwrap_or(f64::NAN)))
        }

        (DataValue::Text(s), DataType::Varchar) => Ok(DataValue::Text(s)),
        (DataValue::Boolean(b), DataType::Boolean) => Ok(DataValue::Boolean(b)),

        (value, target) => Err(QueryError::TypeError(format!("Cannot cast {:?} to {}", value, target))),
    }
}
