// Column Value Codec
//
// Order-preserving encodings for column values: comparing two encoded
// values of the same declared type byte by byte gives the same order as
// comparing the values.

use byteorder::{BigEndian, ByteOrder};

use crate::query::executor::result::{DataValue, QueryError, QueryResult};
use crate::query::executor::type_conversion::cast_to_type;
use crate::query::parser::ast::DataType;

const SIGN_32: u32 = 1 << 31;
const SIGN_64: u64 = 1 << 63;
const SIGN_128: u128 = 1 << 127;

/// Encoded width of a `DECIMAL`: scale byte plus unscaled value
pub const DECIMAL_ENCODED_LEN: usize = 17;

/// Encode a value as the bytes stored for a column of `data_type`
pub fn encode(value: &DataValue, data_type: &DataType) -> QueryResult<Vec<u8>> {
    if value.is_null() {
        return Err(QueryError::TypeError(format!("NULL has no {} encoding", data_type)));
    }
    match (cast_to_type(value.clone(), data_type)?, data_type) {
        (DataValue::Integer(i), DataType::Integer) => {
            let mut buf = vec![0; 4];
            BigEndian::write_u32(&mut buf, (i as i32 as u32) ^ SIGN_32);
            Ok(buf)
        }
        (DataValue::Integer(i), DataType::BigInt) => {
            let mut buf = vec![0; 8];
            BigEndian::write_u64(&mut buf, (i as u64) ^ SIGN_64);
            Ok(buf)
        }
        (DataValue::Float(f), DataType::Double) => {
            // -0.0 and 0.0 compare equal, so they share one encoding
            let bits = if f == 0.0 { 0.0f64.to_bits() } else { f.to_bits() };
            let sortable = if bits & SIGN_64 != 0 { !bits } else { bits ^ SIGN_64 };
            let mut buf = vec![0; 8];
            BigEndian::write_u64(&mut buf, sortable);
            Ok(buf)
        }
        (DataValue::Decimal { value, scale }, DataType::Decimal { .. }) => {
            let scale = u8::try_from(scale).map_err(|_| QueryError::NumericOverflow)?;
            let mut buf = vec![0; DECIMAL_ENCODED_LEN];
            buf[0] = scale;
            BigEndian::write_u128(&mut buf[1..], (value as u128) ^ SIGN_128);
            Ok(buf)
        }
        (DataValue::Text(s), DataType::Varchar) => Ok(s.into_bytes()),
        (DataValue::Boolean(b), DataType::Boolean) => Ok(vec![b as u8]),
        (other, _) => Err(QueryError::TypeError(format!("Cannot encode {:?} as {}", other, data_type))),
    }
}

/// Decode the stored bytes of a column of `data_type`
pub fn decode(bytes: &[u8], data_type: &DataType) -> QueryResult<DataValue> {
    let expect_len = |len: usize| {
        if bytes.len() == len {
            Ok(())
        } else {
            Err(QueryError::MalformedRecord(format!(
                "{} value must be {} bytes, found {}",
                data_type,
                len,
                bytes.len()
            )))
        }
    };

    match data_type {
        DataType::Integer => {
            expect_len(4)?;
            Ok(DataValue::Integer((BigEndian::read_u32(bytes) ^ SIGN_32) as i32 as i64))
        }
        DataType::BigInt => {
            expect_len(8)?;
            Ok(DataValue::Integer((BigEndian::read_u64(bytes) ^ SIGN_64) as i64))
        }
        DataType::Double => {
            expect_len(8)?;
            let sortable = BigEndian::read_u64(bytes);
            let bits = if sortable & SIGN_64 != 0 { sortable ^ SIGN_64 } else { !sortable };
            Ok(DataValue::Float(f64::from_bits(bits)))
        }
        DataType::Decimal { .. } => {
            expect_len(DECIMAL_ENCODED_LEN)?;
            let scale = bytes[0] as u32;
            let value = (BigEndian::read_u128(&bytes[1..]) ^ SIGN_128) as i128;
            Ok(DataValue::Decimal { value, scale })
        }
        DataType::Varchar => String::from_utf8(bytes.to_vec())
            .map(DataValue::Text)
            .map_err(|e| QueryError::MalformedRecord(format!("VARCHAR value is not UTF-8: {}", e))),
        DataType::Boolean => {
            expect_len(1)?;
            match bytes[0] {
                0 => Ok(DataValue::Boolean(false)),
                1 => Ok(DataValue::Boolean(true)),
                other => Err(QueryError::MalformedRecord(format!("invalid BOOLEAN byte {}", other))),
            }
        }
    }
}
