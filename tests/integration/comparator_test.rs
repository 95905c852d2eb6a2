use std::cmp::Ordering;

use anyhow::Result;
use rand::prelude::*;

use cellscan::storage::row::{compare_bytes, compare_keys, KeyComparator};
use cellscan::RowBuffer;

#[path = "../common/mod.rs"]
mod common;
use common::{cell_array_row, cell_buffers, int_value, scan_record, Column};

fn random_key(rng: &mut StdRng) -> Vec<u8> {
    let len = rng.gen_range(0..6);
    // Small alphabet with high bytes so prefixes and sign-bit bytes both occur
    (0..len).map(|_| *[0x00, 0x01, 0x61, 0x7f, 0x80, 0xff].choose(rng).unwrap()).collect()
}

fn columns() -> Vec<Column> {
    vec![("cf", "a", int_value(1)), ("cf", "b", b"x".to_vec())]
}

/// Comparing rows of any shape mix gives the same order as comparing the raw
/// keys
#[test]
fn test_compare_keys_is_shape_invariant() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let keys: Vec<Vec<u8>> = (0..40).map(|_| random_key(&mut rng)).filter(|k| !k.is_empty()).collect();

    let records: Vec<Vec<u8>> = keys.iter().map(|k| scan_record(k, &columns())).collect();
    let buffers: Vec<Vec<Vec<u8>>> = keys.iter().map(|k| cell_buffers(k, &columns())).collect();
    let scanned: Vec<RowBuffer> = records.iter().map(|r| RowBuffer::from_scan(r)).collect::<Result<_, _>>()?;
    let assembled: Vec<RowBuffer> = buffers.iter().map(|b| cell_array_row(b)).collect();

    for i in 0..keys.len() {
        for j in 0..keys.len() {
            let expected = keys[i].cmp(&keys[j]);
            assert_eq!(compare_keys(&scanned[i], &scanned[j]), expected);
            assert_eq!(compare_keys(&scanned[i], &assembled[j]), expected);
            assert_eq!(compare_keys(&assembled[i], &scanned[j]), expected);
            assert_eq!(KeyComparator.compare(&assembled[i], &assembled[j]), expected);
        }
    }
    Ok(())
}

/// Sorting by key is a total order and matches sorting the extracted slices
#[test]
fn test_compare_keys_total_order() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(1234);
    let keys: Vec<Vec<u8>> = (0..60).map(|_| random_key(&mut rng)).filter(|k| !k.is_empty()).collect();
    let records: Vec<Vec<u8>> = keys.iter().map(|k| scan_record(k, &columns())).collect();
    let mut rows: Vec<RowBuffer> = records.iter().map(|r| RowBuffer::from_scan(r)).collect::<Result<_, _>>()?;

    for a in &rows {
        assert_eq!(compare_keys(a, a), Ordering::Equal);
        for b in &rows {
            let ab = compare_keys(a, b);
            assert_eq!(ab, compare_keys(b, a).reverse());
            if ab == Ordering::Equal {
                assert_eq!(a.key(), b.key());
            }
            for c in &rows {
                if ab != Ordering::Greater && compare_keys(b, c) != Ordering::Greater {
                    assert_ne!(compare_keys(a, c), Ordering::Greater);
                }
            }
        }
    }

    rows.sort_by(compare_keys);
    let mut expected = keys.clone();
    expected.sort();
    let sorted: Vec<Vec<u8>> = rows.iter().map(|r| r.key().to_vec()).collect();
    assert_eq!(sorted, expected);
    Ok(())
}

#[test]
fn test_compare_bytes_by_offset() {
    let left = b"__abc__";
    let right = b"abd";
    assert_eq!(compare_bytes(left, 2, 3, right, 0, 3), Ordering::Less);
    assert_eq!(compare_bytes(left, 2, 2, right, 0, 2), Ordering::Equal);
    // A proper prefix sorts first
    assert_eq!(compare_bytes(left, 2, 2, right, 0, 3), Ordering::Less);
    // Bytes compare unsigned
    assert_eq!(compare_bytes(&[0x80], 0, 1, &[0x7f], 0, 1), Ordering::Greater);
}
