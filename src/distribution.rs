// Copyright 2026 Quantum Beats Contributors
// SPDX-License-Identifier: Apache-2.0

//! Measurement outcome distributions.
//!
//! A backend returns one [`OutcomeRecord`] per trial: the classical bit read
//! from each measured qubit, in qubit order. [`compute_distribution`] folds a
//! batch of records into a sparse [`DistributionTable`] that maps each
//! distinct record to the number of trials that produced it.
//!
//! ```
//! use quantum_beats::distribution::{compute_distribution, OutcomeRecord};
//!
//! let batch = vec![
//!     OutcomeRecord::new(vec![0, 1]).unwrap(),
//!     OutcomeRecord::new(vec![1, 0]).unwrap(),
//!     OutcomeRecord::new(vec![0, 1]).unwrap(),
//! ];
//! let table = compute_distribution(&batch).unwrap();
//! assert_eq!(table.count(&[0, 1]), 2);
//! assert_eq!(table.count(&[1, 0]), 1);
//! assert_eq!(table.count(&[1, 1]), 0);
//! assert_eq!(table.total(), 3);
//! ```

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Convention for rendering a record as a bitstring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitOrder {
    /// Bit 0 is the leftmost character (tuple order, as Rigetti reports it).
    QubitZeroLeft,
    /// Bit 0 is the rightmost character (Qiskit count keys).
    QubitZeroRight,
}

/// Result of a single trial: one classical bit per measured qubit.
///
/// Values are guaranteed to be 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OutcomeRecord(Vec<u8>);

/// Lookup key of a [`DistributionTable`]. A record is its own key.
pub type OutcomeKey = OutcomeRecord;

impl OutcomeRecord {
    /// Create a record from bit values, rejecting anything but 0 and 1.
    pub fn new(bits: Vec<u8>) -> Result<Self, ValidationError> {
        if let Some((position, &value)) = bits.iter().enumerate().find(|(_, &b)| b > 1) {
            return Err(ValidationError::InvalidBit {
                position,
                value: value as i64,
            });
        }
        Ok(Self(bits))
    }

    /// Create a record from integer readouts as delivered by vendor APIs.
    pub fn from_readout<T>(values: &[T]) -> Result<Self, ValidationError>
    where
        T: Copy + Into<i64>,
    {
        let mut bits = Vec::with_capacity(values.len());
        for (position, &v) in values.iter().enumerate() {
            let value: i64 = v.into();
            match value {
                0 => bits.push(0),
                1 => bits.push(1),
                value => return Err(ValidationError::InvalidBit { position, value }),
            }
        }
        Ok(Self(bits))
    }

    /// Create a record from booleans.
    pub fn from_bools(bits: &[bool]) -> Self {
        Self(bits.iter().map(|&b| u8::from(b)).collect())
    }

    /// Unpack the low `num_bits` bits of `value`; bit 0 is the least significant.
    pub fn from_integer(value: u64, num_bits: usize) -> Self {
        Self(
            (0..num_bits)
                .map(|i| if i < 64 { ((value >> i) & 1) as u8 } else { 0 })
                .collect(),
        )
    }

    /// Parse a bitstring written in the given order.
    pub fn from_bitstring(s: &str, order: BitOrder) -> Result<Self, ValidationError> {
        let mut bits = Vec::with_capacity(s.len());
        for (position, c) in s.chars().enumerate() {
            match c {
                '0' => bits.push(0),
                '1' => bits.push(1),
                other => {
                    return Err(ValidationError::Field {
                        field: "bitstring".into(),
                        message: format!("unexpected character '{other}' at position {position}"),
                    })
                }
            }
        }
        if order == BitOrder::QubitZeroRight {
            bits.reverse();
        }
        Ok(Self(bits))
    }

    /// Bit values in qubit order.
    pub fn bits(&self) -> &[u8] {
        &self.0
    }

    /// Number of measured qubits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record holds no bits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as a bitstring in the given order.
    pub fn to_bitstring(&self, order: BitOrder) -> String {
        let chars = self.0.iter().map(|&b| if b == 0 { '0' } else { '1' });
        match order {
            BitOrder::QubitZeroLeft => chars.collect(),
            BitOrder::QubitZeroRight => chars.rev().collect(),
        }
    }
}

impl fmt::Display for OutcomeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{b}")?;
        }
        write!(f, ")")
    }
}

impl TryFrom<Vec<u8>> for OutcomeRecord {
    type Error = ValidationError;

    fn try_from(bits: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl TryFrom<&[u8]> for OutcomeRecord {
    type Error = ValidationError;

    fn try_from(bits: &[u8]) -> Result<Self, Self::Error> {
        Self::new(bits.to_vec())
    }
}

impl<'de> Deserialize<'de> for OutcomeRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = Vec::<u8>::deserialize(deserializer)?;
        OutcomeRecord::new(bits).map_err(serde::de::Error::custom)
    }
}

/// Sparse map from outcome to occurrence count.
///
/// Only outcomes that occurred are stored; looking up any other key yields 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionTable {
    counts: HashMap<OutcomeKey, u64>,
}

impl DistributionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for a key, 0 if it never occurred.
    pub fn get(&self, key: &OutcomeKey) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Count for a bit pattern, 0 if it never occurred.
    pub fn count(&self, bits: &[u8]) -> u64 {
        self.counts
            .iter()
            .find(|(k, _)| k.bits() == bits)
            .map(|(_, &c)| c)
            .unwrap_or(0)
    }

    /// Sum of all counts; equals the number of aggregated records.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no record was aggregated.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Width of the records in the table, if any.
    pub fn num_bits(&self) -> Option<usize> {
        self.counts.keys().next().map(OutcomeRecord::len)
    }

    /// Iterate over `(outcome, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&OutcomeKey, u64)> {
        self.counts.iter().map(|(k, &c)| (k, c))
    }

    /// Entries sorted by outcome, for stable output.
    pub fn sorted(&self) -> Vec<(&OutcomeKey, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Export as `bitstring -> count`.
    pub fn to_bitstring_counts(&self, order: BitOrder) -> HashMap<String, u64> {
        self.counts
            .iter()
            .map(|(k, &c)| (k.to_bitstring(order), c))
            .collect()
    }

    fn increment(&mut self, key: &OutcomeKey) {
        match self.counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(key.clone(), 1);
            }
        }
    }
}

impl fmt::Display for DistributionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (key, count)) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}: {count}")?;
        }
        write!(f, "}}")
    }
}

/// Tracks the reference record width across a batch.
#[derive(Default)]
struct WidthCheck {
    expected: Option<usize>,
}

impl WidthCheck {
    fn check(&mut self, index: usize, record: &OutcomeRecord) -> Result<(), ValidationError> {
        match self.expected {
            None => {
                self.expected = Some(record.len());
                Ok(())
            }
            Some(expected) if expected == record.len() => Ok(()),
            Some(expected) => Err(ValidationError::InconsistentRecordLength {
                index,
                expected,
                actual: record.len(),
            }),
        }
    }
}

/// Aggregate a batch of records into a [`DistributionTable`].
///
/// All records must have the width of the first one. An empty batch yields an
/// empty table.
pub fn compute_distribution<I>(records: I) -> Result<DistributionTable, ValidationError>
where
    I: IntoIterator,
    I::Item: Borrow<OutcomeRecord>,
{
    let mut table = DistributionTable::new();
    let mut width = WidthCheck::default();

    for (index, record) in records.into_iter().enumerate() {
        let record = record.borrow();
        width.check(index, record)?;
        table.increment(record);
    }

    Ok(table)
}

/// Aggregate a fallible stream of records.
///
/// The first error yielded by `records` is returned as-is. Width mismatches
/// are converted into `E`.
pub fn try_compute_distribution<I, E>(records: I) -> Result<DistributionTable, E>
where
    I: IntoIterator<Item = Result<OutcomeRecord, E>>,
    E: From<ValidationError>,
{
    let mut table = DistributionTable::new();
    let mut width = WidthCheck::default();

    for (index, record) in records.into_iter().enumerate() {
        let record = record?;
        width.check(index, &record)?;
        table.increment(&record);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, Error};
    use proptest::prelude::*;

    fn rec(bits: &[u8]) -> OutcomeRecord {
        OutcomeRecord::new(bits.to_vec()).unwrap()
    }

    fn batch(records: &[&[u8]]) -> Vec<OutcomeRecord> {
        records.iter().map(|r| rec(r)).collect()
    }

    // =========================================================================
    // OutcomeRecord
    // =========================================================================

    #[test]
    fn test_record_rejects_non_bits() {
        let err = OutcomeRecord::new(vec![0, 2, 1]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidBit {
                position: 1,
                value: 2
            }
        );
    }

    #[test]
    fn test_record_from_readout() {
        let r = OutcomeRecord::from_readout(&[1i32, 0]).unwrap();
        assert_eq!(r.bits(), &[1, 0]);
        assert!(OutcomeRecord::from_readout(&[0i32, -1]).is_err());
    }

    #[test]
    fn test_record_from_integer_is_lsb_first() {
        // 0b10: bit 0 = 0, bit 1 = 1
        assert_eq!(OutcomeRecord::from_integer(2, 2).bits(), &[0, 1]);
        assert_eq!(OutcomeRecord::from_integer(1, 3).bits(), &[1, 0, 0]);
    }

    #[test]
    fn test_record_bitstring_orders() {
        let r = rec(&[1, 0]);
        assert_eq!(r.to_bitstring(BitOrder::QubitZeroLeft), "10");
        assert_eq!(r.to_bitstring(BitOrder::QubitZeroRight), "01");
        assert_eq!(
            OutcomeRecord::from_bitstring("01", BitOrder::QubitZeroRight).unwrap(),
            r
        );
        assert!(OutcomeRecord::from_bitstring("0x", BitOrder::QubitZeroLeft).is_err());
    }

    #[test]
    fn test_record_display() {
        assert_eq!(rec(&[0, 1]).to_string(), "(0, 1)");
    }

    #[test]
    fn test_record_deserialize_validates() {
        let r: OutcomeRecord = serde_json::from_str("[1, 1]").unwrap();
        assert_eq!(r, rec(&[1, 1]));
        assert!(serde_json::from_str::<OutcomeRecord>("[1, 3]").is_err());
    }

    // =========================================================================
    // compute_distribution
    // =========================================================================

    #[test]
    fn test_mixed_batch() {
        let table = compute_distribution(&batch(&[&[0, 1], &[1, 0], &[0, 1]])).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&rec(&[0, 1])), 2);
        assert_eq!(table.get(&rec(&[1, 0])), 1);
        assert_eq!(table.total(), 3);
    }

    #[test]
    fn test_correlated_batch() {
        let table = compute_distribution(&batch(&[
            &[0, 0],
            &[1, 1],
            &[0, 0],
            &[1, 1],
            &[0, 0],
        ]))
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.count(&[0, 0]), 3);
        assert_eq!(table.count(&[1, 1]), 2);
    }

    #[test]
    fn test_empty_batch() {
        let table = compute_distribution(Vec::<OutcomeRecord>::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
        assert_eq!(table.num_bits(), None);
    }

    #[test]
    fn test_absent_outcomes_are_not_stored() {
        let table = compute_distribution(&batch(&[&[1, 0]])).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.count(&[0, 0]), 0);
        assert_eq!(table.count(&[1, 1]), 0);
    }

    #[test]
    fn test_repeated_computation_is_identical() {
        let records = batch(&[&[0, 1], &[1, 1], &[0, 1], &[0, 0]]);
        let first = compute_distribution(&records).unwrap();
        let second = compute_distribution(&records).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_owned_and_borrowed_inputs_agree() {
        let records = batch(&[&[0, 1], &[1, 0]]);
        let borrowed = compute_distribution(records.iter()).unwrap();
        let owned = compute_distribution(records).unwrap();
        assert_eq!(borrowed, owned);
    }

    #[test]
    fn test_bit_positions_are_not_reordered() {
        let table = compute_distribution(&batch(&[&[0, 1], &[1, 0]])).unwrap();
        assert_eq!(table.count(&[0, 1]), 1);
        assert_eq!(table.count(&[1, 0]), 1);
    }

    #[test]
    fn test_inconsistent_lengths_rejected() {
        let err = compute_distribution(&batch(&[&[0, 1], &[1, 0], &[1, 0, 1]])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InconsistentRecordLength {
                index: 2,
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_bitstring_export() {
        let table = compute_distribution(&batch(&[&[1, 0], &[1, 0], &[1, 1]])).unwrap();
        let qiskit = table.to_bitstring_counts(BitOrder::QubitZeroRight);
        assert_eq!(qiskit.get("01"), Some(&2));
        assert_eq!(qiskit.get("11"), Some(&1));
        let rigetti = table.to_bitstring_counts(BitOrder::QubitZeroLeft);
        assert_eq!(rigetti.get("10"), Some(&2));
    }

    #[test]
    fn test_table_display_is_sorted() {
        let table = compute_distribution(&batch(&[&[1, 1], &[0, 1], &[0, 1]])).unwrap();
        assert_eq!(table.to_string(), "{(0, 1): 2, (1, 1): 1}");
    }

    // =========================================================================
    // try_compute_distribution
    // =========================================================================

    #[test]
    fn test_try_compute_propagates_input_error() {
        let input: Vec<Result<OutcomeRecord, Error>> = vec![
            Ok(rec(&[0, 1])),
            Err(Error::Backend(BackendError::ExecutionFailed(
                "stream closed".into(),
            ))),
            Ok(rec(&[1, 0])),
        ];
        let err = try_compute_distribution(input).unwrap_err();
        assert!(matches!(
            err,
            Error::Backend(BackendError::ExecutionFailed(ref msg)) if msg == "stream closed"
        ));
    }

    #[test]
    fn test_try_compute_converts_width_mismatch() {
        let input: Vec<Result<OutcomeRecord, Error>> = vec![Ok(rec(&[0])), Ok(rec(&[0, 1]))];
        let err = try_compute_distribution(input).unwrap_err();
        assert!(matches!(
            err,
            Error::Validation(ValidationError::InconsistentRecordLength { .. })
        ));
    }

    #[test]
    fn test_try_compute_success() {
        let input: Vec<Result<OutcomeRecord, ValidationError>> =
            vec![Ok(rec(&[0, 1])), Ok(rec(&[0, 1]))];
        let table = try_compute_distribution(input).unwrap();
        assert_eq!(table.count(&[0, 1]), 2);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn batch_strategy() -> impl Strategy<Value = Vec<OutcomeRecord>> {
        (1usize..5).prop_flat_map(|width| {
            prop::collection::vec(
                prop::collection::vec(0u8..=1, width)
                    .prop_map(|bits| OutcomeRecord::new(bits).unwrap()),
                0..64,
            )
        })
    }

    proptest! {
        #[test]
        fn prop_total_equals_batch_size(records in batch_strategy()) {
            let table = compute_distribution(&records).unwrap();
            prop_assert_eq!(table.total(), records.len() as u64);
        }

        #[test]
        fn prop_each_outcome_counted_exactly(records in batch_strategy()) {
            let table = compute_distribution(&records).unwrap();
            for (key, count) in table.iter() {
                let occurrences = records.iter().filter(|r| *r == key).count() as u64;
                prop_assert_eq!(count, occurrences);
            }
            for r in &records {
                prop_assert!(table.get(r) > 0);
            }
        }

        #[test]
        fn prop_shuffle_invariant(
            (records, shuffled) in batch_strategy()
                .prop_flat_map(|b| (Just(b.clone()), Just(b).prop_shuffle()))
        ) {
            let a = compute_distribution(&records).unwrap();
            let b = compute_distribution(&shuffled).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
