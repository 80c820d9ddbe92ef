//! Location ID assignment
//!
//! Records whose `id` is a non-negative integer string keep it, whatever its
//! length. Every other record (including a repeat of an ID already taken in
//! the batch) receives `max_kept + 1`, `max_kept + 2`, ... in input order.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

use crate::models::LocationRecord;

/// Non-negative integer ID of any length
///
/// Held as decimal digits without leading zeros, so "7" and "007" compare
/// equal. Ordering is numeric: shorter is smaller, equal lengths compare
/// digit by digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericId(String);

impl NumericId {
    /// Accepts a non-empty all-ASCII-digit string
    pub fn parse(id: &str) -> Option<Self> {
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = id.trim_start_matches('0');
        Some(Self(if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        }))
    }

    pub fn zero() -> Self {
        Self("0".to_string())
    }

    /// `self + 1`, carrying through as many digits as needed
    pub fn successor(&self) -> Self {
        let mut digits: Vec<u8> = self.0.bytes().collect();
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
        Self(digits.into_iter().map(char::from).collect())
    }
}

impl Ord for NumericId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for NumericId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NumericId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of an assignment pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAssignment {
    /// Records that kept their incoming ID
    pub kept: usize,
    /// Records given a fresh ID
    pub assigned: usize,
    /// First ID not used by this batch
    pub next_id: NumericId,
}

/// Assign IDs in place
pub fn assign_ids(locations: &mut [LocationRecord]) -> IdAssignment {
    let mut taken = HashSet::new();
    let mut needs_id = vec![false; locations.len()];
    let mut max_id = NumericId::zero();

    for (index, location) in locations.iter().enumerate() {
        match NumericId::parse(&location.id) {
            Some(id) if !taken.contains(&id) => {
                if id > max_id {
                    max_id = id.clone();
                }
                taken.insert(id);
            }
            Some(_) => {
                warn!(location_id = %location.id, "Duplicate ID found");
                needs_id[index] = true;
            }
            None => {
                warn!("Non-integer or missing ID found: {}", location.id);
                needs_id[index] = true;
            }
        }
    }

    let mut next_id = max_id.successor();
    let mut assigned = 0;
    for (location, _) in locations
        .iter_mut()
        .zip(needs_id.iter())
        .filter(|(_, needs)| **needs)
    {
        location.id = next_id.to_string();
        info!("Assigned new ID {} to location {}", next_id, location.name);
        next_id = next_id.successor();
        assigned += 1;
    }

    IdAssignment {
        kept: locations.len() - assigned,
        assigned,
        next_id,
    }
}
