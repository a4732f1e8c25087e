use core::str::FromStr;

use serde::{Deserialize, Serialize};

use motocrm_core::DomainError;

/// Human-readable sequential order identifier, e.g. `MRS0001`.
///
/// Assigned exactly once per customer, on first approval. The numeric suffix
/// is zero-padded to at least four digits; once the counter passes 9999 the
/// suffix simply grows a digit (`MRS10000`), there is no fixed-width
/// truncation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

const PREFIX: &str = "MRS";
const MIN_DIGITS: usize = 4;

impl OrderNumber {
    /// The first order number ever allocated.
    pub fn first() -> Self {
        Self::from_sequence(1)
    }

    /// Build from a raw sequence value.
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("{PREFIX}{seq:0width$}", width = MIN_DIGITS))
    }

    /// The next order number after the current persisted maximum.
    ///
    /// The allocator is stateless: it derives its answer entirely from the
    /// maximum handed in, which the caller must read inside the same atomic
    /// unit that writes the result (see the store's approval contract).
    pub fn next(max: Option<&OrderNumber>) -> Self {
        match max {
            None => Self::first(),
            Some(n) => Self::from_sequence(n.sequence() + 1),
        }
    }

    /// Numeric suffix of this order number.
    pub fn sequence(&self) -> u64 {
        // Validated at construction; the suffix always parses.
        self.0[PREFIX.len()..].parse().unwrap_or(0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OrderNumber {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let suffix = s
            .strip_prefix(PREFIX)
            .ok_or_else(|| DomainError::invalid_id(format!("order number must start with {PREFIX}: {s}")))?;

        if suffix.len() < MIN_DIGITS {
            return Err(DomainError::invalid_id(format!(
                "order number suffix must have at least {MIN_DIGITS} digits: {s}"
            )));
        }

        let seq: u64 = suffix
            .parse()
            .map_err(|e| DomainError::invalid_id(format!("order number suffix: {e}")))?;

        Ok(Self::from_sequence(seq))
    }
}
