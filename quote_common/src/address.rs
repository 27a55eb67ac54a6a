//! Spreadsheet cell addresses and column ranges.
//!
//! An `Address` is a zero-based `(column, row)` pair that can be built from a
//! human-readable name (`"AZ12"`, `"$B$2"`) or from a numeric pair. Columns use
//! bijective base-26 letters (`A`..`Z`, `AA`..), rows are 1-based on the sheet and
//! 0-based internally.
//!
//! Name parsing is deliberately permissive about the row part: a missing or zero
//! row reads as row 1, and a name with no letters reads as column `A`. Anything
//! that is neither a letter run nor a trailing digit run is rejected.
//!
//! `AddressRange` keeps its two ends exactly as given; a range whose start row is
//! after its end row simply iterates no rows.
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::SyncError;
use crate::result::Result;

const RADIX: u32 = 26;

/// Zero-based cell coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address {
    /// Column index, `A` = 0.
    pub column: u32,
    /// Row index, sheet row 1 = 0.
    pub row: u32,
}

impl Address {
    /// Create an address from already-validated zero-based indices.
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Create an address from signed numeric coordinates.
    ///
    /// Fails with `InvalidAddress` if either component is negative or too large.
    pub fn from_index(column: i64, row: i64) -> Result<Self> {
        let column = u32::try_from(column).map_err(|_| {
            SyncError::InvalidAddress(format!("column position {} out of range", column))
        })?;
        let row = u32::try_from(row)
            .map_err(|_| SyncError::InvalidAddress(format!("row position {} out of range", row)))?;
        Ok(Self { column, row })
    }

    /// Parse a cell name such as `"A1"`, `"$AZ$12"` or `"b"`.
    ///
    /// `$` signs are ignored, letters are case-insensitive and surrounding
    /// whitespace is trimmed.
    ///
    /// ```
    /// use quote_common::address::Address;
    ///
    /// assert_eq!(Address::parse("AZ12").unwrap(), Address::new(51, 11));
    /// assert_eq!(Address::parse("B").unwrap(), Address::new(1, 0));
    /// assert_eq!(Address::parse("A0").unwrap(), Address::new(0, 0));
    /// ```
    pub fn parse(name: &str) -> Result<Self> {
        let cleaned = name.replace('$', "").to_uppercase();
        let cleaned = cleaned.trim();

        if cleaned.contains(':') {
            return Err(SyncError::InvalidAddress(format!(
                "cell name '{}' must not be a range",
                name
            )));
        }

        let split = cleaned
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(cleaned.len());
        let (letters, digits) = cleaned.split_at(split);

        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SyncError::InvalidAddress(format!(
                "cell name '{}' is not letters followed by digits",
                name
            )));
        }

        let column = if letters.is_empty() {
            0
        } else {
            Self::letters_to_column(letters)?
        };

        let row = if digits.is_empty() {
            0
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| {
                    SyncError::InvalidAddress(format!("row part of '{}' is too large", name))
                })?
                .saturating_sub(1)
        };

        Ok(Self { column, row })
    }

    /// Convert column letters to a zero-based index (`A` = 0, `Z` = 25, `AA` = 26).
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(SyncError::InvalidAddress("empty column letters".into()));
        }

        let mut value: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(SyncError::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            value = value
                .checked_mul(RADIX)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| {
                    SyncError::InvalidAddress(format!("column '{}' is too large", letters))
                })?;
        }

        Ok(value - 1)
    }

    /// Convert a zero-based column index to letters (0 = `A`, 26 = `AA`).
    pub fn column_to_letters(column: u32) -> String {
        let mut letters = Vec::new();
        let mut n = column as u64 + 1;

        while n > 0 {
            n -= 1;
            letters.push((b'A' + (n % RADIX as u64) as u8) as char);
            n /= RADIX as u64;
        }

        letters.iter().rev().collect()
    }

    /// Format the address as a sheet name, e.g. `"AZ12"`.
    pub fn name(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.column), self.row as u64 + 1)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Address {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An ordered pair of addresses, kept as written (not normalized).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AddressRange {
    /// First cell of the range.
    pub start: Address,
    /// Last cell of the range.
    pub end: Address,
}

impl AddressRange {
    /// Create a range from two addresses.
    pub fn new(start: Address, end: Address) -> Self {
        Self { start, end }
    }

    /// A range covering exactly one cell.
    pub fn single(address: Address) -> Self {
        Self {
            start: address,
            end: address,
        }
    }

    /// Parse `"A2:A200"`, `"B7"` or `":C4"`.
    ///
    /// The string is split on the first `:`. Without a colon both ends are the
    /// single parsed address; an empty half is address `A1`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once(':') {
            None => Ok(Self::single(Address::parse(s)?)),
            Some((start, end)) => Ok(Self::new(Address::parse(start)?, Address::parse(end)?)),
        }
    }

    /// Column of the range start; single-column ranges are read from here.
    pub fn column(&self) -> u32 {
        self.start.column
    }

    /// Row indices covered by the range, empty if start is after end.
    pub fn rows(&self) -> RangeInclusive<u32> {
        self.start.row..=self.end.row
    }

    /// Number of rows covered by the range.
    pub fn row_count(&self) -> usize {
        if self.start.row > self.end.row {
            0
        } else {
            (self.end.row - self.start.row) as usize + 1
        }
    }

    /// The same rows, moved to another column.
    pub fn with_column(&self, column: u32) -> Self {
        Self {
            start: Address::new(column, self.start.row),
            end: Address::new(column, self.end.row),
        }
    }

    /// The same start, ending `rows` rows further down (at least one row).
    pub fn with_row_count(&self, rows: usize) -> Self {
        let last = self.start.row as u64 + rows.max(1) as u64 - 1;
        Self {
            start: self.start,
            end: Address::new(self.end.column, last.min(u32::MAX as u64) as u32),
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

impl FromStr for AddressRange {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
