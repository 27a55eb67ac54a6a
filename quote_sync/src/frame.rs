//! Masked column-oriented batch I/O against a `Grid`.
//!
//! A sync reads one key column, builds a `DataFrame` around it and then clears
//! and writes the destination columns, touching only rows whose key was
//! classified into a ticker. The mask is fixed when the frame is built and does
//! not depend on what the endpoint later returns, so a classified key with no
//! quote gets its cells blanked and then the sentinel record written.
use log::debug;
use quote_common::{
    AddressRange, FieldFormat, FieldValue, KeyedQuotes, Lookup, Result, TickerMap,
};

use crate::grid::Grid;

/// Destination cell content; `None` means the cell is not written.
pub type Slot = Option<FieldValue>;

/// A single-column range and one value per row.
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn<T> {
    range: AddressRange,
    values: Vec<T>,
}

impl<T> DataColumn<T> {
    /// Pair a range with its values.
    pub fn new(range: AddressRange, values: Vec<T>) -> Self {
        Self { range, values }
    }

    /// Cells the column covers.
    pub fn range(&self) -> &AddressRange {
        &self.range
    }

    /// Values, one per row.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Value at a row offset.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.values.get(index)
    }

    /// Replace the value at a row offset; out-of-range offsets are ignored.
    pub fn set(&mut self, index: usize, value: T) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Empty column of the same height, placed in another sheet column.
    pub fn blank_like<U: Default + Clone>(&self, column: u32) -> DataColumn<U> {
        DataColumn {
            range: self.range.with_column(column),
            values: vec![U::default(); self.values.len()],
        }
    }
}

/// Counts produced by `DataFrame::update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Masked rows filled from a returned record.
    pub quoted: usize,
    /// Masked rows filled with the sentinel record.
    pub defaulted: usize,
}

/// Key column, destination columns of equal height, and the row mask.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    keys: DataColumn<String>,
    mask: Vec<bool>,
    columns: Vec<DataColumn<Slot>>,
}

impl DataFrame {
    /// Build a frame; a row is masked iff its key is in `tickers`.
    pub fn new(keys: DataColumn<String>, tickers: &TickerMap, destinations: &[u32]) -> Self {
        let mask = keys.values().iter().map(|key| tickers.contains(key)).collect();
        let columns = destinations
            .iter()
            .map(|&column| keys.blank_like(column))
            .collect();
        Self {
            keys,
            mask,
            columns,
        }
    }

    /// The key column.
    pub fn keys(&self) -> &DataColumn<String> {
        &self.keys
    }

    /// Destination columns in declared order.
    pub fn columns(&self) -> &[DataColumn<Slot>] {
        &self.columns
    }

    /// Per-row mask.
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Whether the row at `index` takes part in clear and write.
    pub fn has_data(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(false)
    }

    /// Number of masked rows.
    pub fn masked_rows(&self) -> usize {
        self.mask.iter().filter(|m| **m).count()
    }

    /// Fill destination columns from the looked-up records of masked rows.
    ///
    /// Field `i` of a record goes to destination column `i`; columns past the
    /// last field stay unwritten.
    pub fn update(&mut self, quotes: &KeyedQuotes<'_>) -> UpdateStats {
        let mut stats = UpdateStats::default();

        for (row, key) in self.keys.values().iter().enumerate() {
            if !self.mask[row] {
                continue;
            }
            let Some(lookup) = quotes.get(key) else {
                continue;
            };
            let record = lookup.record();
            match lookup {
                Lookup::Quoted(_) => stats.quoted += 1,
                Lookup::Defaulted => stats.defaulted += 1,
            }

            for (index, column) in self.columns.iter_mut().enumerate() {
                match record.field(index) {
                    Some(value) => column.set(row, Some(value)),
                    None => break,
                }
            }
            debug!("update: '{}' => {:?}", key, record);
        }
        stats
    }
}

/// One sheet of a grid, with the batch operations of a sync.
pub struct DataSheet<'g, G: Grid + ?Sized> {
    grid: &'g mut G,
    sheet: String,
}

impl<'g, G: Grid + ?Sized> DataSheet<'g, G> {
    /// Bind a sheet name to a grid.
    pub fn new(grid: &'g mut G, sheet: &str) -> Self {
        Self {
            grid,
            sheet: sheet.to_string(),
        }
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.sheet
    }

    /// Read one cell as a string.
    pub fn read_cell(&self, column: u32, row: u32) -> Result<String> {
        self.grid.read_cell_string(&self.sheet, column, row)
    }

    /// Read the start column of `range` over its rows.
    ///
    /// With `truncate`, trailing empty cells are dropped and the range end is
    /// pulled up to the last non-empty row (the range is kept as is when every
    /// cell is empty).
    pub fn read_column(&self, range: &AddressRange, truncate: bool) -> Result<DataColumn<String>> {
        let column = range.column();
        let mut values = range
            .rows()
            .map(|row| self.read_cell(column, row))
            .collect::<Result<Vec<_>>>()?;
        let mut range = *range;

        if truncate {
            let length = values
                .iter()
                .rposition(|value| !value.is_empty())
                .map_or(0, |last| last + 1);
            values.truncate(length);
            if length > 0 {
                range = range.with_row_count(length);
            }
        }

        Ok(DataColumn::new(range, values))
    }

    /// Blank one cell.
    pub fn clear_cell(&mut self, column: u32, row: u32) -> Result<()> {
        self.grid.clear_cell(&self.sheet, column, row)?;
        debug!("clear_cell({},{})", column, row);
        Ok(())
    }

    /// Write one value; numeric fields are stored as numbers when they parse.
    pub fn write_cell(&mut self, column: u32, row: u32, value: &Slot) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let number = match value.format {
            FieldFormat::Numeric => value.text.trim().parse::<f64>().ok(),
            FieldFormat::Text => None,
        };
        match number {
            Some(number) => self.grid.write_cell_numeric(&self.sheet, column, row, number)?,
            None => self
                .grid
                .write_cell_string(&self.sheet, column, row, &value.text)?,
        }
        debug!("write_cell({},{}) = {}", column, row, value.text);
        Ok(())
    }

    /// Blank the masked rows of one column.
    pub fn clear_column<T>(&mut self, frame: &DataFrame, column: &DataColumn<T>) -> Result<()> {
        let sheet_column = column.range().column();
        for (index, row) in column.range().rows().enumerate() {
            if frame.has_data(index) {
                self.clear_cell(sheet_column, row)?;
            }
        }
        Ok(())
    }

    /// Blank the masked rows of every destination column.
    pub fn clear_frame(&mut self, frame: &DataFrame) -> Result<()> {
        for column in frame.columns() {
            self.clear_column(frame, column)?;
        }
        Ok(())
    }

    /// Write the masked rows of one column.
    pub fn write_column(&mut self, frame: &DataFrame, column: &DataColumn<Slot>) -> Result<()> {
        let sheet_column = column.range().column();
        for (index, row) in column.range().rows().enumerate() {
            if !frame.has_data(index) {
                continue;
            }
            if let Some(value) = column.get(index) {
                self.write_cell(sheet_column, row, value)?;
            }
        }
        Ok(())
    }

    /// Write the masked rows of every destination column.
    pub fn write_frame(&mut self, frame: &DataFrame) -> Result<()> {
        for column in frame.columns() {
            self.write_column(frame, column)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Cell, MemoryGrid};
    use quote_common::{QuoteBook, QuoteRecord};

    const SHEET: &str = "Sheet1";

    fn grid_with_keys(keys: &[&str]) -> MemoryGrid {
        let mut grid = MemoryGrid::with_sheet(SHEET);
        for (offset, key) in keys.iter().enumerate() {
            if !key.is_empty() {
                grid.write_cell_string(SHEET, 0, 1 + offset as u32, key).unwrap();
            }
            grid.write_cell_string(SHEET, 1, 1 + offset as u32, "stale").unwrap();
            grid.write_cell_string(SHEET, 2, 1 + offset as u32, "stale").unwrap();
        }
        grid
    }

    #[test]
    fn test_read_column_truncates_trailing_blanks() {
        let mut grid = grid_with_keys(&["BP.L", "", "VOD.L"]);
        let sheet = DataSheet::new(&mut grid, SHEET);
        let range = AddressRange::parse("A2:A10").unwrap();

        let full = sheet.read_column(&range, false).unwrap();
        assert_eq!(full.len(), 9);
        assert_eq!(full.range(), &range);

        let short = sheet.read_column(&range, true).unwrap();
        assert_eq!(short.values(), &["BP.L", "", "VOD.L"]);
        assert_eq!(short.range().to_string(), "A2:A4");

        let blank = sheet
            .read_column(&AddressRange::parse("F2:F5").unwrap(), true)
            .unwrap();
        assert!(blank.is_empty());
        assert_eq!(blank.range().to_string(), "F2:F5");
    }

    #[test]
    fn test_mask_follows_classification() {
        let keys = DataColumn::new(
            AddressRange::parse("A2:A4").unwrap(),
            vec!["BP.L".to_string(), "".to_string(), "XYZ123".to_string()],
        );
        let tickers = TickerMap::classify(keys.values().iter().map(String::as_str));
        let frame = DataFrame::new(keys, &tickers, &[1, 2]);

        assert_eq!(frame.mask(), &[true, false, false]);
        assert_eq!(frame.masked_rows(), 1);
        assert_eq!(frame.columns()[1].range().to_string(), "C2:C4");
        assert!(!frame.has_data(7));
    }

    #[test]
    fn test_clear_and_write_only_masked_rows() {
        let mut grid = grid_with_keys(&["BP.L", "", "XYZ123", "VOD.L"]);
        let mut book = QuoteBook::default();
        book.insert("BP.L", QuoteRecord::new("452.35", "GBX"));

        {
            let mut sheet = DataSheet::new(&mut grid, SHEET);
            let keys = sheet
                .read_column(&AddressRange::parse("A2:A5").unwrap(), false)
                .unwrap();
            let tickers = TickerMap::classify(keys.values().iter().map(String::as_str));
            let mut frame = DataFrame::new(keys, &tickers, &[1, 2]);

            let stats = frame.update(&KeyedQuotes::new(&tickers, &book));
            assert_eq!(stats, UpdateStats { quoted: 1, defaulted: 1 });

            sheet.clear_frame(&frame).unwrap();
            sheet.write_frame(&frame).unwrap();
        }

        assert_eq!(grid.cell(SHEET, 1, 1), Some(&Cell::Number(452.35)));
        assert_eq!(grid.cell(SHEET, 2, 1), Some(&Cell::Text("GBX".into())));
        assert_eq!(grid.cell(SHEET, 1, 2), Some(&Cell::Text("stale".into())));
        assert_eq!(grid.cell(SHEET, 1, 3), Some(&Cell::Text("stale".into())));
        assert_eq!(grid.cell(SHEET, 2, 3), Some(&Cell::Text("stale".into())));
        assert_eq!(grid.cell(SHEET, 1, 4), Some(&Cell::Number(0.0)));
        assert_eq!(grid.cell(SHEET, 2, 4), Some(&Cell::Text("n/a".into())));
    }

    #[test]
    fn test_extra_destination_column_is_cleared_but_not_written() {
        let mut grid = grid_with_keys(&["TSCO"]);
        grid.write_cell_string(SHEET, 3, 1, "old").unwrap();
        let mut book = QuoteBook::default();
        book.insert("TSCO", QuoteRecord::new("", "GBX"));

        let mut sheet = DataSheet::new(&mut grid, SHEET);
        let keys = sheet
            .read_column(&AddressRange::parse("A2:A2").unwrap(), false)
            .unwrap();
        let tickers = TickerMap::classify(keys.values().iter().map(String::as_str));
        let mut frame = DataFrame::new(keys, &tickers, &[1, 2, 3]);
        frame.update(&KeyedQuotes::new(&tickers, &book));
        assert_eq!(frame.columns()[2].get(0), Some(&None));

        sheet.clear_frame(&frame).unwrap();
        sheet.write_frame(&frame).unwrap();
        drop(sheet);

        assert_eq!(grid.cell(SHEET, 1, 1), Some(&Cell::Text("".into())));
        assert_eq!(grid.cell(SHEET, 2, 1), Some(&Cell::Text("GBX".into())));
        assert_eq!(grid.cell(SHEET, 3, 1), None);
    }

    #[test]
    fn test_write_cell_coercion() {
        let mut grid = MemoryGrid::with_sheet(SHEET);
        let mut sheet = DataSheet::new(&mut grid, SHEET);
        let numeric = |text: &str| {
            Some(FieldValue {
                text: text.to_string(),
                format: FieldFormat::Numeric,
            })
        };

        sheet.write_cell(0, 0, &numeric(" 1.25 ")).unwrap();
        sheet.write_cell(0, 1, &numeric("n/a")).unwrap();
        sheet
            .write_cell(
                0,
                2,
                &Some(FieldValue {
                    text: "42".to_string(),
                    format: FieldFormat::Text,
                }),
            )
            .unwrap();
        sheet.write_cell(0, 3, &None).unwrap();
        drop(sheet);

        assert_eq!(grid.cell(SHEET, 0, 0), Some(&Cell::Number(1.25)));
        assert_eq!(grid.cell(SHEET, 0, 1), Some(&Cell::Text("n/a".into())));
        assert_eq!(grid.cell(SHEET, 0, 2), Some(&Cell::Text("42".into())));
        assert_eq!(grid.cell(SHEET, 0, 3), None);
    }
}
