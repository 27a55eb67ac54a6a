//! Grid collaborator: the cell store the sync reads keys from and writes quotes to.
//!
//! `Grid` is the narrow interface the batch I/O needs. `MemoryGrid` implements it
//! over named in-memory sheets and can move a sheet to and from CSV, which is how
//! the binary runs against a file.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::{Read, Write};

use log::debug;
use quote_common::{Result, SyncError};

/// Cell access by sheet name and zero-based coordinates.
pub trait Grid {
    /// Cell content as a string; empty for blank cells.
    fn read_cell_string(&self, sheet: &str, column: u32, row: u32) -> Result<String>;
    /// Store a number.
    fn write_cell_numeric(&mut self, sheet: &str, column: u32, row: u32, value: f64) -> Result<()>;
    /// Store a string.
    fn write_cell_string(&mut self, sheet: &str, column: u32, row: u32, value: &str) -> Result<()>;
    /// Blank a cell.
    fn clear_cell(&mut self, sheet: &str, column: u32, row: u32) -> Result<()>;
}

/// Typed cell content.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Numeric cell.
    Number(f64),
    /// Text cell.
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(value) => write!(f, "{}", value),
            Cell::Text(text) => f.write_str(text),
        }
    }
}

/// Sparse sheet keyed by `(row, column)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    cells: BTreeMap<(u32, u32), Cell>,
}

impl Sheet {
    /// Cell at a coordinate, `None` if blank.
    pub fn get(&self, column: u32, row: u32) -> Option<&Cell> {
        self.cells.get(&(row, column))
    }

    /// Store a cell.
    pub fn set(&mut self, column: u32, row: u32, cell: Cell) {
        self.cells.insert((row, column), cell);
    }

    /// Blank a cell.
    pub fn clear(&mut self, column: u32, row: u32) {
        self.cells.remove(&(row, column));
    }

    /// `(rows, columns)` needed to hold every non-blank cell.
    pub fn extent(&self) -> (u32, u32) {
        self.cells
            .keys()
            .fold((0, 0), |(rows, cols), &(row, col)| {
                (rows.max(row + 1), cols.max(col + 1))
            })
    }
}

/// Named sheets held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryGrid {
    sheets: HashMap<String, Sheet>,
}

impl MemoryGrid {
    /// An empty grid without sheets.
    pub fn new() -> Self {
        Self::default()
    }

    /// A grid with one empty sheet.
    pub fn with_sheet(name: &str) -> Self {
        let mut grid = Self::new();
        grid.add_sheet(name);
        grid
    }

    /// Add an empty sheet, keeping an existing one of the same name.
    pub fn add_sheet(&mut self, name: &str) -> &mut Sheet {
        self.sheets.entry(name.to_string()).or_default()
    }

    /// Sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    /// Cell by sheet name and coordinate, `None` if blank or the sheet is unknown.
    pub fn cell(&self, sheet: &str, column: u32, row: u32) -> Option<&Cell> {
        self.sheet(sheet).and_then(|s| s.get(column, row))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .get_mut(name)
            .ok_or_else(|| SyncError::UnknownSheet(name.to_string()))
    }

    /// Replace (or create) a sheet with the rows of a header-less CSV document.
    ///
    /// Every non-empty field becomes a text cell.
    pub fn load_csv<R: Read>(&mut self, name: &str, reader: R) -> Result<()> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut sheet = Sheet::default();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record.map_err(|e| SyncError::Grid(e.to_string()))?;
            for (column, field) in record.iter().enumerate() {
                if !field.is_empty() {
                    sheet.set(column as u32, row as u32, Cell::Text(field.to_string()));
                }
            }
        }

        debug!("loaded sheet {} with extent {:?}", name, sheet.extent());
        self.sheets.insert(name.to_string(), sheet);
        Ok(())
    }

    /// Write a sheet as a rectangular header-less CSV document.
    pub fn save_csv<W: Write>(&self, name: &str, writer: W) -> Result<()> {
        let sheet = self
            .sheet(name)
            .ok_or_else(|| SyncError::UnknownSheet(name.to_string()))?;
        let (rows, columns) = sheet.extent();

        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        for row in 0..rows {
            let record: Vec<String> = (0..columns)
                .map(|column| {
                    sheet
                        .get(column, row)
                        .map(|cell| cell.to_string())
                        .unwrap_or_default()
                })
                .collect();
            csv_writer
                .write_record(&record)
                .map_err(|e| SyncError::Grid(e.to_string()))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl Grid for MemoryGrid {
    fn read_cell_string(&self, sheet: &str, column: u32, row: u32) -> Result<String> {
        let sheet = self
            .sheet(sheet)
            .ok_or_else(|| SyncError::UnknownSheet(sheet.to_string()))?;
        Ok(sheet
            .get(column, row)
            .map(|cell| cell.to_string())
            .unwrap_or_default())
    }

    fn write_cell_numeric(
        &mut self,
        sheet: &str,
        column: u32,
        row: u32,
        value: f64,
    ) -> Result<()> {
        self.sheet_mut(sheet)?.set(column, row, Cell::Number(value));
        Ok(())
    }

    fn write_cell_string(
        &mut self,
        sheet: &str,
        column: u32,
        row: u32,
        value: &str,
    ) -> Result<()> {
        self.sheet_mut(sheet)?
            .set(column, row, Cell::Text(value.to_string()));
        Ok(())
    }

    fn clear_cell(&mut self, sheet: &str, column: u32, row: u32) -> Result<()> {
        self.sheet_mut(sheet)?.clear(column, row);
        Ok(())
    }
}
