//! Plain-text presenters for both views.
//!
//! Both tables collect the events published by the aggregator and lay out
//! the text once the run is over.

use std::collections::HashMap;

use hm_core::grid::{GridCell, GridColumn, GridCoordinate, GridSink};
use hm_core::matrix::{ColumnState, MatrixCell, MatrixColumn, MatrixRow, MatrixSink};
use hm_core::models::RowHandle;
use tracing::debug;

const UNAVAILABLE: &str = "?";
const SEPARATOR: &str = "  ";

/// Text of a grid cell. Builds outside the resolved evaluations are
/// parenthesized.
pub fn grid_cell_text(cell: &GridCell) -> String {
    match cell {
        GridCell::Build {
            status,
            current: true,
            ..
        } => status.label.clone(),
        GridCell::Build { status, .. } => format!("({})", status.label),
        GridCell::Unavailable => String::from(UNAVAILABLE),
    }
}

/// Left-aligned columns, padded to the widest entry of each.
fn format_table(lines: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = Vec::new();
    for line in lines {
        for (index, entry) in line.iter().enumerate() {
            let width = entry.chars().count();
            match widths.get_mut(index) {
                Some(max) => *max = (*max).max(width),
                None => widths.push(width),
            }
        }
    }

    let mut out = String::new();
    for line in lines {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(entry, width)| format!("{entry:<width$}"))
            .collect();
        out.push_str(padded.join(SEPARATOR).trim_end());
        out.push('\n');
    }
    out
}

#[derive(Debug, Default)]
pub struct GridTable {
    header: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
}

impl GridTable {
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        let mut header = vec![String::from("job")];
        header.extend(self.header.iter().cloned());
        lines.push(header);
        for (job, cells) in &self.rows {
            let mut line = vec![job.clone()];
            line.extend(cells.iter().cloned());
            lines.push(line);
        }
        format_table(&lines)
    }
}

impl GridSink for GridTable {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn columns(&mut self, columns: &[GridColumn]) {
        self.header = columns.iter().map(|column| column.label.clone()).collect();
    }

    fn row_added(&mut self, row: RowHandle, job: &str) {
        debug!("Row {} is {job}", row.0);
        self.rows
            .push((job.to_string(), vec![String::new(); self.header.len()]));
    }

    fn set_cell(
        &mut self,
        row: RowHandle,
        column: usize,
        _coordinate: &GridCoordinate,
        cell: &GridCell,
    ) {
        if let Some(slot) = self
            .rows
            .get_mut(row.0)
            .and_then(|(_, cells)| cells.get_mut(column))
        {
            *slot = grid_cell_text(cell);
        }
    }
}

#[derive(Debug, Default)]
pub struct MatrixTable {
    columns: Vec<MatrixColumn>,
    rows: Vec<String>,
    /// Glyphs by (row, column, axis key).
    cells: HashMap<(usize, usize, String), String>,
}

impl MatrixTable {
    pub fn render(&self) -> String {
        let mut titles = vec![String::from("test")];
        let mut axes = vec![String::new()];
        for column in &self.columns {
            for (index, axis) in column.axis.iter().enumerate() {
                titles.push(match (index, column.state) {
                    (0, ColumnState::Failed) => format!("{} (failed)", column.title),
                    (0, _) => column.title.clone(),
                    _ => String::new(),
                });
                axes.push(axis.label.clone());
            }
        }

        let mut lines = vec![titles, axes];
        for (row, display) in self.rows.iter().enumerate() {
            let mut line = vec![display.clone()];
            for (index, column) in self.columns.iter().enumerate() {
                for axis in &column.axis {
                    let glyph = match column.state {
                        ColumnState::Failed => String::from(UNAVAILABLE),
                        _ => self
                            .cells
                            .get(&(row, index, axis.key.clone()))
                            .cloned()
                            .unwrap_or_default(),
                    };
                    line.push(glyph);
                }
            }
            lines.push(line);
        }
        format_table(&lines)
    }
}

impl MatrixSink for MatrixTable {
    fn reset(&mut self) {
        *self = Self::default();
    }

    fn header(&mut self, columns: &[MatrixColumn]) {
        self.columns = columns.to_vec();
    }

    fn column_header(&mut self, column: usize, header: &MatrixColumn) {
        if let Some(slot) = self.columns.get_mut(column) {
            *slot = header.clone();
        }
    }

    fn row_added(&mut self, _row: RowHandle, test: &MatrixRow) {
        self.rows.push(test.display.clone());
    }

    fn set_cell(&mut self, row: RowHandle, column: usize, cell: &MatrixCell) {
        self.cells
            .insert((row.0, column, cell.axis.clone()), cell.glyph.clone());
    }

    fn column_failed(&mut self, column: usize, header: &MatrixColumn) {
        self.column_header(column, header);
    }
}
