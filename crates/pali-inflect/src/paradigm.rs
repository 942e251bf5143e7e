//! Normalisation of raw template grids.
//!
//! Raw grids interleave value and label columns: in every data row the odd
//! columns hold endings and the column to their right holds the cell title.
//! This module is the only place that knows about that layout.

use pali_types::Grid;
use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TemplateError {
    #[error("header row, column {column}: category label is empty")]
    EmptyHeader { column: usize },
    #[error("row {row}: grammatical role label is missing")]
    MissingRoleLabel { row: usize },
    #[error("row {row}, column {column}: endings have no title in the following column")]
    MissingTitle { row: usize, column: usize },
}

/// A template grid with titles attached to the cells they describe.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Paradigm {
    /// False only for an empty grid, which renders no rows at all.
    pub has_header: bool,
    /// Category labels from the header row (e.g. `singular`, `plural`).
    pub headers: Vec<String>,
    pub rows: Vec<ParadigmRow>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParadigmRow {
    /// Grammatical role, e.g. `nom` or `3rd`.
    pub label: String,
    pub cells: Vec<Cell>,
}

/// One table cell: every ending that shares it, plus its tooltip title.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cell {
    pub endings: Vec<String>,
    pub title: String,
}

impl Paradigm {
    /// Convert a raw grid, checking the value/label interleaving.
    ///
    /// Value columns with no endings produce no cell.
    pub fn from_grid(grid: &Grid) -> Result<Self, TemplateError> {
        let mut paradigm = Paradigm::default();
        let mut rows = grid.iter().enumerate();

        if let Some((_, header_row)) = rows.next() {
            paradigm.has_header = true;
            for (column, cell) in header_row.iter().enumerate().skip(1).step_by(2) {
                let label = cell
                    .first()
                    .ok_or(TemplateError::EmptyHeader { column })?;
                paradigm.headers.push(label.clone());
            }
        }

        for (row, row_data) in rows {
            let label = row_data
                .first()
                .and_then(|cell| cell.first())
                .ok_or(TemplateError::MissingRoleLabel { row })?;

            let mut cells = Vec::new();
            for (column, endings) in row_data.iter().enumerate().skip(1).step_by(2) {
                if endings.is_empty() {
                    continue;
                }
                let title = row_data
                    .get(column + 1)
                    .and_then(|cell| cell.first())
                    .ok_or(TemplateError::MissingTitle { row, column })?;
                cells.push(Cell {
                    endings: endings.clone(),
                    title: title.clone(),
                });
            }

            paradigm.rows.push(ParadigmRow {
                label: label.clone(),
                cells,
            });
        }

        Ok(paradigm)
    }
}
