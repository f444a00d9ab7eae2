//! Typed block materialization.
//!
//! The segmenter hands over the surviving row lines of one test run; this
//! module turns them into equal-length per-column `f64` arrays or rejects
//! the whole block. Rejection is per-block and atomic: a structurally broken
//! block never aborts parsing of the rest of the transcript, and a partially
//! built block is never emitted.

use rayon::prelude::*;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::Serialize;
use thiserror::Error;

use super::registry::{TestKind, TestSchema};

/// Reasons a candidate block is discarded instead of materialized
#[derive(Debug, Error)]
pub enum BlockError {
    /// No row survived validation or salvage
    #[error("no surviving data rows")]
    Empty,

    /// A row slipped past validation with the wrong field count
    #[error("row {row}: {found} fields, expected {expected}")]
    ColumnMismatch {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// A field slipped past validation but does not parse as a number
    #[error("row {row}: unparseable value '{value}'")]
    BadValue { row: usize, value: String },
}

/// One fully materialized test run: schema-conformant numeric columns plus
/// the trailing metadata captured from its footer.
#[derive(Clone, Debug)]
pub struct TestBlock {
    schema: &'static TestSchema,
    /// Column-major data, schema order, equal lengths
    columns: Vec<Vec<f64>>,
    /// Completion annotation from the footer, verbatim
    pub meta: Option<String>,
    /// Producer-declared row count. Advisory only; never enforced.
    pub expected_samples: Option<usize>,
    /// True if any row needed salvage
    pub corrupted: bool,
}

impl TestBlock {
    pub fn kind(&self) -> TestKind {
        self.schema.kind
    }

    pub fn tag(&self) -> &'static str {
        self.schema.tag()
    }

    pub fn schema(&self) -> &'static TestSchema {
        self.schema
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Data for one column by name
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        let index = self.schema.columns().position(|c| c == name)?;
        self.columns.get(index).map(Vec::as_slice)
    }

    /// Ordered (name, data) pairs in schema order
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &[f64])> {
        self.schema
            .columns()
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Last value of the time column, 0 if empty
    pub fn duration_s(&self) -> f64 {
        self.column("time_s")
            .and_then(|c| c.last())
            .copied()
            .unwrap_or(0.0)
    }
}

/// Materialize validated/salvaged row lines into a typed block.
///
/// Rows are parsed in parallel; the first structural failure discards the
/// whole attempt.
pub(crate) fn build_block(
    schema: &'static TestSchema,
    rows: &[String],
    meta: Option<String>,
    expected_samples: Option<usize>,
    corrupted: bool,
) -> Result<TestBlock, BlockError> {
    if rows.is_empty() {
        return Err(BlockError::Empty);
    }
    let ncols = schema.column_count();

    let parsed: Vec<Vec<f64>> = rows
        .par_iter()
        .enumerate()
        .map(|(row, line)| {
            let fields: Vec<&str> = line.split(',').collect();
            if fields.len() != ncols {
                return Err(BlockError::ColumnMismatch {
                    row,
                    found: fields.len(),
                    expected: ncols,
                });
            }
            fields
                .iter()
                .map(|f| {
                    f.trim().parse::<f64>().map_err(|_| BlockError::BadValue {
                        row,
                        value: f.trim().to_string(),
                    })
                })
                .collect()
        })
        .collect::<Result<_, _>>()?;

    let mut columns: Vec<Vec<f64>> = (0..ncols)
        .map(|_| Vec::with_capacity(parsed.len()))
        .collect();
    for row in &parsed {
        for (column, value) in columns.iter_mut().zip(row) {
            column.push(*value);
        }
    }

    Ok(TestBlock {
        schema,
        columns,
        meta,
        expected_samples,
        corrupted,
    })
}

/// Ordered column-name → data-array map view for serialization
pub struct ColumnsView<'a>(&'a TestBlock);

impl Serialize for ColumnsView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.schema.column_count()))?;
        for (name, data) in self.0.columns() {
            map.serialize_entry(name, data)?;
        }
        map.end()
    }
}

impl Serialize for TestBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("TestBlock", 7)?;
        state.serialize_field("test_type", self.tag())?;
        state.serialize_field("columns", &ColumnsView(self))?;
        state.serialize_field("meta", self.meta.as_deref().unwrap_or(""))?;
        state.serialize_field("rows", &self.row_count())?;
        state.serialize_field("duration", &round3(self.duration_s()))?;
        state.serialize_field("expected_samples", &self.expected_samples)?;
        state.serialize_field("corrupted", &self.corrupted)?;
        state.end()
    }
}

/// One block as presented to consumers, with its 1-based trial number in
/// document order.
#[derive(Serialize)]
pub struct BlockJson<'a> {
    pub trial: usize,
    pub test_type: &'static str,
    pub columns: ColumnsView<'a>,
    pub meta: &'a str,
    pub rows: usize,
    pub duration: f64,
    pub expected_samples: Option<usize>,
    pub corrupted: bool,
}

/// Project parsed blocks into the wire shape consumed by the chart and
/// export layers.
pub fn blocks_to_json(blocks: &[TestBlock]) -> Vec<BlockJson<'_>> {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| BlockJson {
            trial: i + 1,
            test_type: block.tag(),
            columns: ColumnsView(block),
            meta: block.meta.as_deref().unwrap_or(""),
            rows: block.row_count(),
            duration: round3(block.duration_s()),
            expected_samples: block.expected_samples,
            corrupted: block.corrupted,
        })
        .collect()
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
