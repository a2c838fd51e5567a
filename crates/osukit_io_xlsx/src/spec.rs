//! Shared export specification models.

use std::fmt;
use std::num::ParseFloatError;

use chrono::{SecondsFormat, Utc};
use rust_xlsxwriter::XlsxError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conf::{EnumFmtKey, derive_default_xlsx_formats};
use crate::util::convert_col_index_to_name;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification applied when a workbook is serialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellModel

/// Normalized cell value held by the in-memory workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Text as a spreadsheet would display it; blank cells yield `""`.
    pub fn to_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::String(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// One stored cell: value plus the format preset applied on save.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCell {
    /// Cell content.
    pub value: EnumCellValue,
    /// Format preset; `None` writes the cell unformatted.
    pub fmt_key: Option<EnumFmtKey>,
}

/// Typed cell address.
///
/// `row` is 1-based to match spreadsheet notation, `col` is 0-based so it
/// feeds [`convert_col_index_to_name`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecCellCoord {
    /// 1-based row number.
    pub row: u32,
    /// 0-based column index.
    pub col: u16,
}

impl SpecCellCoord {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Render as an `A1`-style reference.
    pub fn to_cell_ref(&self) -> String {
        format!("{}{}", convert_col_index_to_name(usize::from(self.col)), self.row)
    }
}

impl fmt::Display for SpecCellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell_ref())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region BenchmarkData

/// One benchmark measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecDataPoint {
    /// Message size in bytes.
    pub size: f64,
    /// Measured value (latency, bandwidth, ...).
    pub value: f64,
}

/// One benchmark run (one series).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecResult {
    pub data_points: Vec<SpecDataPoint>,
}

impl SpecResult {
    /// Build a series from `(size, value)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self {
            data_points: pairs
                .iter()
                .map(|&(size, value)| SpecDataPoint { size, value })
                .collect(),
        }
    }

    /// Message sizes in series order.
    pub fn sizes(&self) -> impl Iterator<Item = f64> + '_ {
        self.data_points.iter().map(|dp| dp.size)
    }
}

/// Several series sharing one ascending sequence of sizes.
///
/// Alignment of the size sequences is assumed, not checked.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecResults {
    pub results: Vec<SpecResult>,
}

/// Data to save plus where to save it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecSpreadsheetData {
    /// 1-based sheet number receiving the grid.
    pub sheet_start: i64,
    /// Benchmark series; `None` is rejected at export time.
    pub data: Option<SpecResults>,
    /// One label per series, same order as `data`.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Free-form description of an experiment, saved on its own sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecSpreadsheetMetadata {
    /// 1-based sheet number receiving the metadata.
    pub sheet_id: i64,
    /// Experiment timestamp, written as-is.
    pub timestamp: String,
    /// One element per spreadsheet line (single column).
    #[serde(default)]
    pub content: Vec<String>,
}

impl SpecSpreadsheetMetadata {
    /// Metadata stamped with the current UTC time (RFC 3339).
    pub fn with_timestamp_now(sheet_id: i64, content: Vec<String>) -> Self {
        Self {
            sheet_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            content,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region BenchmarkInstall

/// Static benchmark configuration (what never changes at runtime).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecBenchmarkConfig {
    /// Download URL of the benchmark sources.
    pub url: String,
    /// Tarball file name.
    pub tarball: String,
}

/// One installed sub-benchmark binary.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecSubBenchmarkInfo {
    pub name: String,
    pub bin_path: String,
}

/// Everything known about one benchmark installation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpecBenchmarkInstall {
    pub sub_benchmarks: Vec<SpecSubBenchmarkInfo>,
}

impl SpecBenchmarkInstall {
    /// Look up a sub-benchmark by exact name.
    pub fn find_sub_benchmark(&self, name: &str) -> Option<&SpecSubBenchmarkInfo> {
        self.sub_benchmarks.iter().find(|info| info.name == name)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ExportOptions

/// Replacement text for values the xlsx format cannot store as numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            nan_str: "NaN".to_string(),
            posinf_str: "Inf".to_string(),
            neginf_str: "-Inf".to_string(),
        }
    }
}

/// Export-wide options.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecXlsxExportOptions {
    /// Non-finite value conversion policy.
    pub value_policy: SpecXlsxValuePolicy,
    /// Max rows the row locator inspects per lookup; `None` scans to the sheet end.
    pub row_scan_limit: Option<usize>,
    /// Tag written cells with format presets.
    pub if_apply_formats: bool,
    /// Format presets resolved at save time.
    pub formats: std::collections::BTreeMap<EnumFmtKey, SpecCellFormat>,
    /// Document creation time as Unix seconds; `None` stamps the save time.
    pub creation_timestamp: Option<i64>,
}

impl Default for SpecXlsxExportOptions {
    fn default() -> Self {
        Self {
            value_policy: SpecXlsxValuePolicy::default(),
            row_scan_limit: None,
            if_apply_formats: true,
            formats: derive_default_xlsx_formats(),
            creation_timestamp: None,
        }
    }
}

impl SpecXlsxExportOptions {
    /// Preset key to tag a cell with, honoring `if_apply_formats`.
    pub fn fmt_key(&self, key: EnumFmtKey) -> Option<EnumFmtKey> {
        self.if_apply_formats.then_some(key)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Coarse classification of [`XlsxExportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumExportErrorKind {
    InvalidArgument,
    Parse,
    NotFound,
    Io,
}

/// Export failure.
#[derive(Debug, Error)]
pub enum XlsxExportError {
    /// Missing or out-of-range input.
    #[error("{0}")]
    InvalidArgument(String),
    /// A reference-column cell is not a float.
    #[error("unable to parse {text:?} at {sheet}!{cell}: {source}")]
    Parse {
        /// Sheet being scanned.
        sheet: String,
        /// `A1`-style reference of the offending cell.
        cell: String,
        /// Raw cell text.
        text: String,
        #[source]
        source: ParseFloatError,
    },
    /// The row locator gave up before finding the key.
    #[error("size {key} not found in {sheet} (rows {row_start}..={row_end})")]
    NotFound {
        /// Sheet being scanned.
        sheet: String,
        /// Key searched for.
        key: f64,
        /// First scanned row.
        row_start: u32,
        /// Last scanned row.
        row_end: u32,
    },
    /// Serialization failure from `rust_xlsxwriter`.
    #[error(transparent)]
    Io(#[from] XlsxError),
    /// Failure inside a named operation.
    #[error("{op}() failed: {source}")]
    Context {
        /// Operation that failed.
        op: &'static str,
        #[source]
        source: Box<XlsxExportError>,
    },
}

impl XlsxExportError {
    /// Kind of the innermost error.
    pub fn kind(&self) -> EnumExportErrorKind {
        match self {
            Self::InvalidArgument(_) => EnumExportErrorKind::InvalidArgument,
            Self::Parse { .. } => EnumExportErrorKind::Parse,
            Self::NotFound { .. } => EnumExportErrorKind::NotFound,
            Self::Io(_) => EnumExportErrorKind::Io,
            Self::Context { source, .. } => source.kind(),
        }
    }

    /// Wrap with the name of the failing operation.
    pub fn context(self, op: &'static str) -> Self {
        Self::Context {
            op,
            source: Box::new(self),
        }
    }
}

pub type Result<T, E = XlsxExportError> = std::result::Result<T, E>;

// #endregion
////////////////////////////////////////////////////////////////////////////////
