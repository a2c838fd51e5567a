//! Top-level export entry points.
//!
//! Nothing here is atomic: on failure the partially filled workbook is
//! dropped, and a file is only written by the explicit save at the end.

use std::path::Path;

use tracing::debug;

use crate::conf::C_SHEET_NAME_DEFAULT;
use crate::spec::{
    Result, SpecResults, SpecSpreadsheetData, SpecSpreadsheetMetadata, SpecXlsxExportOptions,
    XlsxExportError,
};
use crate::workbook::XlsxWorkbook;
use crate::writer::{add_data_to_spreadsheet, add_metadata_to_spreadsheet, add_results_to_sheet};

////////////////////////////////////////////////////////////////////////////////
// #region UnlabeledExport

/// Save the raw series to `path` on `Sheet1`, without labels or metadata.
pub fn excelize(path: impl AsRef<Path>, results: Option<&SpecResults>) -> Result<()> {
    excelize_with_options(path, results, SpecXlsxExportOptions::default())
}

/// [`excelize`] with custom export options.
pub fn excelize_with_options(
    path: impl AsRef<Path>,
    results: Option<&SpecResults>,
    options: SpecXlsxExportOptions,
) -> Result<()> {
    let Some(results) = results else {
        return Err(XlsxExportError::InvalidArgument("undefined data".to_string()));
    };

    let mut workbook = XlsxWorkbook::with_options(options);
    add_results_to_sheet(&mut workbook, C_SHEET_NAME_DEFAULT, results)?;

    workbook.save(path)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LabeledExport

/// Build a workbook holding labeled data and, when given, its metadata.
///
/// Metadata is written first, on its own sheet. Sheet numbers are 1-based.
/// Labels are taken in the same order as the series.
pub fn excelize_with_labels(
    metadata: Option<&SpecSpreadsheetMetadata>,
    data: Option<&SpecSpreadsheetData>,
) -> Result<XlsxWorkbook> {
    excelize_with_labels_and_options(metadata, data, SpecXlsxExportOptions::default())
}

/// [`excelize_with_labels`] with custom export options.
pub fn excelize_with_labels_and_options(
    metadata: Option<&SpecSpreadsheetMetadata>,
    data: Option<&SpecSpreadsheetData>,
    options: SpecXlsxExportOptions,
) -> Result<XlsxWorkbook> {
    let data = validate_spreadsheet_data(data)?;

    let mut workbook = XlsxWorkbook::with_options(options);

    if let Some(metadata) = metadata {
        add_metadata_to_spreadsheet(&mut workbook, metadata)
            .map_err(|e| e.context("add_metadata_to_spreadsheet"))?;
    }

    add_data_to_spreadsheet(&mut workbook, data)
        .map_err(|e| e.context("add_data_to_spreadsheet"))?;

    debug!(sheets = ?workbook.sheet_names(), "built labeled workbook");
    Ok(workbook)
}

/// Build the labeled workbook and save it to `path`.
///
/// Metadata is optional; data must be valid.
pub fn new_excel_sheets_with_labels(
    path: impl AsRef<Path>,
    metadata: Option<&SpecSpreadsheetMetadata>,
    data: Option<&SpecSpreadsheetData>,
) -> Result<()> {
    let workbook =
        excelize_with_labels(metadata, data).map_err(|e| e.context("excelize_with_labels"))?;
    workbook.save(path)
}

fn validate_spreadsheet_data(data: Option<&SpecSpreadsheetData>) -> Result<&SpecSpreadsheetData> {
    let Some(data) = data else {
        return Err(XlsxExportError::InvalidArgument("undefined spreadsheet data".to_string()));
    };
    if data.sheet_start <= 0 {
        return Err(XlsxExportError::InvalidArgument(format!(
            "invalid sheet start index (must be > 0): {}",
            data.sheet_start
        )));
    }
    let Some(results) = data.data.as_ref() else {
        return Err(XlsxExportError::InvalidArgument("undefined results".to_string()));
    };
    if results.results.is_empty() {
        return Err(XlsxExportError::InvalidArgument("empty result dataset".to_string()));
    }
    Ok(data)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
