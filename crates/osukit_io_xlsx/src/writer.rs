//! Cell placement: sheet provisioning, result grids and metadata lines.

use tracing::{debug, warn};

use crate::conf::{C_SHEET_NAME_DEFAULT, EnumFmtKey, N_COL_IDX_KEY};
use crate::locator::find_row;
use crate::spec::{
    Result, SpecCellCoord, SpecDataPoint, SpecResults, SpecSpreadsheetData,
    SpecSpreadsheetMetadata, XlsxExportError,
};
use crate::util::{cast_col_num, create_sheet_identifier};
use crate::workbook::XlsxWorkbook;

////////////////////////////////////////////////////////////////////////////////
// #region SheetProvisioning

/// Return the identifier of 1-based sheet `sheet_num`, creating the sheet
/// unless it is the implicit `Sheet1`.
pub fn prepare_sheet(workbook: &mut XlsxWorkbook, sheet_num: i64) -> Result<String> {
    let sheet_id = create_sheet_identifier(sheet_num)?;
    if sheet_id != C_SHEET_NAME_DEFAULT {
        workbook.new_sheet(&sheet_id)?;
    }
    Ok(sheet_id)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridWriter

/// Write the values of one series into column `col`, one row per point.
///
/// Each point lands on the row holding its size in column `A`, searched from
/// `row_start` for the first point and from just below the previous point
/// afterwards. Sparse series therefore stay aligned with the key column.
pub fn add_values_to_sheet(
    workbook: &mut XlsxWorkbook,
    sheet_name: &str,
    row_start: u32,
    col: u16,
    data_points: &[SpecDataPoint],
) -> Result<()> {
    let fmt_key = workbook.options().fmt_key(EnumFmtKey::Value);
    let mut n_row = row_start;
    for dp in data_points {
        n_row = find_row(workbook, sheet_name, N_COL_IDX_KEY, n_row, dp.size)?;
        workbook.set_cell_value(sheet_name, SpecCellCoord::new(n_row, col), dp.value, fmt_key)?;
        n_row += 1;
    }
    Ok(())
}

/// Lay out `results` without labels: sizes in column `A` from row 1, series
/// `i` in column `1 + i`.
pub fn add_results_to_sheet(
    workbook: &mut XlsxWorkbook,
    sheet_name: &str,
    results: &SpecResults,
) -> Result<()> {
    write_result_grid(workbook, sheet_name, results, 1)
}

/// Lay out labeled data on sheet `data.sheet_start`.
///
/// Row 1 holds the labels from column `B` on (`A1` stays blank), column `A`
/// holds the sizes of the first series from row 2, and series `i` fills
/// column `1 + i` from row 2.
pub fn add_data_to_spreadsheet(
    workbook: &mut XlsxWorkbook,
    data: &SpecSpreadsheetData,
) -> Result<()> {
    let Some(results) = data.data.as_ref() else {
        return Err(XlsxExportError::InvalidArgument("undefined results".to_string()));
    };
    if data.labels.len() != results.results.len() {
        warn!(
            labels = data.labels.len(),
            series = results.results.len(),
            "label count does not match series count"
        );
    }

    let sheet_id =
        prepare_sheet(workbook, data.sheet_start).map_err(|e| e.context("prepare_sheet"))?;

    let fmt_key = workbook.options().fmt_key(EnumFmtKey::Header);
    for (n_idx, label) in data.labels.iter().enumerate() {
        let coord = SpecCellCoord::new(1, cast_col_num(n_idx + 1)?);
        workbook.set_cell_value(&sheet_id, coord, label.as_str(), fmt_key)?;
    }

    write_result_grid(workbook, &sheet_id, results, 2)
}

fn write_result_grid(
    workbook: &mut XlsxWorkbook,
    sheet_name: &str,
    results: &SpecResults,
    row_start: u32,
) -> Result<()> {
    let Some(result_first) = results.results.first() else {
        return Err(XlsxExportError::InvalidArgument("empty result dataset".to_string()));
    };

    let fmt_key = workbook.options().fmt_key(EnumFmtKey::Key);
    for (n_row, n_size) in (row_start..).zip(result_first.sizes()) {
        workbook.set_cell_value(
            sheet_name,
            SpecCellCoord::new(n_row, N_COL_IDX_KEY),
            n_size,
            fmt_key,
        )?;
    }

    for (n_idx, result) in results.results.iter().enumerate() {
        let n_col = cast_col_num(n_idx + 1)?;
        add_values_to_sheet(workbook, sheet_name, row_start, n_col, &result.data_points)
            .map_err(|e| e.context("add_values_to_sheet"))?;
    }

    debug!(
        sheet = sheet_name,
        series = results.results.len(),
        rows = result_first.data_points.len(),
        "wrote result grid"
    );
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MetadataWriter

/// Write the timestamp at `A1` and one content line per row below it, on
/// sheet `metadata.sheet_id`.
pub fn add_metadata_to_spreadsheet(
    workbook: &mut XlsxWorkbook,
    metadata: &SpecSpreadsheetMetadata,
) -> Result<()> {
    let sheet_id =
        prepare_sheet(workbook, metadata.sheet_id).map_err(|e| e.context("prepare_sheet"))?;

    let fmt_key = workbook.options().fmt_key(EnumFmtKey::Text);
    let l_lines = std::iter::once(metadata.timestamp.as_str())
        .chain(metadata.content.iter().map(String::as_str));
    for (n_row, c_line) in (1u32..).zip(l_lines) {
        workbook.set_cell_value(
            &sheet_id,
            SpecCellCoord::new(n_row, N_COL_IDX_KEY),
            c_line,
            fmt_key,
        )?;
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
