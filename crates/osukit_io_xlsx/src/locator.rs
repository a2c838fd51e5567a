//! Row lookup by message size over an already written key column.

use tracing::trace;

use crate::conf::N_NROWS_EXCEL_MAX;
use crate::spec::{EnumCellValue, Result, SpecCellCoord, XlsxExportError};
use crate::util::cast_row_num;
use crate::workbook::XlsxWorkbook;

/// Scan column `col_ref` of `sheet_name` downward from `row_start` until a
/// cell equal to `key` is found, and return that 1-based row.
///
/// Precondition: `key` exists at or below `row_start`. Cells are compared
/// with exact float equality. Blank or non-numeric cells met before the
/// match fail with [`XlsxExportError::Parse`]. The scan is bounded by
/// [`crate::SpecXlsxExportOptions::row_scan_limit`] of `workbook` (default:
/// the sheet end) and fails with [`XlsxExportError::NotFound`] once
/// exhausted. A limit of zero is rejected.
pub fn find_row(
    workbook: &XlsxWorkbook,
    sheet_name: &str,
    col_ref: u16,
    row_start: u32,
    key: f64,
) -> Result<u32> {
    cast_row_num(row_start as usize)?;

    let n_rows_scan_max = match workbook.options().row_scan_limit {
        Some(0) => {
            return Err(XlsxExportError::InvalidArgument(
                "row_scan_limit must be >= 1".to_string(),
            ));
        }
        Some(n_limit) => n_limit,
        None => N_NROWS_EXCEL_MAX,
    };
    let n_row_end = (row_start as usize)
        .saturating_add(n_rows_scan_max - 1)
        .min(N_NROWS_EXCEL_MAX) as u32;

    for n_row in row_start..=n_row_end {
        let coord = SpecCellCoord::new(n_row, col_ref);
        let value = workbook.get_cell_value(sheet_name, coord)?;
        let n_size = parse_cell_as_f64(sheet_name, coord, value)?;
        if n_size == key {
            trace!(sheet = sheet_name, key, row = n_row, "located row");
            return Ok(n_row);
        }
    }

    Err(XlsxExportError::NotFound {
        sheet: sheet_name.to_string(),
        key,
        row_start,
        row_end: n_row_end,
    })
}

fn parse_cell_as_f64(
    sheet_name: &str,
    coord: SpecCellCoord,
    value: &EnumCellValue,
) -> Result<f64> {
    if let EnumCellValue::Number(n) = value {
        return Ok(*n);
    }
    let c_text = value.to_text();
    c_text.parse::<f64>().map_err(|source| XlsxExportError::Parse {
        sheet: sheet_name.to_string(),
        cell: coord.to_cell_ref(),
        text: c_text.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{EnumExportErrorKind, SpecXlsxExportOptions};

    fn create_workbook_with_sizes(l_sizes: &[f64]) -> XlsxWorkbook {
        let mut workbook = XlsxWorkbook::new();
        for (n_idx, n_size) in l_sizes.iter().enumerate() {
            let coord = SpecCellCoord::new(n_idx as u32 + 1, 0);
            workbook
                .set_cell_value("Sheet1", coord, *n_size, None)
                .unwrap();
        }
        workbook
    }

    #[test]
    fn test_find_row_returns_matching_row() {
        let workbook = create_workbook_with_sizes(&[1.0, 2.0, 4.0, 8.0]);
        assert_eq!(find_row(&workbook, "Sheet1", 0, 1, 4.0).unwrap(), 3);
        assert_eq!(find_row(&workbook, "Sheet1", 0, 1, 1.0).unwrap(), 1);
        assert_eq!(find_row(&workbook, "Sheet1", 0, 3, 8.0).unwrap(), 4);
    }

    #[test]
    fn test_find_row_parses_numeric_text() {
        let mut workbook = XlsxWorkbook::new();
        workbook
            .set_cell_value("Sheet1", SpecCellCoord::new(1, 0), "16", None)
            .unwrap();
        workbook
            .set_cell_value("Sheet1", SpecCellCoord::new(2, 0), "32", None)
            .unwrap();
        assert_eq!(find_row(&workbook, "Sheet1", 0, 1, 32.0).unwrap(), 2);
    }

    #[test]
    fn test_find_row_fails_on_non_numeric_cell() {
        let mut workbook = create_workbook_with_sizes(&[1.0]);
        workbook
            .set_cell_value("Sheet1", SpecCellCoord::new(2, 0), "size", None)
            .unwrap();
        workbook
            .set_cell_value("Sheet1", SpecCellCoord::new(3, 0), 4.0, None)
            .unwrap();

        let err = find_row(&workbook, "Sheet1", 0, 1, 4.0).unwrap_err();
        assert_eq!(err.kind(), EnumExportErrorKind::Parse);
        assert!(err.to_string().contains("Sheet1!A2"), "{err}");
    }

    #[test]
    fn test_find_row_fails_past_end_of_column() {
        let workbook = create_workbook_with_sizes(&[1.0, 2.0]);
        let err = find_row(&workbook, "Sheet1", 0, 1, 3.0).unwrap_err();
        assert_eq!(err.kind(), EnumExportErrorKind::Parse);
    }

    #[test]
    fn test_find_row_uses_exact_equality() {
        let workbook = create_workbook_with_sizes(&[0.1 + 0.2, 0.3]);
        assert_eq!(find_row(&workbook, "Sheet1", 0, 1, 0.3).unwrap(), 2);
    }

    #[test]
    fn test_find_row_stops_at_scan_limit() {
        let mut workbook = XlsxWorkbook::with_options(SpecXlsxExportOptions {
            row_scan_limit: Some(2),
            ..Default::default()
        });
        for n_row in 1..=4 {
            let coord = SpecCellCoord::new(n_row, 0);
            workbook
                .set_cell_value("Sheet1", coord, f64::from(n_row), None)
                .unwrap();
        }

        assert_eq!(find_row(&workbook, "Sheet1", 0, 2, 3.0).unwrap(), 3);
        let err = find_row(&workbook, "Sheet1", 0, 1, 4.0).unwrap_err();
        assert_eq!(err.kind(), EnumExportErrorKind::NotFound);
        assert_eq!(err.to_string(), "size 4 not found in Sheet1 (rows 1..=2)");
    }

    #[test]
    fn test_find_row_rejects_zero_scan_limit() {
        let mut workbook = XlsxWorkbook::with_options(SpecXlsxExportOptions {
            row_scan_limit: Some(0),
            ..Default::default()
        });
        workbook
            .set_cell_value("Sheet1", SpecCellCoord::new(1, 0), 1.0, None)
            .unwrap();

        let err = find_row(&workbook, "Sheet1", 0, 1, 1.0).unwrap_err();
        assert_eq!(err.kind(), EnumExportErrorKind::InvalidArgument);
        assert_eq!(err.to_string(), "row_scan_limit must be >= 1");
    }

    #[test]
    fn test_find_row_reports_blank_cell_as_empty_text() {
        let workbook = create_workbook_with_sizes(&[1.0]);
        let err = find_row(&workbook, "Sheet1", 0, 1, 2.0).unwrap_err();
        match err {
            XlsxExportError::Parse { cell, text, .. } => {
                assert_eq!(cell, "A2");
                assert_eq!(text, "");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_find_row_rejects_row_zero() {
        let workbook = create_workbook_with_sizes(&[1.0]);
        let err = find_row(&workbook, "Sheet1", 0, 0, 1.0).unwrap_err();
        assert_eq!(err.kind(), EnumExportErrorKind::InvalidArgument);
    }
}
