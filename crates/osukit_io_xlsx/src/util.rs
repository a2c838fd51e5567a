//! Stateless helper utilities used by the export kernel.

use crate::conf::{C_SHEET_NAME_PREFIX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX};
use crate::spec::{EnumCellValue, Result, SpecXlsxValuePolicy, XlsxExportError};

////////////////////////////////////////////////////////////////////////////////
// #region CoordinateCodec

/// Convert a zero-based column index to spreadsheet letters.
///
/// Bijective base-26: `0 -> "A"`, `25 -> "Z"`, `26 -> "AA"`, `701 -> "ZZ"`.
pub fn convert_col_index_to_name(col_idx: usize) -> String {
    let mut l_letters = Vec::new();
    let mut n_rest = col_idx;
    loop {
        l_letters.push(char::from(b'A' + (n_rest % 26) as u8));
        n_rest /= 26;
        if n_rest == 0 {
            break;
        }
        n_rest -= 1;
    }
    l_letters.iter().rev().collect()
}

/// Validate a 1-based row number against the Excel grid.
pub fn cast_row_num(value: usize) -> Result<u32> {
    if value == 0 || value > N_NROWS_EXCEL_MAX {
        return Err(XlsxExportError::InvalidArgument(format!(
            "row out of range (1..={N_NROWS_EXCEL_MAX}): {value}"
        )));
    }
    u32::try_from(value)
        .map_err(|_| XlsxExportError::InvalidArgument(format!("row index overflow: {value}")))
}

/// Validate a 0-based column index against the Excel grid.
pub fn cast_col_num(value: usize) -> Result<u16> {
    if value >= N_NCOLS_EXCEL_MAX {
        return Err(XlsxExportError::InvalidArgument(format!(
            "column out of range (0..{N_NCOLS_EXCEL_MAX}): {value}"
        )));
    }
    u16::try_from(value)
        .map_err(|_| XlsxExportError::InvalidArgument(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNaming

/// Create the identifier of 1-based sheet `sheet_num` (`Sheet1`, `Sheet2`, ...).
pub fn create_sheet_identifier(sheet_num: i64) -> Result<String> {
    if sheet_num <= 0 {
        return Err(XlsxExportError::InvalidArgument(format!(
            "invalid sheet index (must be > 0): {sheet_num}"
        )));
    }
    Ok(format!("{C_SHEET_NAME_PREFIX}{sheet_num}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to policy string; return `None` for finite values.
pub fn convert_nan_inf_to_str(x: f64, value_policy: &SpecXlsxValuePolicy) -> Option<String> {
    if x.is_nan() {
        return Some(value_policy.nan_str.clone());
    }
    if x.is_infinite() {
        return Some(if x.is_sign_positive() {
            value_policy.posinf_str.clone()
        } else {
            value_policy.neginf_str.clone()
        });
    }
    None
}

/// Normalize a cell value into something the xlsx format can store.
pub fn convert_cell_value(
    value: &EnumCellValue,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCellValue {
    match value {
        EnumCellValue::Number(n) => match convert_nan_inf_to_str(*n, value_policy) {
            Some(c_text) => EnumCellValue::String(c_text),
            None => EnumCellValue::Number(*n),
        },
        other => other.clone(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
