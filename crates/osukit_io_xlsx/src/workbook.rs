//! In-memory workbook builder serialized through `rust_xlsxwriter`.
//!
//! `rust_xlsxwriter` is write-only, while row location has to read back the
//! key column already placed on a sheet. Cells therefore live here until
//! [`XlsxWorkbook::save`] renders them in one pass.

use std::collections::BTreeMap;
use std::path::Path;

use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, FormatAlign, Workbook, Worksheet};
use tracing::debug;

use crate::conf::{C_SHEET_NAME_DEFAULT, EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX};
use crate::spec::{
    EnumCellValue, Result, SpecCell, SpecCellCoord, SpecCellFormat, SpecXlsxExportOptions,
    XlsxExportError,
};
use crate::util::{cast_col_num, cast_row_num, convert_cell_value};

static CELL_BLANK: EnumCellValue = EnumCellValue::None;

#[derive(Debug, Clone, PartialEq)]
struct SpecSheet {
    name: String,
    dict_cells: BTreeMap<SpecCellCoord, SpecCell>,
}

/// Exclusively owned workbook under construction.
///
/// Every writer takes it by `&mut`; nothing here is shared or global.
#[derive(Debug, Clone, PartialEq)]
pub struct XlsxWorkbook {
    l_sheets: Vec<SpecSheet>,
    options: SpecXlsxExportOptions,
}

impl Default for XlsxWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxWorkbook {
    /// Fresh workbook holding the implicit `Sheet1`.
    pub fn new() -> Self {
        Self::with_options(SpecXlsxExportOptions::default())
    }

    /// Fresh workbook with custom export options.
    pub fn with_options(options: SpecXlsxExportOptions) -> Self {
        Self {
            l_sheets: vec![SpecSheet {
                name: C_SHEET_NAME_DEFAULT.to_string(),
                dict_cells: BTreeMap::new(),
            }],
            options,
        }
    }

    pub fn options(&self) -> &SpecXlsxExportOptions {
        &self.options
    }

    /// Sheet names in creation order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.l_sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.l_sheets.iter().any(|sheet| sheet.name == name)
    }

    /// Create sheet `name` and return its 0-based position.
    ///
    /// Creating a sheet that already exists returns the existing position.
    pub fn new_sheet(&mut self, name: &str) -> Result<usize> {
        if let Some(n_idx) = self.l_sheets.iter().position(|sheet| sheet.name == name) {
            return Ok(n_idx);
        }
        if name.is_empty() || name.chars().count() > N_LEN_EXCEL_SHEET_NAME_MAX {
            return Err(XlsxExportError::InvalidArgument(format!(
                "invalid sheet name (1..={N_LEN_EXCEL_SHEET_NAME_MAX} chars): {name:?}"
            )));
        }
        self.l_sheets.push(SpecSheet {
            name: name.to_string(),
            dict_cells: BTreeMap::new(),
        });
        debug!(sheet = name, "created sheet");
        Ok(self.l_sheets.len() - 1)
    }

    /// Value stored at `coord`; blank cells yield [`EnumCellValue::None`].
    pub fn get_cell_value(
        &self,
        sheet_name: &str,
        coord: SpecCellCoord,
    ) -> Result<&EnumCellValue> {
        let sheet = self.sheet(sheet_name)?;
        Ok(sheet
            .dict_cells
            .get(&coord)
            .map_or(&CELL_BLANK, |cell| &cell.value))
    }

    /// Format preset stored at `coord`, if any.
    pub fn get_cell_format(
        &self,
        sheet_name: &str,
        coord: SpecCellCoord,
    ) -> Result<Option<EnumFmtKey>> {
        let sheet = self.sheet(sheet_name)?;
        Ok(sheet.dict_cells.get(&coord).and_then(|cell| cell.fmt_key))
    }

    /// Store `value` at `coord`, replacing any previous content.
    pub fn set_cell_value(
        &mut self,
        sheet_name: &str,
        coord: SpecCellCoord,
        value: impl Into<EnumCellValue>,
        fmt_key: Option<EnumFmtKey>,
    ) -> Result<()> {
        cast_row_num(coord.row as usize)?;
        cast_col_num(usize::from(coord.col))?;

        let sheet = self.sheet_mut(sheet_name)?;
        sheet.dict_cells.insert(
            coord,
            SpecCell {
                value: value.into(),
                fmt_key,
            },
        );
        Ok(())
    }

    /// Non-blank cells of one sheet in row-major order.
    pub fn cells(&self, sheet_name: &str) -> Result<Vec<(SpecCellCoord, &SpecCell)>> {
        let sheet = self.sheet(sheet_name)?;
        Ok(sheet
            .dict_cells
            .iter()
            .map(|(coord, cell)| (*coord, cell))
            .collect())
    }

    /// Serialize to an `.xlsx` file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut workbook = self.render()?;
        workbook.save(path)?;
        debug!(path = %path.display(), sheets = self.l_sheets.len(), "saved workbook");
        Ok(())
    }

    /// Serialize to an in-memory `.xlsx` payload.
    pub fn save_to_buffer(&self) -> Result<Vec<u8>> {
        let mut workbook = self.render()?;
        Ok(workbook.save_to_buffer()?)
    }

    fn sheet(&self, sheet_name: &str) -> Result<&SpecSheet> {
        self.l_sheets
            .iter()
            .find(|sheet| sheet.name == sheet_name)
            .ok_or_else(|| derive_unknown_sheet_error(sheet_name))
    }

    fn sheet_mut(&mut self, sheet_name: &str) -> Result<&mut SpecSheet> {
        self.l_sheets
            .iter_mut()
            .find(|sheet| sheet.name == sheet_name)
            .ok_or_else(|| derive_unknown_sheet_error(sheet_name))
    }

    fn render(&self) -> Result<Workbook> {
        let dict_fmt: BTreeMap<EnumFmtKey, Format> = self
            .options
            .formats
            .iter()
            .map(|(key, spec)| (*key, derive_rust_xlsx_format(spec)))
            .collect();

        let mut workbook = Workbook::new();
        if let Some(n_ts) = self.options.creation_timestamp {
            let creation_time = ExcelDateTime::from_timestamp(n_ts)?;
            workbook.set_properties(&DocProperties::new().set_creation_datetime(&creation_time));
        }
        for sheet in &self.l_sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            for (coord, cell) in &sheet.dict_cells {
                let format = cell.fmt_key.and_then(|key| dict_fmt.get(&key));
                let value = convert_cell_value(&cell.value, &self.options.value_policy);
                write_cell(worksheet, *coord, &value, format)?;
            }
        }
        Ok(workbook)
    }
}

fn derive_unknown_sheet_error(sheet_name: &str) -> XlsxExportError {
    XlsxExportError::InvalidArgument(format!("unknown sheet: {sheet_name:?}"))
}

fn write_cell(
    worksheet: &mut Worksheet,
    coord: SpecCellCoord,
    value: &EnumCellValue,
    format: Option<&Format>,
) -> Result<()> {
    // Stored rows are 1-based, rust_xlsxwriter rows are 0-based.
    let n_row = coord.row - 1;
    let n_col = coord.col;
    match (value, format) {
        (EnumCellValue::None, Some(format)) => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        (EnumCellValue::None, None) => {}
        (EnumCellValue::String(val), Some(format)) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        (EnumCellValue::String(val), None) => {
            worksheet.write_string(n_row, n_col, val)?;
        }
        (EnumCellValue::Number(val), Some(format)) => {
            worksheet.write_number_with_format(n_row, n_col, *val, format)?;
        }
        (EnumCellValue::Number(val), None) => {
            worksheet.write_number(n_row, n_col, *val)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }

    format
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_workbook_has_default_sheet_only() {
        let workbook = XlsxWorkbook::new();
        assert_eq!(workbook.sheet_names(), vec!["Sheet1"]);
    }

    #[test]
    fn test_new_sheet_is_idempotent() {
        let mut workbook = XlsxWorkbook::new();
        assert_eq!(workbook.new_sheet("Sheet3").unwrap(), 1);
        assert_eq!(workbook.new_sheet("Sheet3").unwrap(), 1);
        assert_eq!(workbook.new_sheet("Sheet1").unwrap(), 0);
        assert_eq!(workbook.sheet_names(), vec!["Sheet1", "Sheet3"]);
    }

    #[test]
    fn test_new_sheet_rejects_overlong_name() {
        let mut workbook = XlsxWorkbook::new();
        let err = workbook.new_sheet(&"x".repeat(32)).unwrap_err();
        assert!(err.to_string().contains("invalid sheet name"));
    }

    #[test]
    fn test_set_then_get_cell_value() {
        let mut workbook = XlsxWorkbook::new();
        let coord = SpecCellCoord::new(2, 1);
        workbook
            .set_cell_value("Sheet1", coord, 3.5, Some(EnumFmtKey::Value))
            .unwrap();

        assert_eq!(
            workbook.get_cell_value("Sheet1", coord).unwrap(),
            &EnumCellValue::Number(3.5)
        );
        assert_eq!(
            workbook.get_cell_format("Sheet1", coord).unwrap(),
            Some(EnumFmtKey::Value)
        );
        assert_eq!(
            workbook
                .get_cell_value("Sheet1", SpecCellCoord::new(9, 9))
                .unwrap(),
            &EnumCellValue::None
        );
    }

    #[test]
    fn test_set_cell_value_rejects_row_zero_and_unknown_sheet() {
        let mut workbook = XlsxWorkbook::new();
        assert!(
            workbook
                .set_cell_value("Sheet1", SpecCellCoord::new(0, 0), 1.0, None)
                .is_err()
        );
        assert!(
            workbook
                .set_cell_value("Sheet9", SpecCellCoord::new(1, 0), 1.0, None)
                .is_err()
        );
    }

    #[test]
    fn test_save_to_buffer_produces_zip_container() {
        let mut workbook = XlsxWorkbook::new();
        workbook.new_sheet("Sheet2").unwrap();
        workbook
            .set_cell_value("Sheet1", SpecCellCoord::new(1, 0), "label", Some(EnumFmtKey::Header))
            .unwrap();
        workbook
            .set_cell_value("Sheet2", SpecCellCoord::new(1, 1), f64::NAN, None)
            .unwrap();

        let v_bytes = workbook.save_to_buffer().unwrap();
        assert!(v_bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let mut workbook = XlsxWorkbook::new();
        workbook
            .set_cell_value("Sheet1", SpecCellCoord::new(1, 0), 1.0, None)
            .unwrap();

        workbook.save(&path).unwrap();
        let v_bytes = std::fs::read(&path).unwrap();
        assert!(v_bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_save_into_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        let err = XlsxWorkbook::new().save(&path).unwrap_err();
        assert_eq!(err.kind(), crate::spec::EnumExportErrorKind::Io);
    }
}
