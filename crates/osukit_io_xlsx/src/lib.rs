//! `osukit_io_xlsx` v1:
//! Rust-side spreadsheet export kernel for OSU micro-benchmark results.
//!
//! Architecture:
//! - `conf`     : constants and default presets
//! - `spec`     : data models/options/errors
//! - `util`     : pure helper functions (column letters, sheet names, value policy)
//! - `workbook` : in-memory workbook builder and `.xlsx` serialization
//! - `locator`  : row lookup over the message-size column
//! - `writer`   : sheet provisioning, grid and metadata placement
//! - `export`   : top-level export entry points
pub mod conf;
pub mod export;
pub mod locator;
pub mod spec;
pub mod util;
pub mod workbook;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_DEFAULT, C_SHEET_NAME_PREFIX, EnumFmtKey, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
};
pub use export::{
    excelize, excelize_with_labels, excelize_with_labels_and_options, excelize_with_options,
    new_excel_sheets_with_labels,
};
pub use locator::find_row;
pub use spec::{
    EnumCellValue, EnumExportErrorKind, SpecBenchmarkConfig, SpecBenchmarkInstall, SpecCell,
    SpecCellCoord, SpecCellFormat, SpecDataPoint, SpecResult, SpecResults, SpecSpreadsheetData,
    SpecSpreadsheetMetadata, SpecSubBenchmarkInfo, SpecXlsxExportOptions, SpecXlsxValuePolicy,
    XlsxExportError,
};
pub use util::{convert_col_index_to_name, create_sheet_identifier};
pub use workbook::XlsxWorkbook;
pub use writer::{
    add_data_to_spreadsheet, add_metadata_to_spreadsheet, add_results_to_sheet,
    add_values_to_sheet, prepare_sheet,
};
