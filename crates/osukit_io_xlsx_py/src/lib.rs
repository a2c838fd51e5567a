use osukit_io_xlsx::conf::derive_default_xlsx_export_options;
use osukit_io_xlsx::{
    EnumExportErrorKind, SpecResult, SpecResults, SpecSpreadsheetData, SpecSpreadsheetMetadata,
    SpecXlsxExportOptions, XlsxExportError, excelize_with_labels_and_options,
    excelize_with_options,
};
use pyo3::exceptions::{PyLookupError, PyOSError, PyValueError};
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "osukit.xlsx.export.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

/// Error detached from the kernel so it can cross `allow_threads`.
struct SpecBridgeError {
    kind: EnumExportErrorKind,
    message: String,
}

impl From<XlsxExportError> for SpecBridgeError {
    fn from(exception: XlsxExportError) -> Self {
        Self {
            kind: exception.kind(),
            message: exception.to_string(),
        }
    }
}

fn map_export_error(exception: SpecBridgeError) -> PyErr {
    match exception.kind {
        EnumExportErrorKind::InvalidArgument | EnumExportErrorKind::Parse => {
            PyValueError::new_err(exception.message)
        }
        EnumExportErrorKind::NotFound => PyLookupError::new_err(exception.message),
        EnumExportErrorKind::Io => PyOSError::new_err(exception.message),
    }
}

fn derive_results_from_pairs(results: Vec<Vec<(f64, f64)>>) -> SpecResults {
    SpecResults {
        results: results
            .iter()
            .map(|pairs| SpecResult::from_pairs(pairs))
            .collect(),
    }
}

fn derive_export_options(
    row_scan_limit: Option<usize>,
    if_apply_formats: bool,
) -> SpecXlsxExportOptions {
    SpecXlsxExportOptions {
        row_scan_limit,
        if_apply_formats,
        ..derive_default_xlsx_export_options()
    }
}

#[pyfunction(name = "excelize")]
#[pyo3(signature = (file_out, results, row_scan_limit = None, if_apply_formats = true))]
fn excelize_py(
    py: Python<'_>,
    file_out: String,
    results: Vec<Vec<(f64, f64)>>,
    row_scan_limit: Option<usize>,
    if_apply_formats: bool,
) -> PyResult<()> {
    let spec_results = derive_results_from_pairs(results);
    let options = derive_export_options(row_scan_limit, if_apply_formats);

    py.allow_threads(|| {
        excelize_with_options(&file_out, Some(&spec_results), options)
            .map_err(SpecBridgeError::from)
    })
    .map_err(map_export_error)
}

#[pyfunction(name = "excelize_with_labels")]
#[pyo3(signature = (
    file_out,
    results,
    labels,
    sheet_start = 1,
    metadata_sheet_id = None,
    metadata_timestamp = None,
    metadata_content = None,
    row_scan_limit = None,
    if_apply_formats = true
))]
#[allow(clippy::too_many_arguments)]
fn excelize_with_labels_py(
    py: Python<'_>,
    file_out: String,
    results: Vec<Vec<(f64, f64)>>,
    labels: Vec<String>,
    sheet_start: i64,
    metadata_sheet_id: Option<i64>,
    metadata_timestamp: Option<String>,
    metadata_content: Option<Vec<String>>,
    row_scan_limit: Option<usize>,
    if_apply_formats: bool,
) -> PyResult<()> {
    let spec_metadata = match metadata_sheet_id {
        Some(sheet_id) => {
            let content = metadata_content.unwrap_or_default();
            Some(match metadata_timestamp {
                Some(timestamp) => SpecSpreadsheetMetadata {
                    sheet_id,
                    timestamp,
                    content,
                },
                None => SpecSpreadsheetMetadata::with_timestamp_now(sheet_id, content),
            })
        }
        None if metadata_timestamp.is_some() || metadata_content.is_some() => {
            return Err(PyValueError::new_err(
                "metadata_sheet_id is required when metadata is given",
            ));
        }
        None => None,
    };
    let spec_data = SpecSpreadsheetData {
        sheet_start,
        data: Some(derive_results_from_pairs(results)),
        labels,
    };
    let options = derive_export_options(row_scan_limit, if_apply_formats);

    py.allow_threads(|| -> Result<(), SpecBridgeError> {
        let workbook =
            excelize_with_labels_and_options(spec_metadata.as_ref(), Some(&spec_data), options)?;
        workbook.save(&file_out)?;
        Ok(())
    })
    .map_err(map_export_error)
}

#[pymodule]
fn _osukit_io_xlsx_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_function(wrap_pyfunction!(excelize_py, module)?)?;
    module.add_function(wrap_pyfunction!(excelize_with_labels_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
