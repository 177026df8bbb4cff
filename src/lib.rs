//! Séance report DLL
//!
//! PDF-only FFI bridge: the host hands over observations as JSON and a
//! target path, the report is rendered and written there.

use std::ffi::CStr;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use libc::{c_char, c_int, size_t};
use seance_pdf_creator::{Observation, ReportOptions, ReportRenderer};

/// Render `observations_json` (a JSON array of observations) to `output_path`.
///
/// - `report_date`: `YYYY-MM-DD`, or null for today
/// - `assets_dir`: folder holding `images/` and `fonts/`, or null for `assets`
///
/// Returns 0 on success and -1 on any error; errors are logged.
#[no_mangle]
pub extern "C" fn generate_report_pdf_ffi(
    observations_json: *const c_char,
    report_date: *const c_char,
    assets_dir: *const c_char,
    output_path: *const c_char,
) -> c_int {
    if observations_json.is_null() || output_path.is_null() {
        log::error!("generate_report_pdf_ffi: observations and output path are required");
        return -1;
    }

    let observations_json =
        unsafe { CStr::from_ptr(observations_json).to_string_lossy().into_owned() };
    let output_path = unsafe { CStr::from_ptr(output_path).to_string_lossy().into_owned() };
    let report_date = unsafe { optional_str(report_date) };
    let assets_dir = unsafe { optional_str(assets_dir) };

    match generate_report(
        &observations_json,
        report_date.as_deref(),
        assets_dir.as_deref(),
        Path::new(&output_path),
    ) {
        Ok(_) => 0,
        Err(e) => {
            log::error!("Report generation failed: {:#}", e);
            -1
        }
    }
}

/// Write the suggested file name for `report_date` (null for today) into
/// `buffer`, NUL-terminated.
///
/// Returns the name length in bytes, or -1 when the date is invalid or the
/// buffer is too small.
#[no_mangle]
pub extern "C" fn report_filename_ffi(
    report_date: *const c_char,
    buffer: *mut c_char,
    buffer_len: size_t,
) -> c_int {
    if buffer.is_null() {
        return -1;
    }
    let report_date = unsafe { optional_str(report_date) };
    let date = match parse_report_date(report_date.as_deref()) {
        Ok(date) => date,
        Err(e) => {
            log::error!("{:#}", e);
            return -1;
        }
    };

    let name = seance_pdf_creator::report_filename(date);
    let bytes = name.as_bytes();
    if bytes.len() + 1 > buffer_len {
        return -1;
    }
    unsafe {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer as *mut u8, bytes.len());
        *buffer.add(bytes.len()) = 0;
    }
    bytes.len() as c_int
}

/// Trimmed contents of a C string, `None` when null or blank.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn optional_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let value = CStr::from_ptr(ptr).to_string_lossy().trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_report_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        None => Ok(Local::now().date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| anyhow!("invalid report date {:?}: {}", raw, e)),
    }
}

fn generate_report(
    observations_json: &str,
    report_date: Option<&str>,
    assets_dir: Option<&str>,
    output_path: &Path,
) -> Result<()> {
    let observations = Observation::list_from_json(observations_json)?;
    let date = parse_report_date(report_date)?;

    let mut options = ReportOptions::default();
    if let Some(dir) = assets_dir {
        options = options.with_assets_dir(dir);
    }

    let report = ReportRenderer::new(options).render(&observations, date)?;
    std::fs::write(output_path, &report.bytes)
        .with_context(|| format!("cannot write report to {}", output_path.display()))?;
    log::info!(
        "Wrote {} page(s) to {}",
        report.page_count(),
        output_path.display()
    );
    Ok(())
}
