//! FFI bindings for DhakaSeis
//!
//! This module provides C-compatible functions for calling DhakaSeis from other
//! languages. All functions use C strings (null-terminated) and return allocated
//! memory that must be freed by the caller using `seis_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::assessment::{assess_site_json, AssessmentRequest, SiteAssessor};
use crate::error::SeismicError;
use crate::report::ReportEncoder;
use crate::site::SiteTable;
use crate::spectrum::{evaluate_spectrum, peak_acceleration, period_grid};
use crate::types::SoilProfile;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Map a library result to a C string, recording the error on failure
fn result_to_cstr(result: Result<String, SeismicError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Assess a site against the built-in table and return a JSON report.
///
/// # Safety
/// - `location` and `soil_class` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `seis_free_string`.
/// - Returns NULL on error; call `seis_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn seis_assess_site(
    location: *const c_char,
    soil_class: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let location = match cstr_to_string(location) {
        Some(s) => s,
        None => {
            set_last_error("Invalid location string pointer");
            return ptr::null_mut();
        }
    };

    let soil_class = match cstr_to_string(soil_class) {
        Some(s) => s,
        None => {
            set_last_error("Invalid soil class string pointer");
            return ptr::null_mut();
        }
    };

    result_to_cstr(assess_site_json(&location, &soil_class))
}

/// Evaluate a spectrum for explicit parameters and return a JSON array of Sa (g).
///
/// The periods are `samples` evenly spaced values over `[start_s, end_s]`.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `seis_free_string`.
/// - Returns NULL on error; call `seis_last_error` to get the error message.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn seis_spectrum(
    zone_coefficient: f64,
    s: f64,
    tb: f64,
    tc: f64,
    td: f64,
    start_s: f64,
    end_s: f64,
    samples: u32,
) -> *mut c_char {
    clear_last_error();

    let result = SoilProfile::new(s, tb, tc, td, "")
        .and_then(|profile| {
            let periods = period_grid(start_s, end_s, samples as usize)?;
            evaluate_spectrum(zone_coefficient, &profile, &periods)
        })
        .and_then(|sa| serde_json::to_string(&sa).map_err(SeismicError::JsonError));

    result_to_cstr(result)
}

/// Peak of a spectral acceleration array.
///
/// # Safety
/// - `values` must point to `len` readable `f64` values (may be NULL when `len` is 0).
/// - `out` must be a valid pointer to write the peak to.
/// - Returns 0 on success, non-zero on error.
/// - On error, call `seis_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn seis_peak_acceleration(
    values: *const f64,
    len: usize,
    out: *mut f64,
) -> i32 {
    clear_last_error();

    if out.is_null() {
        set_last_error("Null output pointer");
        return -1;
    }

    let slice: &[f64] = if len == 0 {
        &[]
    } else if values.is_null() {
        set_last_error("Null values pointer");
        return -1;
    } else {
        std::slice::from_raw_parts(values, len)
    };

    match peak_acceleration(slice) {
        Ok(peak) => {
            *out = peak;
            0
        }
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

// ============================================================================
// Assessor API
// ============================================================================

/// Opaque handle to a SiteAssessor
pub struct SeisAssessorHandle {
    assessor: SiteAssessor,
    encoder: ReportEncoder,
}

/// Create an assessor.
///
/// # Safety
/// - `table_json` may be NULL to use the built-in table, otherwise it must be a
///   valid null-terminated C string holding a site table.
/// - Returns a pointer that must be freed with `seis_assessor_free`.
/// - Returns NULL on error; call `seis_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn seis_assessor_new(table_json: *const c_char) -> *mut SeisAssessorHandle {
    clear_last_error();

    let assessor = if table_json.is_null() {
        SiteAssessor::builtin()
    } else {
        let json = match cstr_to_string(table_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid table JSON string pointer");
                return ptr::null_mut();
            }
        };

        match SiteTable::from_json(&json) {
            Ok(table) => SiteAssessor::new(table, Default::default()),
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let handle = Box::new(SeisAssessorHandle {
        assessor,
        encoder: ReportEncoder::new(),
    });
    Box::into_raw(handle)
}

/// Free an assessor.
///
/// # Safety
/// - `assessor` must be a valid pointer returned by `seis_assessor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn seis_assessor_free(assessor: *mut SeisAssessorHandle) {
    if !assessor.is_null() {
        drop(Box::from_raw(assessor));
    }
}

/// Assess a site with an assessor and return a JSON report.
///
/// # Safety
/// - `assessor` must be a valid pointer returned by `seis_assessor_new`.
/// - `location` and `soil_class` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `seis_free_string`.
/// - Returns NULL on error; call `seis_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn seis_assessor_assess(
    assessor: *const SeisAssessorHandle,
    location: *const c_char,
    soil_class: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if assessor.is_null() {
        set_last_error("Null assessor pointer");
        return ptr::null_mut();
    }

    let handle = &*assessor;

    let location = match cstr_to_string(location) {
        Some(s) => s,
        None => {
            set_last_error("Invalid location string pointer");
            return ptr::null_mut();
        }
    };

    let soil_class = match cstr_to_string(soil_class) {
        Some(s) => s,
        None => {
            set_last_error("Invalid soil class string pointer");
            return ptr::null_mut();
        }
    };

    let request = AssessmentRequest::new(location, soil_class);
    let result = handle
        .assessor
        .assess(&request)
        .and_then(|assessment| handle.encoder.encode_to_json(&assessment));

    result_to_cstr(result)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by DhakaSeis functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a DhakaSeis function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn seis_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next DhakaSeis call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn seis_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn seis_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
