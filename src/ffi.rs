//! FFI interface for C/C++ interop
//!
//! Documents go in as UTF-8 byte ranges, results come back as JSON strings.
//! Both pointers of a returned [`PricingResultFFI`] are owned by Rust.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use chrono::Utc;
use serde::Serialize;

use crate::aggregate::{extract_all, BatchRequest};
use crate::config::ExtractorConfig;
use crate::error::{PricingError, Result};
use crate::extractors::Provider;

/// Result struct returned across the FFI boundary.
/// Exactly one pointer is non-null; free both via `free_pricing_result`.
#[repr(C)]
pub struct PricingResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Extract one provider's pricing from a captured page.
///
/// # Arguments
/// * `provider` - Provider name, case-insensitive (null-terminated)
/// * `html_ptr` - Pointer to page content (UTF-8, not necessarily null-terminated); null means no page
/// * `html_len` - Length of page content in bytes
/// * `config_json` - JSON-serialized ExtractorConfig (null-terminated), or null for defaults
///
/// # Returns
/// PricingResultFFI with json_ptr holding a serialized ProviderResult on success
///
/// # Safety
/// - `provider` must be a valid null-terminated C string
/// - `html_ptr` must point to valid memory of at least `html_len` bytes, or be null
/// - `config_json` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_pricing_result`
#[no_mangle]
pub unsafe extern "C" fn extract_pricing_ffi(
    provider: *const c_char,
    html_ptr: *const c_char,
    html_len: usize,
    config_json: *const c_char,
) -> PricingResultFFI {
    let outcome = read_c_str(provider, "provider").and_then(|name| {
        let provider: Provider = name.parse()?;
        let html = read_html(html_ptr, html_len)?;
        let config = read_config(config_json)?;
        Ok(provider.run(html, &config, Utc::now()))
    });

    into_ffi(outcome)
}

/// Extract several providers in one call.
///
/// `request_json` is a serialized BatchRequest:
/// `{"documents": [{"provider": "claude", "html": "..."}], "config": {...}}`.
/// On success json_ptr holds a serialized PricingSnapshot.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string
/// - Caller must free the result via `free_pricing_result`
#[no_mangle]
pub unsafe extern "C" fn extract_pricing_batch_ffi(request_json: *const c_char) -> PricingResultFFI {
    let outcome = read_c_str(request_json, "request JSON").and_then(|json| {
        let request: BatchRequest = serde_json::from_str(json)?;
        Ok(extract_all(&request.documents, &request.config.sanitized(), Utc::now()))
    });

    into_ffi(outcome)
}

/// Free a PricingResultFFI returned by one of the extract functions
///
/// # Safety
/// - `result` must have been returned by `extract_pricing_ffi` or `extract_pricing_batch_ffi`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_pricing_result(result: PricingResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

unsafe fn read_c_str<'a>(ptr: *const c_char, what: &'static str) -> Result<&'a str> {
    if ptr.is_null() {
        return Err(PricingError::NullPointer(what));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| PricingError::InvalidUtf8(what))
}

unsafe fn read_html<'a>(html_ptr: *const c_char, html_len: usize) -> Result<Option<&'a str>> {
    if html_ptr.is_null() || html_len == 0 {
        return Ok(None);
    }
    let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
    std::str::from_utf8(slice)
        .map(Some)
        .map_err(|_| PricingError::InvalidUtf8("HTML content"))
}

unsafe fn read_config(config_json: *const c_char) -> Result<ExtractorConfig> {
    if config_json.is_null() {
        return Ok(ExtractorConfig::default());
    }
    let json = read_c_str(config_json, "config JSON")?;
    Ok(serde_json::from_str::<ExtractorConfig>(json)?.sanitized())
}

fn to_json<T: Serialize>(value: &T) -> Result<CString> {
    let json = serde_json::to_string(value)?;
    CString::new(json).map_err(|_| PricingError::NulByte)
}

fn into_ffi<T: Serialize>(outcome: Result<T>) -> PricingResultFFI {
    match outcome.and_then(|value| to_json(&value)) {
        Ok(cstr) => PricingResultFFI {
            json_ptr: cstr.into_raw(),
            error_ptr: ptr::null_mut(),
        },
        Err(e) => make_error_result(&e.to_string()),
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> PricingResultFFI {
    let error_cstr = CString::new(msg.replace('\0', "")).unwrap_or_default();
    PricingResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}
