use std::collections::BTreeMap;
use std::ffi::{c_char, CStr, CString};
use std::path::PathBuf;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::docx::DocxDocument;
use crate::engine::DocumentTextEngine;
use crate::table::ReplacementTable;

static LAST_ERROR: Lazy<Mutex<Option<CString>>> = Lazy::new(|| Mutex::new(None));

fn set_last_error(msg: &str) {
    let c = CString::new(msg.replace('\0', " ")).unwrap_or_default();
    let mut guard = LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner());
    *guard = Some(c);
}

fn take_cstr(ptr: *const c_char, name: &str) -> Result<String, String> {
    if ptr.is_null() {
        return Err(format!("{name} is null"));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(|s| s.to_string())
        .map_err(|_| format!("{name} is not valid UTF-8"))
}

/// Fill placeholders in a DOCX file.
///
/// `replacements_json` is a JSON object of string values. `output_docx` may
/// be null to overwrite the input. Returns 0 on success; non-zero on failure
/// (see `wd_last_error_utf8()`).
#[no_mangle]
pub extern "C" fn wd_fill_docx(
    input_docx: *const c_char,
    output_docx: *const c_char,
    replacements_json: *const c_char,
) -> i32 {
    let input = match take_cstr(input_docx, "input_docx") {
        Ok(v) => PathBuf::from(v),
        Err(e) => {
            set_last_error(&e);
            return 2;
        }
    };
    let output = if output_docx.is_null() {
        None
    } else {
        match take_cstr(output_docx, "output_docx") {
            Ok(v) => Some(PathBuf::from(v)),
            Err(e) => {
                set_last_error(&e);
                return 3;
            }
        }
    };
    let json = match take_cstr(replacements_json, "replacements_json") {
        Ok(v) => v,
        Err(e) => {
            set_last_error(&e);
            return 4;
        }
    };

    let map: BTreeMap<String, String> = match serde_json::from_str(&json) {
        Ok(v) => v,
        Err(err) => {
            set_last_error(&format!("replacements_json: {err}"));
            return 5;
        }
    };
    let table = match ReplacementTable::from_pairs(map) {
        Ok(v) => v,
        Err(err) => {
            set_last_error(&err.to_string());
            return 6;
        }
    };

    let engine = DocumentTextEngine::new();
    let result = DocxDocument::open(&input).and_then(|mut doc| {
        engine.replace(&mut doc, &table)?;
        engine.save(&doc, output.as_deref())
    });
    match result {
        Ok(()) => 0,
        Err(err) => {
            set_last_error(&err.to_string());
            10
        }
    }
}

/// Read the text of a DOCX file, one line per paragraph.
///
/// Returns null on failure. A non-null result must be released with
/// `wd_free_string`.
#[no_mangle]
pub extern "C" fn wd_read_text(input_docx: *const c_char) -> *mut c_char {
    let input = match take_cstr(input_docx, "input_docx") {
        Ok(v) => PathBuf::from(v),
        Err(e) => {
            set_last_error(&e);
            return std::ptr::null_mut();
        }
    };
    let text = DocxDocument::open(&input).and_then(|doc| DocumentTextEngine::new().read_text(&doc));
    match text {
        Ok(t) => CString::new(t.replace('\0', " "))
            .map(CString::into_raw)
            .unwrap_or(std::ptr::null_mut()),
        Err(err) => {
            set_last_error(&err.to_string());
            std::ptr::null_mut()
        }
    }
}

/// # Safety
/// `s` must be null or a pointer returned by `wd_read_text`, freed at most once.
#[no_mangle]
pub unsafe extern "C" fn wd_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Returns the last error message as a UTF-8 C string pointer (or null if none).
/// The pointer is valid until the next failing call.
#[no_mangle]
pub extern "C" fn wd_last_error_utf8() -> *const c_char {
    let guard = LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner());
    match guard.as_ref() {
        Some(s) => s.as_ptr(),
        None => std::ptr::null(),
    }
}
