use crate::error::{with_last_error_mut, DefaultWindSimError, WindSimError, WindSimErrorCode};
use std::ffi::CString;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Set the thread-local error message and code.
/// Accepts any type implementing `WindSimError` trait.
pub(crate) fn set_last_error(error: &impl WindSimError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl WindSimError) -> WindSimErrorCode {
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result, or clear the last error on success.
pub(crate) fn track_result<T>(result: Result<T, DefaultWindSimError>) -> Result<T, WindSimErrorCode> {
    match result {
        Ok(value) => {
            clear_last_error();
            Ok(value)
        }
        Err(error) => Err(track_error(&error)),
    }
}

/// Collapse a unit result into the code returned across the boundary.
pub(crate) fn finish(result: Result<(), DefaultWindSimError>) -> WindSimErrorCode {
    match track_result(result) {
        Ok(()) => WindSimErrorCode::Ok,
        Err(code) => code,
    }
}

/// Clear the thread-local error message and code.
/// Called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = WindSimErrorCode::Ok;
    });
}

/// Borrow a non-null pointer, naming the parameter in the error otherwise.
///
/// # Safety
/// A non-null `ptr` must point to a live, properly aligned `T`.
pub(crate) unsafe fn ref_from_ptr<'a, T>(
    ptr: *const T,
    param_name: &str,
) -> Result<&'a T, DefaultWindSimError> {
    // SAFETY: the caller guarantees non-null pointers are valid
    unsafe { ptr.as_ref() }.ok_or_else(|| DefaultWindSimError::null_pointer(param_name))
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    name: &str,
) -> Result<RwLockReadGuard<'a, T>, DefaultWindSimError> {
    lock.read()
        .map_err(|_| DefaultWindSimError::lock_poisoned(name))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    name: &str,
) -> Result<RwLockWriteGuard<'a, T>, DefaultWindSimError> {
    lock.write()
        .map_err(|_| DefaultWindSimError::lock_poisoned(name))
}
