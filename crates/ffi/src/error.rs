use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use wind_sim_core::SerializationError;

/// Common interface for FFI error types.
///
/// # Design
/// - `code()` - Returns the error code to be passed across FFI boundary
/// - `msg()` - Returns the error message for diagnostic purposes
pub(crate) trait WindSimError {
    /// Returns the error code to be returned across the FFI boundary.
    fn code(&self) -> WindSimErrorCode;

    /// Returns the human-readable error message.
    fn msg(&self) -> &str;
}

/// Default implementation of `WindSimError` for common FFI error scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultWindSimError {
    code: WindSimErrorCode,
    msg: String,
}

impl DefaultWindSimError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"out_instance"`, `"source"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: WindSimErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for poisoned lock.
    ///
    /// # Arguments
    /// * `lock_name` - The name of the lock that was poisoned (e.g., `"simulation"`)
    pub fn lock_poisoned(lock_name: &str) -> Self {
        Self {
            code: WindSimErrorCode::LockPoisoned,
            msg: format!("Lock '{lock_name}' was poisoned by a panic in another thread"),
        }
    }

    /// Create error for invalid grid dimensions with a custom message.
    ///
    /// # Arguments
    /// * `param_name` - The name of the invalid parameter (e.g., `"width"`, `"cell_size"`)
    /// * `message` - A description of the validation error
    pub fn invalid_dimension_msg(param_name: &str, message: &str) -> Self {
        Self {
            code: WindSimErrorCode::InvalidDimensions,
            msg: format!("Grid parameter {param_name}: {message}"),
        }
    }

    /// Create error for invalid grid dimensions (f32 values).
    pub fn invalid_dimension(param_name: &str, value: f32) -> Self {
        Self::invalid_dimension_msg(
            param_name,
            &format!("must be finite and positive, got {value}"),
        )
    }

    /// Create error for a cell index outside the padded grid.
    pub fn cell_out_of_range(x: usize, y: usize, z: usize) -> Self {
        Self {
            code: WindSimErrorCode::InvalidParameter,
            msg: format!("Cell ({x}, {y}, {z}) lies outside the padded grid"),
        }
    }

    /// Create error for invalid parameter.
    ///
    /// # Arguments
    /// * `message` - Description of the error
    pub fn invalid_parameter(message: String) -> Self {
        Self {
            code: WindSimErrorCode::InvalidParameter,
            msg: message,
        }
    }
}

impl From<SerializationError> for DefaultWindSimError {
    fn from(error: SerializationError) -> Self {
        Self {
            code: WindSimErrorCode::Serialization,
            msg: error.to_string(),
        }
    }
}

impl WindSimError for DefaultWindSimError {
    fn code(&self) -> WindSimErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by wind simulation functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindSimErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// Lock poisoned: internal synchronization primitive was poisoned by a panic.
    LockPoisoned = 2,

    /// Invalid grid dimensions: sizes and cell size must be finite and yield
    /// at least one cell per axis.
    InvalidDimensions = 3,

    /// Invalid parameter passed to function.
    InvalidParameter = 4,

    /// Encoding or decoding a baked wind source failed.
    Serialization = 5,
}

impl From<DefaultWindSimError> for WindSimErrorCode {
    fn from(error: DefaultWindSimError) -> Self {
        error.code
    }
}

thread_local! {
    /// Thread-local storage for the most recent FFI error (C string, error code).
    /// The CString is stored to keep the pointer handed out by
    /// `wind_sim_get_last_error` alive.
    static LAST_ERROR: RefCell<(Option<CString>, WindSimErrorCode)> = const { RefCell::new((None, WindSimErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, WindSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, WindSimErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if the last call succeeded or the message cannot be converted to a C string.
///
/// # Thread Safety
/// Error messages are stored per-thread, so each thread has its own independent error state.
///
/// # Lifetime
/// The returned pointer is valid until the next FFI call on this thread.
///
/// **DO NOT FREE THIS POINTER** - it is managed internally.
///
/// Example:
/// ```cpp
/// WindSimInstance* sim = nullptr;
/// WindSimErrorCode err = wind_sim_new(64.0f, 16.0f, 64.0f, 1.0f, &sim);
/// if (err != Ok) {
///     const char* error = wind_sim_get_last_error();
///     if (error) {
///         printf("Wind sim creation failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn wind_sim_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns `WindSimErrorCode::Ok` (0) if the last call on this thread succeeded.
#[no_mangle]
pub extern "C" fn wind_sim_get_last_error_code() -> WindSimErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
