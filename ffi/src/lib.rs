//! C-ABI wrapper around `tmdb-auth-core`.
//!
//! # Overview
//! Lets a native host (a mobile app, typically) run the session bootstrap
//! while keeping its own networking stack. The library hands out one request
//! at a time; the host executes it and feeds the response back. Results are
//! returned synchronously on the calling thread, so they arrive on whatever
//! execution context the host drives the run from.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A run handle is single-owner. Freeing it mid-flight cancels the run; the
//!   host should simply discard the outstanding request's response.
//! - The caller owns all returned pointers and must call the matching
//!   `tmdb_free_*` function to release them.

pub mod types;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::catch_unwind;

use tmdb_auth_core::{escaped_parameters, ApiConfig, AuthClient, Credentials, RunState, TransportError};
use tracing::warn;

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `base_url` (used for both plain and secure calls).
///
/// Returns null if an argument is null or not UTF-8, the API key is empty,
/// the URL is not an absolute http(s) URL, or an internal panic occurs.
/// The caller must free the returned pointer with `tmdb_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_client_new(api_key: *const c_char, base_url: *const c_char) -> *mut FfiAuthClient {
    catch_unwind(|| {
        let (Some(api_key), Some(base_url)) = (read_c_str(api_key), read_c_str(base_url)) else {
            return std::ptr::null_mut();
        };
        match ApiConfig::new(api_key, &base_url) {
            Ok(config) => Box::into_raw(Box::new(FfiAuthClient {
                inner: AuthClient::new(config),
            })),
            Err(e) => {
                warn!(error = %e, "rejected client configuration");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `tmdb_client_new`. Safe to call with null.
///
/// Runs created from the client keep working after it is freed.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_client_free(client: *mut FfiAuthClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Parameter encoding
// ---------------------------------------------------------------------------

/// Encode `len` key/value pairs as a `?k=v&...` query string, in order.
///
/// Returns an empty string when `len` is 0, and null if an array or any of
/// its entries is null or not UTF-8. Free the result with `tmdb_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_escaped_parameters(
    keys: *const *const c_char,
    values: *const *const c_char,
    len: u32,
) -> *mut c_char {
    catch_unwind(|| {
        if len == 0 {
            return types::to_c_string("");
        }
        if keys.is_null() || values.is_null() {
            return std::ptr::null_mut();
        }
        let keys = unsafe { std::slice::from_raw_parts(keys, len as usize) };
        let values = unsafe { std::slice::from_raw_parts(values, len as usize) };

        let mut pairs = Vec::with_capacity(len as usize);
        for (&key, &value) in keys.iter().zip(values) {
            match (read_c_str(key), read_c_str(value)) {
                (Some(k), Some(v)) => pairs.push((k, v)),
                _ => return std::ptr::null_mut(),
            }
        }
        types::to_c_string(escaped_parameters(pairs))
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Bootstrap runs
// ---------------------------------------------------------------------------

/// Create an idle run for `username` / `password`.
///
/// Empty credentials are not rejected here; pre-flight checks belong to the
/// caller. Returns null if an argument is null, or if a credential is not
/// UTF-8 rather than sending an altered one.
/// The caller must free the returned pointer with `tmdb_bootstrap_free`.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_bootstrap_new(
    client: *const FfiAuthClient,
    username: *const c_char,
    password: *const c_char,
) -> *mut FfiBootstrap {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let (Some(username), Some(password)) = (read_c_str(username), read_c_str(password)) else {
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let run = FfiBootstrap::new(client.inner.clone(), Credentials::new(username, password));
        Box::into_raw(Box::new(run))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Start an idle run and return the request-token request.
///
/// Returns null if `run` is null or not idle.
/// Free the request with `tmdb_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_bootstrap_start(run: *mut FfiBootstrap) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if run.is_null() {
            return std::ptr::null_mut();
        }
        let run = unsafe { &mut *run };
        FfiHttpRequest::from_option(run.start())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Feed the response to the outstanding request.
///
/// Returns the next request to execute, or null when the run has finished
/// (check `tmdb_bootstrap_result`). Also returns null, without changing the
/// run, if no request is outstanding or an argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_bootstrap_on_response(
    run: *mut FfiBootstrap,
    response: *const FfiHttpResponse,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if run.is_null() || response.is_null() {
            return std::ptr::null_mut();
        }
        let run = unsafe { &mut *run };
        let response = unsafe { &*response }.to_core();
        FfiHttpRequest::from_option(run.advance(Ok(response)))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Report that the outstanding request failed before producing a response.
///
/// Finishes the run with a network error of `kind` for the current stage.
/// `message` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_bootstrap_on_transport_error(
    run: *mut FfiBootstrap,
    kind: FfiTransportErrorKind,
    message: *const c_char,
) {
    if run.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let run = unsafe { &mut *run };
        let message = read_c_str(message).unwrap_or_else(|| "transport error".to_string());
        let next = run.advance(Err(TransportError::new(kind.into(), message)));
        debug_assert!(next.is_none());
    });
}

/// Current position of the run. Null handles report `Idle`.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_bootstrap_state(run: *const FfiBootstrap) -> FfiRunState {
    if run.is_null() {
        return FfiRunState::Idle;
    }
    catch_unwind(|| unsafe { &*run }.state().into()).unwrap_or(FfiRunState::Idle)
}

/// Snapshot of the run's outcome.
///
/// `error_code` is `NotFinished` while the run is idle or in flight.
/// Free the result with `tmdb_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_bootstrap_result(run: *const FfiBootstrap) -> *mut FfiBootstrapResult {
    catch_unwind(|| {
        if run.is_null() {
            return FfiBootstrapResult::null_arg("run");
        }
        let run = unsafe { &*run };
        FfiBootstrapResult::from_outcome(run.result.as_ref())
    })
    .unwrap_or_else(|_| FfiBootstrapResult::panic("panic in tmdb_bootstrap_result"))
}

/// Free a run. An in-flight run is cancelled. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_bootstrap_free(run: *mut FfiBootstrap) {
    if run.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let mut run = unsafe { Box::from_raw(run) };
        if !matches!(run.state(), RunState::Idle) && !run.state().is_terminal() {
            run.cancel();
        }
    });
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `tmdb_bootstrap_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        if !req.url.is_null() {
            drop(unsafe { CString::from_raw(req.url) });
        }
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                if !h.key.is_null() {
                    drop(unsafe { CString::from_raw(h.key) });
                }
                if !h.value.is_null() {
                    drop(unsafe { CString::from_raw(h.value) });
                }
            }
        }
    });
}

/// Free an `FfiBootstrapResult` returned by `tmdb_bootstrap_result`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_free_result(result: *mut FfiBootstrapResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.session_id.is_null() {
            drop(unsafe { CString::from_raw(result.session_id) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tmdb_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
