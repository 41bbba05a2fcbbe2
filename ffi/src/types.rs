//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversion functions live here to keep
//! `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use tmdb_auth_core::{
    AuthClient, Bootstrap, BootstrapError, BootstrapResult, Credentials, HttpMethod, HttpRequest,
    HttpResponse, RunState, Stage, Step, TransportError, TransportErrorKind,
};

/// Opaque handle to an `AuthClient`.
pub struct FfiAuthClient {
    pub(crate) inner: AuthClient,
}

/// Opaque handle to one bootstrap run.
///
/// Exactly one of three things holds: the run is idle (`credentials` set),
/// in flight (`run` set), or finished (`result` set). A run that was never
/// started but is freed, or that is freed mid-flight, simply goes away.
pub struct FfiBootstrap {
    pub(crate) client: AuthClient,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) run: Option<Bootstrap>,
    pub(crate) result: Option<BootstrapResult>,
}

impl FfiBootstrap {
    pub(crate) fn new(client: AuthClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials: Some(credentials),
            run: None,
            result: None,
        }
    }

    pub(crate) fn state(&self) -> RunState {
        match (&self.run, &self.result) {
            (Some(run), _) => run.state(),
            (None, Some(result)) => RunState::from(result),
            (None, None) => RunState::Idle,
        }
    }

    /// `Idle -> AcquiringToken`. `None` unless the run is idle.
    pub(crate) fn start(&mut self) -> Option<HttpRequest> {
        let credentials = self.credentials.take()?;
        let (run, request) = Bootstrap::start(&self.client, credentials);
        self.run = Some(run);
        Some(request)
    }

    /// Feed the outcome of the outstanding request. Returns the next request,
    /// or `None` once the run has finished (or if nothing was outstanding).
    pub(crate) fn advance(
        &mut self,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Option<HttpRequest> {
        let run = self.run.take()?;
        match run.advance(outcome) {
            Step::Next(run, request) => {
                self.run = Some(run);
                Some(request)
            }
            Step::Done(result) => {
                self.result = Some(result);
                None
            }
        }
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(run) = self.run.take() {
            run.cancel();
        }
    }
}

/// Copy a C string into an owned `String`. Null or non-UTF-8 input yields `None`.
pub(crate) fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok().map(str::to_owned)
}

/// Hand an owned string to C. Interior NUL bytes are dropped.
pub(crate) fn to_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    let mut bytes = s.into();
    bytes.retain(|&b| b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request the host must execute.
///
/// `url` is absolute and includes the encoded query string.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: to_c_string(req.url),
            headers,
            headers_len,
        }))
    }

    pub(crate) fn from_option(req: Option<HttpRequest>) -> *mut Self {
        req.map(Self::from_core).unwrap_or(std::ptr::null_mut())
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response as received by the host.
///
/// The host constructs this on its own stack and passes a pointer to
/// `tmdb_bootstrap_on_response`. The library reads but does not free it.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    pub(crate) fn to_core(&self) -> HttpResponse {
        HttpResponse::json(self.status, read_c_str(self.body).unwrap_or_default())
    }
}

/// Why the host could not produce a response.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTransportErrorKind {
    Connect = 0,
    Timeout = 1,
    Cancelled = 2,
    Other = 3,
}

impl From<FfiTransportErrorKind> for TransportErrorKind {
    fn from(kind: FfiTransportErrorKind) -> Self {
        match kind {
            FfiTransportErrorKind::Connect => TransportErrorKind::Connect,
            FfiTransportErrorKind::Timeout => TransportErrorKind::Timeout,
            FfiTransportErrorKind::Cancelled => TransportErrorKind::Cancelled,
            FfiTransportErrorKind::Other => TransportErrorKind::Other,
        }
    }
}

// ---------------------------------------------------------------------------
// State and result types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiStage {
    None = 0,
    AcquiringToken = 1,
    ValidatingLogin = 2,
    CreatingSession = 3,
    ResolvingUser = 4,
}

impl From<Stage> for FfiStage {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::AcquiringToken => FfiStage::AcquiringToken,
            Stage::ValidatingLogin => FfiStage::ValidatingLogin,
            Stage::CreatingSession => FfiStage::CreatingSession,
            Stage::ResolvingUser => FfiStage::ResolvingUser,
        }
    }
}

/// Position of a run in the handshake. `Failed` pairs with the stage in
/// `FfiBootstrapResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiRunState {
    Idle = 0,
    AcquiringToken = 1,
    ValidatingLogin = 2,
    CreatingSession = 3,
    ResolvingUser = 4,
    Succeeded = 5,
    Failed = 6,
}

impl From<RunState> for FfiRunState {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Idle => FfiRunState::Idle,
            RunState::AcquiringToken => FfiRunState::AcquiringToken,
            RunState::ValidatingLogin => FfiRunState::ValidatingLogin,
            RunState::CreatingSession => FfiRunState::CreatingSession,
            RunState::ResolvingUser => FfiRunState::ResolvingUser,
            RunState::Succeeded => FfiRunState::Succeeded,
            RunState::Failed(_) => FfiRunState::Failed,
        }
    }
}

/// Error codes returned in `FfiBootstrapResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Network = 1,
    MalformedResponse = 2,
    TokenAcquisitionFailed = 3,
    CredentialsRejected = 4,
    LoginValidationFailed = 5,
    SessionCreationFailed = 6,
    UserResolutionFailed = 7,
    NotFinished = 8,
    NullArg = 9,
    Panic = 10,
}

impl From<&BootstrapError> for FfiErrorCode {
    fn from(err: &BootstrapError) -> Self {
        match err {
            BootstrapError::Network { .. } => FfiErrorCode::Network,
            BootstrapError::MalformedResponse { .. } => FfiErrorCode::MalformedResponse,
            BootstrapError::TokenAcquisitionFailed => FfiErrorCode::TokenAcquisitionFailed,
            BootstrapError::CredentialsRejected { .. } => FfiErrorCode::CredentialsRejected,
            BootstrapError::LoginValidationFailed => FfiErrorCode::LoginValidationFailed,
            BootstrapError::SessionCreationFailed => FfiErrorCode::SessionCreationFailed,
            BootstrapError::UserResolutionFailed => FfiErrorCode::UserResolutionFailed,
        }
    }
}

/// Outcome of a bootstrap run.
///
/// On success `error_code` is `Ok`, `session_id` points to the session id and
/// `user_id` holds the account id. On failure `stage` names the failing stage
/// and `error_message` is ready for display. Null pointers otherwise.
#[repr(C)]
pub struct FfiBootstrapResult {
    pub error_code: FfiErrorCode,
    pub stage: FfiStage,
    pub error_message: *mut c_char,
    pub session_id: *mut c_char,
    pub user_id: u64,
}

impl FfiBootstrapResult {
    fn boxed(error_code: FfiErrorCode, stage: FfiStage, message: Option<String>) -> *mut Self {
        Box::into_raw(Box::new(FfiBootstrapResult {
            error_code,
            stage,
            error_message: message.map(to_c_string).unwrap_or(std::ptr::null_mut()),
            session_id: std::ptr::null_mut(),
            user_id: 0,
        }))
    }

    pub(crate) fn from_outcome(outcome: Option<&BootstrapResult>) -> *mut Self {
        match outcome {
            None => Self::boxed(FfiErrorCode::NotFinished, FfiStage::None, None),
            Some(Ok(session)) => Box::into_raw(Box::new(FfiBootstrapResult {
                error_code: FfiErrorCode::Ok,
                stage: FfiStage::None,
                error_message: std::ptr::null_mut(),
                session_id: to_c_string(session.session_id.as_str()),
                user_id: session.user_id.0,
            })),
            Some(Err(err)) => Self::boxed(err.into(), err.stage().into(), Some(err.user_message())),
        }
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::NullArg, FfiStage::None, Some(format!("null argument: {name}")))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(FfiErrorCode::Panic, FfiStage::None, Some(msg.to_string()))
    }
}
