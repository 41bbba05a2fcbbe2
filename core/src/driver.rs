//! Async driver for bootstrap runs.
//!
//! # Design
//! `run_bootstrap` is the whole handshake as one sequential async function:
//! it awaits each response before the next request is built. Dropping the
//! future cancels the run and releases its in-flight request; no other state
//! is touched because each run owns its token and session id.
//!
//! `spawn_bootstrap` is for hosts that live on their own thread or event loop.
//! The run executes on a runtime the caller names, and the result goes to a
//! `CompletionSink` the caller provides, so delivery lands wherever the
//! caller drains it.

use std::sync::mpsc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::bootstrap::{Bootstrap, BootstrapResult, Step};
use crate::client::AuthClient;
use crate::transport::Transport;
use crate::types::Credentials;

/// Drive one run to completion over `transport`.
pub async fn run_bootstrap<T: Transport>(
    client: &AuthClient,
    transport: &T,
    credentials: Credentials,
) -> BootstrapResult {
    let (mut run, mut request) = Bootstrap::start(client, credentials);
    let span = tracing::info_span!("bootstrap", run_id = %run.run_id());

    async move {
        loop {
            let outcome = transport.execute(request).await;
            match run.advance(outcome) {
                Step::Next(next_run, next_request) => {
                    run = next_run;
                    request = next_request;
                }
                Step::Done(result) => return result,
            }
        }
    }
    .instrument(span)
    .await
}

/// Receives the result of a spawned run.
pub trait CompletionSink: Send + 'static {
    fn complete(self, result: BootstrapResult);
}

impl<F> CompletionSink for F
where
    F: FnOnce(BootstrapResult) + Send + 'static,
{
    fn complete(self, result: BootstrapResult) {
        self(result)
    }
}

impl CompletionSink for oneshot::Sender<BootstrapResult> {
    fn complete(self, result: BootstrapResult) {
        // The receiver may have been dropped; the result is then unwanted.
        let _ = self.send(result);
    }
}

impl CompletionSink for mpsc::Sender<BootstrapResult> {
    fn complete(self, result: BootstrapResult) {
        let _ = self.send(result);
    }
}

/// Handle to a spawned run.
#[derive(Debug)]
pub struct BootstrapTask {
    handle: JoinHandle<()>,
}

impl BootstrapTask {
    /// Abort the run. The sink is not invoked afterwards.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait until the run has delivered its result or was cancelled.
    pub async fn join(self) {
        // A cancelled task reports a JoinError; there is nothing to surface.
        let _ = self.handle.await;
    }
}

/// Run the handshake on `runtime` and hand the result to `sink`.
pub fn spawn_bootstrap<T, S>(
    runtime: &Handle,
    client: AuthClient,
    transport: T,
    credentials: Credentials,
    sink: S,
) -> BootstrapTask
where
    T: Transport + 'static,
    S: CompletionSink,
{
    let handle = runtime.spawn(async move {
        let result = run_bootstrap(&client, &transport, credentials).await;
        sink.complete(result);
    });
    BootstrapTask { handle }
}
