use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A spawned periodic loop plus the token that stops it.
pub(crate) struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl Ticker {
    pub(crate) fn new(handle: JoinHandle<()>, cancel: CancellationToken) -> Self {
        Self { handle, cancel }
    }

    pub(crate) fn stop(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}
