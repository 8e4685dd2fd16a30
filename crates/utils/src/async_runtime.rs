use once_cell::sync::Lazy;
use std::cell::Cell;
use std::future::Future;
use strix_core::{Error, Result};
use tokio::runtime::{Builder, Handle, Runtime};

/// Runtime shared by every blocking caller, built on first use
static SHARED_RUNTIME: Lazy<std::io::Result<Runtime>> = Lazy::new(|| {
    Builder::new_multi_thread()
        .thread_name("strix-runtime")
        .enable_all()
        .build()
});

thread_local! {
    static BLOCKING_SECTION: Cell<bool> = const { Cell::new(false) };
}

/// Restores the previous marker when a blocking section ends, even by unwinding
struct SectionGuard(bool);

impl Drop for SectionGuard {
    fn drop(&mut self) {
        BLOCKING_SECTION.with(|marker| marker.set(self.0));
    }
}

/// Run `work` with the current thread marked as one that may block
///
/// Meant for closures handed to `spawn_blocking`: inside the section,
/// [`run_async`] blocks on the surrounding runtime instead of refusing.
pub fn blocking_section<T>(work: impl FnOnce() -> T) -> T {
    let _guard = SectionGuard(BLOCKING_SECTION.with(|marker| marker.replace(true)));
    work()
}

/// Async runtime manager that avoids creating runtime in async contexts
pub struct AsyncRuntime;

impl AsyncRuntime {
    /// Get the shared runtime, surfacing build failures as configuration errors
    fn shared() -> Result<&'static Runtime> {
        match &*SHARED_RUNTIME {
            Ok(runtime) => Ok(runtime),
            Err(e) => Err(Error::configuration(format!(
                "failed to create tokio runtime: {e}"
            ))),
        }
    }

    /// Check if we're already in an async context
    #[must_use]
    pub fn is_in_async_context() -> bool {
        Handle::try_current().is_ok()
    }

    /// Check if the current thread is inside a [`blocking_section`]
    #[must_use]
    pub fn is_in_blocking_section() -> bool {
        BLOCKING_SECTION.with(Cell::get)
    }

    /// Block the current thread on a future using the shared runtime
    pub fn block_on<F, T>(future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        Self::shared()?.block_on(future)
    }
}

/// Helper function to run async code from sync context safely
///
/// Fails instead of panicking when called from inside a tokio runtime; async
/// callers should await the future directly. Threads inside a
/// [`blocking_section`] block on the runtime they belong to.
pub fn run_async<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if AsyncRuntime::is_in_async_context() {
        if AsyncRuntime::is_in_blocking_section() {
            return Handle::current().block_on(future);
        }
        return Err(Error::configuration(
            "cannot block on a command from within an async runtime; await it instead",
        ));
    }

    AsyncRuntime::block_on(future)
}
