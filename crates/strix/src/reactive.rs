//! Conversions between [`Observable`] and `futures` publishers
//!
//! A [`Mono`] is a future resolving to at most one value and a [`Flux`] a
//! stream of values. Both carry failures as `Err` items. Conversions only
//! rewire signals; nothing is buffered.

use crate::builder::{CommandBuilder, ObservableCommandBuilder};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{BoxStream, Stream};
use std::future::Future;
use strix_core::Result;
use strix_rx::Observable;
use tokio::runtime::Handle;

/// Single-value publisher
pub type Mono<T> = BoxFuture<'static, Result<T>>;

/// Multi-value publisher
pub type Flux<T> = BoxStream<'static, Result<T>>;

/// First value of `observable`
///
/// Subscribes when polled. Completing without a value fails with
/// [`Error::Conversion`](strix_core::Error::Conversion). The future is a single
/// subscription; convert again to run the sequence again.
pub fn to_mono<T: Send + 'static>(observable: &Observable<T>) -> Mono<T> {
    let observable = observable.clone();
    async move { observable.first().await }.boxed()
}

/// Every value of `observable`, then its completion or error
pub fn to_flux<T: Send + 'static>(observable: &Observable<T>) -> Flux<T> {
    observable.to_stream()
}

/// Observable running a fresh future from `factory` per subscription
pub fn from_mono<T, F, Fut>(factory: F) -> Observable<T>
where
    T: Send + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Observable::from_future(factory)
}

/// Observable relaying a fresh stream from `factory` per subscription
pub fn from_flux<T, F, S>(factory: F) -> Observable<T>
where
    T: Send + 'static,
    F: Fn() -> S + Send + Sync + 'static,
    S: Stream<Item = Result<T>> + Send + 'static,
{
    Observable::defer(factory)
}

/// Method syntax for converting observables
pub trait ObservableExt<T> {
    fn to_mono(&self) -> Mono<T>;
    fn to_flux(&self) -> Flux<T>;
}

impl<T: Send + 'static> ObservableExt<T> for Observable<T> {
    fn to_mono(&self) -> Mono<T> {
        to_mono(self)
    }

    fn to_flux(&self) -> Flux<T> {
        to_flux(self)
    }
}

impl<T: Send + 'static> CommandBuilder<T> {
    /// Use an asynchronous unit of work, awaited on the command's worker thread
    pub fn mono_command<F, Fut>(&mut self, work: F) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        self.run(move || match Handle::try_current() {
            Ok(handle) => handle.block_on(work()),
            Err(_) => futures::executor::block_on(work()),
        })
    }
}

impl<T: Send + 'static> ObservableCommandBuilder<T> {
    /// Use a single-value publisher as the sequence
    pub fn mono_command<F, Fut>(&mut self, work: F) -> &mut Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let work = std::sync::Arc::new(work);
        self.construct(move || {
            let work = std::sync::Arc::clone(&work);
            Observable::from_future(move || work())
        })
    }

    /// Use a multi-value publisher as the sequence
    pub fn flux_command<F, S>(&mut self, work: F) -> &mut Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        let work = std::sync::Arc::new(work);
        self.construct(move || {
            let work = std::sync::Arc::clone(&work);
            Observable::defer(move || work())
        })
    }
}
