//! Cold observable sequences

use crate::observer::Observer;
use futures::future;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use strix_core::{Error, Result};

type Source<T> = dyn Fn() -> BoxStream<'static, Result<T>> + Send + Sync;

/// A lazy sequence of values that ends with completion or an error
///
/// Cloning is cheap and shares the producer; every subscription calls the
/// producer again.
pub struct Observable<T> {
    source: Arc<Source<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable").finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Create an observable whose every subscription pulls from a fresh stream
    pub fn defer<F, S>(factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Self {
            source: Arc::new(move || factory().boxed()),
        }
    }

    /// Create a single-value observable from a future factory
    pub fn from_future<F, Fut>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self::defer(move || stream::once(factory()))
    }

    /// Emit the given values in order, then complete
    pub fn from_vec(items: Vec<T>) -> Self
    where
        T: Clone + Sync,
    {
        Self::defer(move || stream::iter(items.clone().into_iter().map(Ok)))
    }

    /// Emit one value, then complete
    pub fn just(item: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::from_vec(vec![item])
    }

    /// Complete without emitting
    pub fn empty() -> Self {
        Self::defer(stream::empty::<Result<T>>)
    }

    /// Fail every subscription with a freshly built error
    pub fn error_with<F>(error: F) -> Self
    where
        F: Fn() -> Error + Send + Sync + 'static,
    {
        Self::defer(move || stream::once(future::ready(Err(error()))))
    }

    /// Wrap a one-shot stream
    ///
    /// The first subscription receives the stream; later subscriptions fail
    /// with [`Error::Conversion`].
    pub fn from_stream<S>(upstream: S) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        let slot = Mutex::new(Some(upstream.boxed()));
        Self {
            source: Arc::new(move || match slot.lock().take() {
                Some(upstream) => upstream,
                None => stream::once(future::ready(Err(Error::conversion(
                    "sequence supports a single subscription",
                ))))
                .boxed(),
            }),
        }
    }

    /// Transform every emitted value
    pub fn map<U, F>(self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let source = self.source;
        let f = Arc::new(f);
        Observable {
            source: Arc::new(move || {
                let f = Arc::clone(&f);
                source()
                    .map(move |signal| signal.map(|value| (*f)(value)))
                    .boxed()
            }),
        }
    }

    /// Start a subscription as a pull-based stream
    ///
    /// The producer runs on first poll, not when this is called.
    pub fn to_stream(&self) -> BoxStream<'static, Result<T>> {
        let source = Arc::clone(&self.source);
        stream::once(async move { source() }).flatten().boxed()
    }

    /// Subscribe and push every signal to `observer`, returning it once terminated
    ///
    /// An error ends the subscription even if the producer would continue.
    pub async fn subscribe<O>(&self, mut observer: O) -> O
    where
        O: Observer<T>,
    {
        let mut upstream = self.to_stream();
        while let Some(signal) = upstream.next().await {
            match signal {
                Ok(item) => observer.on_next(item),
                Err(error) => {
                    observer.on_error(error);
                    return observer;
                }
            }
        }
        observer.on_completed();
        observer
    }

    /// Subscribe and resolve with the first value, cancelling the rest
    pub async fn first(&self) -> Result<T> {
        match self.to_stream().next().await {
            Some(signal) => signal,
            None => Err(Error::conversion(
                "sequence completed without emitting a value",
            )),
        }
    }

    /// Subscribe and collect every value
    pub async fn to_vec(&self) -> Result<Vec<T>> {
        self.to_stream().try_collect().await
    }

    /// Block the calling thread until the first value arrives
    pub fn blocking_first(&self) -> Result<T> {
        strix_utils::run_async(self.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::Notification;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: Arc<AtomicUsize>) -> Observable<u32> {
        Observable::defer(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            stream::iter(vec![Ok(1), Ok(2), Ok(3)])
        })
    }

    #[tokio::test]
    async fn test_each_subscription_reruns_producer() {
        let counter = Arc::new(AtomicUsize::new(0));
        let numbers = counting(Arc::clone(&counter));

        assert_eq!(numbers.to_vec().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(numbers.clone().to_vec().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_to_stream_is_lazy() {
        let counter = Arc::new(AtomicUsize::new(0));
        let numbers = counting(Arc::clone(&counter));

        let mut pending = numbers.to_stream();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        assert_eq!(pending.next().await.unwrap().unwrap(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribe_pushes_values_then_completion() {
        let recorded = Observable::from_vec(vec!["a", "b"])
            .subscribe(Vec::<Notification<&str>>::new())
            .await;

        assert_eq!(recorded.len(), 3);
        assert_eq!(recorded[0].value(), Some(&"a"));
        assert_eq!(recorded[1].value(), Some(&"b"));
        assert!(matches!(recorded[2], Notification::Completed));
    }

    #[tokio::test]
    async fn test_error_terminates_subscription() {
        let failing = Observable::defer(|| {
            stream::iter(vec![
                Ok(1),
                Err(Error::execution("boom")),
                Ok(2),
            ])
        });

        let recorded = failing.subscribe(Vec::<Notification<i32>>::new()).await;
        assert_eq!(recorded.len(), 2);
        assert!(matches!(recorded[1], Notification::Error(Error::Execution { .. })));
    }

    #[tokio::test]
    async fn test_first_on_empty_fails() {
        let err = Observable::<u8>::empty().first().await.unwrap_err();
        assert!(matches!(err, Error::Conversion { .. }));
    }

    #[tokio::test]
    async fn test_from_stream_allows_one_subscription() {
        let once = Observable::from_stream(stream::iter(vec![Ok(7u8)]));

        assert_eq!(once.to_vec().await.unwrap(), vec![7]);
        let err = once.to_vec().await.unwrap_err();
        assert!(err.to_string().contains("single subscription"));
    }

    #[tokio::test]
    async fn test_map_and_error_with() {
        let doubled = Observable::from_vec(vec![1, 2]).map(|n| n * 2);
        assert_eq!(doubled.to_vec().await.unwrap(), vec![2, 4]);

        let failing = Observable::<u8>::error_with(|| Error::execution("nope"));
        assert!(failing.first().await.is_err());
        assert!(failing.first().await.is_err());
    }

    #[tokio::test]
    async fn test_from_future_emits_single_value() {
        let greeting = Observable::from_future(|| async { Ok("hello".to_string()) });
        assert_eq!(greeting.first().await.unwrap(), "hello");
    }

    #[test]
    fn test_blocking_first() {
        let value = Observable::just(5u8).blocking_first().unwrap();
        assert_eq!(value, 5);
    }
}
