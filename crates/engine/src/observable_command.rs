//! Commands whose work is a lazy sequence
//!
//! Every subscription is a separate execution: it asks the circuit for
//! admission, takes a semaphore permit, and relays the constructed sequence
//! until it completes, fails or runs past the execution timeout. Failures
//! switch the subscription over to the fallback sequence. Unsubscribing
//! early counts as a success once a value was relayed.

use crate::circuit::{self, Admission, CircuitBreaker, CircuitBreakerConfig};
use crate::isolation;
use crate::properties::ResolvedCommandProperties;
use crate::setter::ObservableCommandSetter;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use strix_core::{CommandKey, Error, Result};
use strix_rx::Observable;
use strix_utils::logging::command_span;
use tokio::sync::OwnedSemaphorePermit;
use tokio::time::Instant;
use tracing::{debug, warn, Instrument, Span};

/// A unit of work producing a sequence, with an optional fallback sequence
pub trait ObservableCommand: Send + Sync + 'static {
    type Output: Send + 'static;

    fn construct(&self) -> Observable<Self::Output>;

    /// Sequence to continue with when `construct` fails
    fn resume_with_fallback(&self) -> Observable<Self::Output> {
        Observable::error_with(Error::fallback_undefined)
    }
}

/// An [`ObservableCommand`] bound to its setter
pub struct StrixObservableCommand<C> {
    setter: ObservableCommandSetter,
    command: Arc<C>,
}

impl<C> std::fmt::Debug for StrixObservableCommand<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrixObservableCommand")
            .field("setter", &self.setter)
            .finish_non_exhaustive()
    }
}

impl<C> Clone for StrixObservableCommand<C> {
    fn clone(&self) -> Self {
        Self {
            setter: self.setter.clone(),
            command: Arc::clone(&self.command),
        }
    }
}

impl<C: ObservableCommand> StrixObservableCommand<C> {
    pub fn new(setter: ObservableCommandSetter, command: C) -> Self {
        Self {
            setter,
            command: Arc::new(command),
        }
    }

    pub fn setter(&self) -> &ObservableCommandSetter {
        &self.setter
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    /// A cold observable; nothing runs until it is subscribed to
    pub fn to_observable(&self) -> Observable<C::Output> {
        let this = self.clone();
        Observable::defer(move || {
            let subscription = Arc::new(Subscription::new(&this));
            stream::once(subscription.start()).flatten()
        })
    }
}

/// State shared by one subscription
struct Subscription<C> {
    command: Arc<C>,
    key: CommandKey,
    properties: ResolvedCommandProperties,
    circuit_config: CircuitBreakerConfig,
    breaker: Arc<CircuitBreaker>,
    span: Span,
}

enum Phase<T> {
    Primary {
        upstream: BoxStream<'static, Result<T>>,
        deadline: Option<Instant>,
        admission: Admission,
        permit: OwnedSemaphorePermit,
    },
    Fallback {
        upstream: BoxStream<'static, Result<T>>,
        failure: Error,
    },
    Failed(Error),
    Done,
}

impl<C: ObservableCommand> Subscription<C> {
    fn new(owner: &StrixObservableCommand<C>) -> Self {
        let key = owner.setter.command_key();
        let properties = owner.setter.command_properties().resolve(&key);
        Self {
            command: Arc::clone(&owner.command),
            circuit_config: CircuitBreakerConfig::from(&properties),
            breaker: circuit::circuit_breaker(&key),
            span: command_span(owner.setter.group_key().as_str(), key.as_str()),
            key,
            properties,
        }
    }

    async fn start(self: Arc<Self>) -> BoxStream<'static, Result<C::Output>> {
        let span = self.span.clone();
        let first = self.admit().instrument(span).await;
        stream::unfold(first, move |phase| {
            let this = Arc::clone(&self);
            async move {
                let span = this.span.clone();
                this.advance(phase).instrument(span).await
            }
        })
        .boxed()
    }

    async fn admit(&self) -> Phase<C::Output> {
        let breaker = Arc::clone(&self.breaker);
        let Some(admission) = Admission::begin(breaker, self.circuit_config.clone()).await else {
            debug!("short-circuited");
            return self.fallback(Error::short_circuited(self.key.as_str()));
        };

        let semaphore = isolation::execution_semaphore(
            &self.key,
            self.properties.semaphore_max_concurrent_requests,
        );
        match semaphore.try_acquire(&self.key) {
            Ok(permit) => Phase::Primary {
                upstream: self.command.construct().to_stream(),
                deadline: self
                    .properties
                    .execution_timeout_enabled
                    .then(|| Instant::now() + self.properties.execution_timeout),
                admission,
                permit,
            },
            Err(rejection) => {
                admission.failed().await;
                self.fallback(rejection)
            }
        }
    }

    async fn advance(&self, mut phase: Phase<C::Output>) -> Option<(Result<C::Output>, Phase<C::Output>)> {
        loop {
            phase = match phase {
                Phase::Primary {
                    mut upstream,
                    deadline,
                    mut admission,
                    permit,
                } => {
                    let next = match deadline {
                        Some(deadline) => tokio::time::timeout_at(deadline, upstream.next())
                            .await
                            .unwrap_or_else(|_| {
                                warn!(timeout = ?self.properties.execution_timeout, "execution timed out");
                                Some(Err(Error::timeout(self.key.as_str(), self.properties.execution_timeout)))
                            }),
                        None => upstream.next().await,
                    };

                    match next {
                        Some(Ok(item)) => {
                            admission.record_emission();
                            return Some((
                                Ok(item),
                                Phase::Primary {
                                    upstream,
                                    deadline,
                                    admission,
                                    permit,
                                },
                            ))
                        }
                        Some(Err(failure)) => {
                            drop(permit);
                            admission.failed().await;
                            self.fallback(failure)
                        }
                        None => {
                            drop(permit);
                            admission.succeeded().await;
                            return None;
                        }
                    }
                }
                Phase::Fallback {
                    mut upstream,
                    failure,
                } => match upstream.next().await {
                    Some(Ok(item)) => return Some((Ok(item), Phase::Fallback { upstream, failure })),
                    Some(Err(e)) if e.is_fallback_undefined() => Phase::Failed(failure),
                    Some(Err(e)) => {
                        warn!(error = %failure, fallback_error = %e, "fallback failed");
                        return Some((Err(e), Phase::Done));
                    }
                    None => return None,
                },
                Phase::Failed(error) => return Some((Err(error), Phase::Done)),
                Phase::Done => return None,
            };
        }
    }

    /// Switch to the fallback sequence for `failure`, or fail with it
    fn fallback(&self, failure: Error) -> Phase<C::Output> {
        if !self.properties.fallback_enabled {
            debug!(error = %failure, "fallback disabled");
            return Phase::Failed(failure);
        }
        debug!(error = %failure, "resuming with fallback");
        Phase::Fallback {
            upstream: self.command.resume_with_fallback().to_stream(),
            failure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use crate::properties::CommandProperties;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct Numbers {
        constructed: Arc<AtomicUsize>,
        fail_after: Option<u32>,
    }

    impl ObservableCommand for Numbers {
        type Output = u32;

        fn construct(&self) -> Observable<u32> {
            self.constructed.fetch_add(1, Ordering::SeqCst);
            let fail_after = self.fail_after;
            Observable::defer(move || {
                stream::iter((1..=3).map(move |n| match fail_after {
                    Some(limit) if n > limit => Err(Error::execution("ran out of numbers")),
                    _ => Ok(n),
                }))
            })
        }
    }

    struct Stalled;

    impl ObservableCommand for Stalled {
        type Output = &'static str;

        fn construct(&self) -> Observable<&'static str> {
            Observable::defer(|| stream::pending())
        }

        fn resume_with_fallback(&self) -> Observable<&'static str> {
            Observable::just("fallback")
        }
    }

    struct Flaky {
        healthy: AtomicBool,
    }

    impl ObservableCommand for Flaky {
        type Output = u32;

        fn construct(&self) -> Observable<u32> {
            if self.healthy.load(Ordering::SeqCst) {
                Observable::from_vec(vec![1, 2, 3])
            } else {
                Observable::error_with(|| Error::execution("dependency down"))
            }
        }
    }

    fn setter(command: &str) -> ObservableCommandSetter {
        ObservableCommandSetter::with_group_key("Engine-Observable-Test").and_command_key(command)
    }

    #[tokio::test]
    #[serial]
    async fn test_each_subscription_constructs_again() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let command = StrixObservableCommand::new(
            setter("observable-cold"),
            Numbers {
                constructed: Arc::clone(&constructed),
                fail_after: None,
            },
        );

        let observable = command.to_observable();
        assert_eq!(constructed.load(Ordering::SeqCst), 0);
        assert_eq!(observable.to_vec().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(observable.to_vec().await.unwrap(), vec![1, 2, 3]);
        assert_eq!(constructed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    #[serial]
    async fn test_error_without_fallback_follows_emitted_values() {
        let command = StrixObservableCommand::new(
            setter("observable-partial"),
            Numbers {
                constructed: Arc::new(AtomicUsize::new(0)),
                fail_after: Some(1),
            },
        );

        let mut values = command.to_observable().to_stream();
        assert_eq!(values.next().await.unwrap().unwrap(), 1);
        let err = values.next().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("ran out of numbers"));
        assert!(values.next().await.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn test_timeout_resumes_with_fallback() {
        let command = StrixObservableCommand::new(
            setter("observable-timeout").and_command_properties_defaults(
                CommandProperties::default().with_execution_timeout_in_milliseconds(30),
            ),
            Stalled,
        );

        let value = tokio::time::timeout(Duration::from_secs(5), command.to_observable().first())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(value, "fallback");
    }

    #[tokio::test]
    #[serial]
    async fn test_semaphore_rejection_without_fallback() {
        let command = StrixObservableCommand::new(
            setter("observable-saturated").and_command_properties_defaults(
                CommandProperties::default()
                    .with_execution_isolation_semaphore_max_concurrent_requests(1)
                    .with_execution_timeout_enabled(false),
            ),
            Numbers {
                constructed: Arc::new(AtomicUsize::new(0)),
                fail_after: None,
            },
        );

        let mut holding = command.to_observable().to_stream();
        assert_eq!(holding.next().await.unwrap().unwrap(), 1);

        let err = command.to_observable().first().await.unwrap_err();
        assert!(matches!(err, Error::Rejected { .. }));

        drop(holding);
        assert_eq!(command.to_observable().first().await.unwrap(), 1);
    }

    #[tokio::test]
    #[serial]
    async fn test_early_unsubscribe_from_trial_closes_circuit() {
        let command = StrixObservableCommand::new(
            setter("observable-unsubscribed-trial").and_command_properties_defaults(
                CommandProperties::default()
                    .with_circuit_breaker_request_volume_threshold(1)
                    .with_circuit_breaker_error_threshold_percentage(50)
                    .with_circuit_breaker_sleep_window_in_milliseconds(50),
            ),
            Flaky {
                healthy: AtomicBool::new(false),
            },
        );
        let observable = command.to_observable();

        assert!(observable.to_vec().await.is_err());
        let err = observable.to_vec().await.unwrap_err();
        assert!(matches!(err, Error::ShortCircuited { .. }));

        tokio::time::sleep(Duration::from_millis(80)).await;
        command.command().healthy.store(true, Ordering::SeqCst);

        // Takes the first value of the trial and drops the rest
        assert_eq!(observable.first().await.unwrap(), 1);
        tokio::time::sleep(Duration::from_millis(20)).await;

        for _ in 0..3 {
            assert_eq!(observable.to_vec().await.unwrap(), vec![1, 2, 3]);
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_trial_dropped_before_emitting_reopens_circuit() {
        let key = CommandKey::from("observable-silent-trial");
        let command = StrixObservableCommand::new(
            setter(key.as_str()).and_command_properties_defaults(
                CommandProperties::default()
                    .with_circuit_breaker_request_volume_threshold(1)
                    .with_circuit_breaker_sleep_window_in_milliseconds(50)
                    .with_execution_timeout_enabled(false),
            ),
            Stalled,
        );
        let breaker = circuit::circuit_breaker(&key);
        let tripping = CircuitBreakerConfig {
            request_volume_threshold: 1,
            ..Default::default()
        };
        let attempt = breaker.allow_request(&tripping).await.unwrap();
        breaker.mark_failure(attempt, &tripping).await;
        tokio::time::sleep(Duration::from_millis(80)).await;

        let mut trial = command.to_observable().to_stream();
        assert!(tokio::time::timeout(Duration::from_millis(20), trial.next())
            .await
            .is_err());
        drop(trial);
        tokio::time::sleep(Duration::from_millis(10)).await;

        let stats = breaker.stats().await;
        assert_eq!(stats.state, circuit::CircuitState::Open);
        assert_eq!(stats.half_open_calls, 0);
    }
}
