//! Synchronous commands
//!
//! One execution walks through: circuit admission, isolation admission, the
//! unit of work on the blocking pool under a timeout, outcome recording, and
//! on any failure the fallback.

use crate::circuit::{self, Admission, CircuitBreakerConfig};
use crate::isolation;
use crate::properties::{IsolationStrategy, ResolvedCommandProperties};
use crate::setter::CommandSetter;
use std::sync::Arc;
use strix_core::{CommandKey, Error, Result};
use strix_rx::Observable;
use strix_utils::logging::command_span;
use tokio::sync::OwnedSemaphorePermit;
use tracing::{debug, warn, Instrument};

/// A unit of work with an optional fallback
///
/// Both methods may block; they run on tokio's blocking pool, where nested
/// commands may be executed synchronously.
pub trait Command: Send + Sync + 'static {
    type Output: Send + 'static;

    fn run(&self) -> Result<Self::Output>;

    /// Value to return when `run` cannot produce one
    ///
    /// The default reports [`Error::FallbackUndefined`], which makes the
    /// triggering failure surface to the caller.
    fn fallback(&self) -> Result<Self::Output> {
        Err(Error::fallback_undefined())
    }
}

/// A [`Command`] bound to its setter, ready to execute
pub struct StrixCommand<C> {
    setter: CommandSetter,
    command: Arc<C>,
}

impl<C> std::fmt::Debug for StrixCommand<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrixCommand")
            .field("setter", &self.setter)
            .finish_non_exhaustive()
    }
}

impl<C> Clone for StrixCommand<C> {
    fn clone(&self) -> Self {
        Self {
            setter: self.setter.clone(),
            command: Arc::clone(&self.command),
        }
    }
}

impl<C: Command> StrixCommand<C> {
    pub fn new(setter: CommandSetter, command: C) -> Self {
        Self {
            setter,
            command: Arc::new(command),
        }
    }

    pub fn setter(&self) -> &CommandSetter {
        &self.setter
    }

    pub fn command(&self) -> &C {
        &self.command
    }

    /// Execute and block the calling thread until a result is available
    ///
    /// Must not be called from async code, use [`queue`] there. Work and
    /// fallbacks of other commands may call it.
    ///
    /// [`queue`]: StrixCommand::queue
    pub fn execute(&self) -> Result<C::Output> {
        strix_utils::run_async(self.queue())
    }

    /// Execute asynchronously
    pub fn queue(&self) -> impl std::future::Future<Output = Result<C::Output>> + Send + '_ {
        async move {
            let key = self.setter.command_key();
            let span = command_span(self.setter.group_key().as_str(), key.as_str());
            self.run_protected(key).instrument(span).await
        }
    }

    /// A cold single-value observable that executes on every subscription
    pub fn to_observable(&self) -> Observable<C::Output> {
        let this = self.clone();
        Observable::from_future(move || {
            let command = this.clone();
            async move { command.queue().await }
        })
    }

    async fn run_protected(&self, key: CommandKey) -> Result<C::Output> {
        let properties = self.setter.command_properties().resolve(&key);
        let breaker = circuit::circuit_breaker(&key);
        let circuit_config = CircuitBreakerConfig::from(&properties);

        let Some(admission) = Admission::begin(breaker, circuit_config).await else {
            debug!("short-circuited");
            return self
                .fallback_or(Error::short_circuited(key.as_str()), &properties)
                .await;
        };

        let permit = match self.admit(&key, &properties).await {
            Ok(permit) => permit,
            Err(rejection) => {
                admission.failed().await;
                return self.fallback_or(rejection, &properties).await;
            }
        };

        match self.run_work(&key, &properties, permit).await {
            Ok(value) => {
                admission.succeeded().await;
                Ok(value)
            }
            Err(failure) => {
                admission.failed().await;
                self.fallback_or(failure, &properties).await
            }
        }
    }

    async fn admit(
        &self,
        key: &CommandKey,
        properties: &ResolvedCommandProperties,
    ) -> Result<OwnedSemaphorePermit> {
        match properties.isolation_strategy {
            IsolationStrategy::Thread => {
                let pool_key = self.setter.thread_pool_key();
                let pool_properties = self.setter.thread_pool_properties().resolve(&pool_key);
                isolation::thread_pool(&pool_key, &pool_properties)
                    .acquire(key)
                    .await
            }
            IsolationStrategy::Semaphore => {
                isolation::execution_semaphore(key, properties.semaphore_max_concurrent_requests)
                    .try_acquire(key)
            }
        }
    }

    async fn run_work(
        &self,
        key: &CommandKey,
        properties: &ResolvedCommandProperties,
        permit: OwnedSemaphorePermit,
    ) -> Result<C::Output> {
        let command = Arc::clone(&self.command);
        // The permit is held until the work returns, even past a timeout
        let work = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            strix_utils::blocking_section(|| command.run())
        });

        let joined = if properties.execution_timeout_enabled {
            match tokio::time::timeout(properties.execution_timeout, work).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(timeout = ?properties.execution_timeout, "execution timed out");
                    return Err(Error::timeout(key.as_str(), properties.execution_timeout));
                }
            }
        } else {
            work.await
        };

        joined.map_err(|e| Error::execution_with_source("unit of work did not complete", e))?
    }

    /// Serve the fallback for `failure`, or return `failure` when there is none
    async fn fallback_or(
        &self,
        failure: Error,
        properties: &ResolvedCommandProperties,
    ) -> Result<C::Output> {
        if !properties.fallback_enabled {
            debug!(error = %failure, "fallback disabled");
            return Err(failure);
        }

        let command = Arc::clone(&self.command);
        let outcome = tokio::task::spawn_blocking(move || {
            strix_utils::blocking_section(|| command.fallback())
        })
        .await
        .map_err(|e| Error::execution_with_source("fallback did not complete", e))?;

        match outcome {
            Ok(value) => {
                debug!(error = %failure, "served fallback");
                Ok(value)
            }
            Err(e) if e.is_fallback_undefined() => Err(failure),
            Err(e) => {
                warn!(error = %failure, fallback_error = %e, "fallback failed");
                Err(e)
            }
        }
    }
}
