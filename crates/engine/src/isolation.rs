//! Bulkheads limiting how much work runs at once
//!
//! Semaphore isolation caps concurrent executions per command and rejects
//! immediately when the cap is reached. Thread isolation caps concurrent
//! executions per thread pool and lets a bounded number of callers wait for a
//! worker before rejecting.

use crate::properties::ResolvedThreadPoolProperties;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use strix_core::{CommandKey, Error, Result, ThreadPoolKey};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

static SEMAPHORES: Lazy<DashMap<CommandKey, Arc<ExecutionSemaphore>>> = Lazy::new(DashMap::new);
static THREAD_POOLS: Lazy<DashMap<ThreadPoolKey, Arc<ThreadPool>>> = Lazy::new(DashMap::new);

/// Non-blocking concurrency limit for one command
#[derive(Debug)]
pub struct ExecutionSemaphore {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ExecutionSemaphore {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Take a permit or reject without waiting
    pub fn try_acquire(&self, command: &CommandKey) -> Result<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).try_acquire_owned().map_err(|_| {
            debug!(command = %command, capacity = self.capacity, "semaphore rejected execution");
            Error::rejected(
                command.as_str(),
                format!("semaphore capacity of {} reached", self.capacity),
            )
        })
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Bounded worker pool shared by every command with the same pool key
#[derive(Debug)]
pub struct ThreadPool {
    key: ThreadPoolKey,
    workers: Arc<Semaphore>,
    core_size: usize,
    queue_capacity: Option<usize>,
    queued: AtomicUsize,
}

impl ThreadPool {
    pub fn new(key: ThreadPoolKey, properties: &ResolvedThreadPoolProperties) -> Self {
        Self {
            key,
            workers: Arc::new(Semaphore::new(properties.core_size)),
            core_size: properties.core_size,
            queue_capacity: properties.queue_capacity,
            queued: AtomicUsize::new(0),
        }
    }

    /// Claim a worker, waiting in the queue if one is configured and has room
    pub async fn acquire(&self, command: &CommandKey) -> Result<OwnedSemaphorePermit> {
        if let Ok(permit) = Arc::clone(&self.workers).try_acquire_owned() {
            return Ok(permit);
        }

        let Some(capacity) = self.queue_capacity else {
            return Err(self.reject(command, "all workers busy"));
        };

        let reserved = self
            .queued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |queued| {
                (queued < capacity).then_some(queued + 1)
            });
        if reserved.is_err() {
            return Err(self.reject(command, "queue full"));
        }
        let _slot = QueueSlot(&self.queued);

        Arc::clone(&self.workers)
            .acquire_owned()
            .await
            .map_err(|_| self.reject(command, "pool closed"))
    }

    fn reject(&self, command: &CommandKey, reason: &str) -> Error {
        debug!(command = %command, pool = %self.key, reason, "thread pool rejected execution");
        Error::rejected(command.as_str(), format!("thread pool {} rejected: {reason}", self.key))
    }

    pub fn key(&self) -> &ThreadPoolKey {
        &self.key
    }

    /// Executions currently holding a worker
    pub fn active(&self) -> usize {
        self.core_size - self.workers.available_permits()
    }

    /// Callers waiting for a worker
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }
}

struct QueueSlot<'a>(&'a AtomicUsize);

impl Drop for QueueSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The semaphore for `command`, created with `capacity` permits on first use
pub fn execution_semaphore(command: &CommandKey, capacity: u32) -> Arc<ExecutionSemaphore> {
    SEMAPHORES
        .entry(command.clone())
        .or_insert_with(|| Arc::new(ExecutionSemaphore::new(capacity.max(1) as usize)))
        .value()
        .clone()
}

/// The pool for `key`, sized from `properties` on first use
pub fn thread_pool(key: &ThreadPoolKey, properties: &ResolvedThreadPoolProperties) -> Arc<ThreadPool> {
    THREAD_POOLS
        .entry(key.clone())
        .or_insert_with(|| Arc::new(ThreadPool::new(key.clone(), properties)))
        .value()
        .clone()
}

pub(crate) fn remove_semaphore(command: &CommandKey) {
    SEMAPHORES.remove(command);
}

pub(crate) fn clear() {
    SEMAPHORES.clear();
    THREAD_POOLS.clear();
}
