//! Cold, push-based observable sequences.
//!
//! An [`Observable`] describes how to produce a sequence of values; nothing
//! runs until something subscribes, and every subscription runs the producer
//! again. Values are pushed to an [`Observer`] or pulled as a `futures`
//! stream via [`Observable::to_stream`].

pub mod observable;
pub mod observer;

pub use observable::Observable;
pub use observer::{Notification, Observer};
