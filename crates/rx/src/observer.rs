//! Receivers of pushed sequence signals

use strix_core::Error;

/// Receives the signals of one subscription
///
/// A subscription delivers zero or more `on_next` calls followed by exactly
/// one terminal call, either `on_error` or `on_completed`.
pub trait Observer<T> {
    fn on_next(&mut self, item: T);

    fn on_error(&mut self, error: Error);

    fn on_completed(&mut self);
}

/// A single recorded signal
#[derive(Debug)]
pub enum Notification<T> {
    Next(T),
    Error(Error),
    Completed,
}

impl<T> Notification<T> {
    /// The emitted value, if this is a `Next` signal
    pub fn value(&self) -> Option<&T> {
        match self {
            Notification::Next(item) => Some(item),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }
}

/// Records every signal in arrival order
impl<T> Observer<T> for Vec<Notification<T>> {
    fn on_next(&mut self, item: T) {
        self.push(Notification::Next(item));
    }

    fn on_error(&mut self, error: Error) {
        self.push(Notification::Error(error));
    }

    fn on_completed(&mut self) {
        self.push(Notification::Completed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let mut recorded: Vec<Notification<u8>> = Vec::new();
        recorded.on_next(1);
        recorded.on_next(2);
        recorded.on_completed();

        let values: Vec<_> = recorded.iter().filter_map(Notification::value).collect();
        assert_eq!(values, vec![&1, &2]);
        assert!(recorded.last().is_some_and(Notification::is_terminal));
    }
}
