//! Single-threaded publish/subscribe state holder.
//!
//! A [`Published`] owns one current value.  Every `set` replaces it and
//! synchronously notifies all subscribers on the calling thread, in
//! registration order.  New subscribers receive the current value right away.

/// Handle returned by [`Published::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Subscriber<T> = Box<dyn FnMut(&T) + Send>;

pub struct Published<T> {
    value: T,
    subscribers: Vec<(SubscriptionId, Subscriber<T>)>,
    next_id: u64,
}

impl<T> Published<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replace the value and notify every subscriber, even if the new value
    /// equals the old one.
    pub fn set(&mut self, value: T) {
        self.value = value;
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&self.value);
        }
    }

    /// Register `f`; it is invoked immediately with the current value.
    pub fn subscribe<F>(&mut self, mut f: F) -> SubscriptionId
    where
        F: FnMut(&T) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        f(&self.value);
        self.subscribers.push((id, Box::new(f)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Published<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Published")
            .field("value", &self.value)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn subscribe_delivers_current_value_then_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut value = Published::new(1);

        let sink = Arc::clone(&seen);
        value.subscribe(move |v| sink.lock().unwrap().push(*v));
        value.set(2);
        value.set(2);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 2]);
        assert_eq!(*value.get(), 2);
    }

    #[test]
    fn subscribers_run_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut value = Published::new(());

        for tag in ["first", "second"] {
            let order = Arc::clone(&order);
            value.subscribe(move |_| order.lock().unwrap().push(tag));
        }
        order.lock().unwrap().clear();
        value.set(());

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn unsubscribed_callbacks_stop_firing() {
        let count = Arc::new(Mutex::new(0));
        let mut value = Published::new("a");

        let c = Arc::clone(&count);
        let id = value.subscribe(move |_| *c.lock().unwrap() += 1);
        value.unsubscribe(id);
        value.set("b");

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(format!("{value:?}"), r#"Published { value: "b", subscribers: 0 }"#);
    }
}
