//! Event channel plumbing on top of crossbeam-channel.
//!
//! Executors and the harness run on whatever threads their strategy
//! dictates, so the sender must be cheaply cloneable and safe to hand to
//! worker threads. Consumers (the CLI progress bar, tests) read from the
//! receiving end on their own thread.

use crossbeam_channel::{bounded as bounded_raw, unbounded, Receiver, Sender};

use super::Event;

/// Create an unbounded event channel.
///
/// Events are small; an unbounded channel keeps `send` from ever blocking
/// a timed executor run on a slow consumer.
pub fn channel() -> (EventSender, EventReceiver) {
    let (sender, receiver) = unbounded();
    (EventSender { inner: sender }, EventReceiver { inner: receiver })
}

/// Create a bounded event channel, for consumers that want backpressure.
pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
    let (sender, receiver) = bounded_raw(capacity);
    (EventSender { inner: sender }, EventReceiver { inner: receiver })
}

/// An event sender with no receiver, for runs without progress reporting.
pub fn null_sender() -> EventSender {
    channel().0
}

/// Sends events from the core library.
///
/// Cloneable; safe to share with executor worker threads.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// A dropped receiver silently discards the event: progress reporting
    /// is optional and must never fail a benchmark run.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events emitted by the core library.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event, or `None` once all senders are gone
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Receive without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Iterate events until every sender has been dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ExecEvent, ExecProgress};
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = channel();

        let handle = thread::spawn(move || {
            sender.send(Event::Exec(ExecEvent::Progress(ExecProgress {
                completed: 5,
                total: 25,
                current_path: PathBuf::from("/test"),
            })));
        });

        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Exec(ExecEvent::Progress(p)) => {
                assert_eq!(p.completed, 5);
                assert_eq!(p.total, 25);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn iteration_ends_when_all_senders_drop() {
        let (sender, receiver) = channel();
        let second = sender.clone();

        sender.send(Event::Benchmark(super::super::BenchmarkEvent::Started {
            total_configurations: 3,
        }));
        drop(sender);
        drop(second);

        assert_eq!(receiver.iter().count(), 1);
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Benchmark(super::super::BenchmarkEvent::Started {
            total_configurations: 0,
        }));
        // Should not panic even though no one is receiving
    }

    #[test]
    fn bounded_channel_respects_capacity() {
        let (sender, receiver) = bounded(2);

        sender.send(Event::Benchmark(super::super::BenchmarkEvent::Started {
            total_configurations: 1,
        }));
        sender.send(Event::Benchmark(super::super::BenchmarkEvent::Completed {
            total_records: 1,
        }));

        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_none());
    }
}
