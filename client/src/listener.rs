//! Background frame reader that publishes board updates.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use codec::{BoardView, ProtocolError};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use tracing::{debug, info, warn};

use crate::session::Session;

/// Events kept for a consumer that is not draining the queue. Older events
/// are dropped first; [`Listener::latest`] always has the newest board.
pub const EVENT_CAPACITY: usize = 64;

/// The latest board, shared between the listener thread and its readers.
pub type SharedBoard = Arc<RwLock<BoardView>>;

/// What the listener thread reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerEvent {
    /// A frame was applied.
    Frame(BoardView),
    /// A frame was rejected; the board is unchanged and reading continues.
    Rejected(ProtocolError),
    /// The connection failed or closed. Always the last event.
    Ended(ProtocolError),
}

/// Owns a session on a background thread and reads frames until stopped.
///
/// The thread checks its stop flag between reads, so a session whose stream
/// has no read timeout only stops once the next frame or error arrives.
/// At most [`EVENT_CAPACITY`] events are queued.
#[derive(Debug)]
pub struct Listener<S> {
    events: Receiver<ListenerEvent>,
    shared: SharedBoard,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<Session<S>>>,
}

impl<S> Listener<S>
where
    S: Read + Write + Send + 'static,
{
    /// Moves `session` onto a new thread and starts reading.
    pub fn spawn(session: Session<S>) -> Self {
        let (tx, events) = bounded(EVENT_CAPACITY);
        let shared = Arc::new(RwLock::new(session.view()));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let shared = Arc::clone(&shared);
            let stop = Arc::clone(&stop);
            let queue = Outbox {
                tx,
                rx: events.clone(),
            };
            thread::spawn(move || run(session, &queue, &shared, &stop))
        };
        info!("listener started");

        Self {
            events,
            shared,
            stop,
            handle: Some(handle),
        }
    }

    /// Stops the thread and returns the session, or `None` if the thread panicked.
    pub fn stop(mut self) -> Option<Session<S>> {
        self.stop.store(true, Ordering::Release);
        self.handle.take().and_then(|handle| handle.join().ok())
    }

    /// Like [`stop`](Self::stop), but waits at most `timeout` for the thread.
    ///
    /// Returns `None` if the thread is still blocked in a read when the wait
    /// ends. The thread is then left to exit on its own after that read.
    pub fn stop_timeout(mut self, timeout: Duration) -> Option<Session<S>> {
        self.stop.store(true, Ordering::Release);
        let deadline = Instant::now() + timeout;
        while !self.is_finished() {
            if Instant::now() >= deadline {
                debug!("listener still reading; detaching");
                return None;
            }
            thread::sleep(STOP_POLL);
        }
        self.handle.take().and_then(|handle| handle.join().ok())
    }
}

const STOP_POLL: Duration = Duration::from_millis(5);

impl<S> Listener<S> {
    /// Blocks for the next event. `None` once the thread is gone and drained.
    pub fn recv(&self) -> Option<ListenerEvent> {
        self.events.recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ListenerEvent> {
        match self.events.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Returns the next event if one is queued.
    pub fn try_recv(&self) -> Option<ListenerEvent> {
        match self.events.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Returns a copy of the most recently applied board.
    pub fn latest(&self) -> BoardView {
        self.shared
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns a handle to the shared board for other readers.
    pub fn shared(&self) -> SharedBoard {
        Arc::clone(&self.shared)
    }

    /// Returns `true` once the thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl<S> Drop for Listener<S> {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

/// Sending half of the event queue. Holds a receiver so a full queue can
/// shed its oldest event instead of blocking the reader.
struct Outbox {
    tx: Sender<ListenerEvent>,
    rx: Receiver<ListenerEvent>,
}

impl Outbox {
    fn publish(&self, mut event: ListenerEvent) {
        loop {
            match self.tx.try_send(event) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(back)) => {
                    if self.rx.try_recv().is_ok() {
                        debug!("event queue full; dropped oldest event");
                    }
                    event = back;
                }
            }
        }
    }
}

fn run<S: Read + Write>(
    mut session: Session<S>,
    events: &Outbox,
    shared: &RwLock<BoardView>,
    stop: &AtomicBool,
) -> Session<S> {
    while !stop.load(Ordering::Acquire) {
        match session.next_frame() {
            Ok(view) => {
                *shared.write().unwrap_or_else(PoisonError::into_inner) = view.clone();
                events.publish(ListenerEvent::Frame(view));
            }
            Err(err) if err.is_idle_timeout() => {}
            Err(err) if !err.is_fatal() => {
                warn!(error = %err, "frame rejected");
                events.publish(ListenerEvent::Rejected(err));
            }
            Err(err) => {
                if err == ProtocolError::Closed {
                    info!("server closed the connection");
                } else {
                    warn!(error = %err, "listener stopped on error");
                }
                events.publish(ListenerEvent::Ended(err));
                return session;
            }
        }
    }
    info!(frames = session.frames_applied(), "listener stopped");
    session
}
