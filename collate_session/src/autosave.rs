//! Debounced, serialized persistence of the reconciled text.
//!
//! A worker task owns the store handle. Mutations restart a quiet-period
//! timer; when it fires the latest payload is saved. At most one save is in
//! flight at a time: anything that arrives while a save is running is picked
//! up once it completes and, if it still differs from what was just saved,
//! written immediately — without another debounce — so edits made mid-save
//! are never dropped.

use std::time::Duration;

use anyhow::anyhow;
use log::{debug, warn};
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};

use crate::{
    errors::SessionError,
    store::{CorrectionStore, DocumentId, PageNumber, SavedPage},
};

/// Quiet period after the last mutation before a save fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(2000);

/// What the worker reports back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveEvent {
    Saved { page: PageNumber, correction: SavedPage },
    SaveFailed { page: PageNumber, message: String },
}

#[derive(Debug)]
enum Message {
    TextChanged {
        page: PageNumber,
        correction: SavedPage,
    },
    Flush {
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    Retry,
    DiscardPending,
}

/// Handle to the save worker for one document's session. Dropping the handle
/// shuts the worker down once any in-flight save has settled.
#[derive(Debug)]
pub struct Autosaver {
    sender: mpsc::UnboundedSender<Message>,
    events: mpsc::UnboundedReceiver<AutosaveEvent>,
    document: DocumentId,
}

impl Autosaver {
    pub fn spawn<S>(store: S, document: DocumentId, quiet_period: Duration) -> Self
    where
        S: CorrectionStore + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (event_sender, events) = mpsc::unbounded_channel();

        let worker = Worker {
            store,
            document,
            receiver,
            events: event_sender,
            quiet_period,
            pending: None,
            deadline: None,
            waiting_flushes: Vec::new(),
        };
        tokio::spawn(worker.run());

        Self {
            sender,
            events,
            document,
        }
    }

    /// Record the latest payload for the page and (re)start the quiet-period
    /// timer.
    pub fn text_changed(&self, page: PageNumber, correction: SavedPage) {
        let _ = self.sender.send(Message::TextChanged { page, correction });
    }

    /// Save whatever is pending right now, skipping the quiet period, and
    /// wait for the result. Used by the navigation guard.
    ///
    /// # Errors
    ///
    /// `SaveFailure` when the store rejects the save (or the worker is
    /// gone); the pending payload is kept for an explicit retry.
    pub async fn flush(&self) -> Result<(), SessionError> {
        let (reply, response) = oneshot::channel();

        self.sender
            .send(Message::Flush { reply })
            .map_err(|_| self.worker_gone())?;

        response.await.map_err(|_| self.worker_gone())?
    }

    /// Re-attempt the save that previously failed.
    pub fn retry(&self) { let _ = self.sender.send(Message::Retry); }

    /// Drop the pending payload; the user chose to lose the edit.
    pub fn discard_pending(&self) { let _ = self.sender.send(Message::DiscardPending); }

    /// Events emitted since the last call, oldest first.
    pub fn try_events(&mut self) -> Vec<AutosaveEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    fn worker_gone(&self) -> SessionError {
        SessionError::SaveFailure {
            document: self.document,
            page: 0,
            source: anyhow!("The autosave worker is no longer running"),
        }
    }
}

#[derive(Debug)]
struct Worker<S> {
    store: S,
    document: DocumentId,
    receiver: mpsc::UnboundedReceiver<Message>,
    events: mpsc::UnboundedSender<AutosaveEvent>,
    quiet_period: Duration,
    pending: Option<(PageNumber, SavedPage)>,
    deadline: Option<Instant>,
    waiting_flushes: Vec<oneshot::Sender<Result<(), SessionError>>>,
}

impl<S> Worker<S>
where
    S: CorrectionStore,
{
    async fn run(mut self) {
        loop {
            let message = match self.deadline {
                Some(deadline) => tokio::select! {
                    message = self.receiver.recv() => message,
                    () = sleep_until(deadline) => {
                        self.settle().await;
                        continue;
                    }
                },
                None => self.receiver.recv().await,
            };

            let Some(message) = message else { break };

            match message {
                Message::TextChanged { page, correction } => {
                    self.pending = Some((page, correction));
                    self.deadline = Some(Instant::now() + self.quiet_period);
                }
                Message::Flush { reply } => {
                    self.waiting_flushes.push(reply);
                    self.settle().await;
                }
                Message::Retry => {
                    self.settle().await;
                }
                Message::DiscardPending => {
                    self.pending = None;
                    self.deadline = None;
                }
            }
        }

        // The session hung up; one last chance for anything still pending.
        if self.pending.is_some() {
            self.settle().await;
        }
    }

    /// Save the latest pending payload, then keep saving — immediately,
    /// without a debounce — as long as edits that arrived mid-save left the
    /// payload different from what was just written. Stops at the first
    /// failure: failed saves are surfaced and only retried on request.
    async fn settle(&mut self) {
        self.deadline = None;
        let mut failure: Option<(PageNumber, String)> = None;

        while let Some((page, correction)) = self.pending.take() {
            let result = self.store.save(self.document, page, &correction).await;

            // Anything buffered while the save was in flight was a mutation
            // recorded at its own time; pick up the newest payload before
            // deciding whether another save is due.
            self.drain_buffered_messages();

            match result {
                Ok(()) => {
                    debug!("Saved page {page} of document {}", self.document);
                    failure = None;

                    if self
                        .pending
                        .as_ref()
                        .is_some_and(|(pending_page, pending_correction)| {
                            *pending_page == page && *pending_correction == correction
                        })
                    {
                        // Nothing newer arrived.
                        self.pending = None;
                    }

                    let _ = self.events.send(AutosaveEvent::Saved { page, correction });
                }
                Err(error) => {
                    warn!(
                        "Failed to save page {page} of document {}: {error:?}",
                        self.document
                    );
                    let message = format!("{error:#}");
                    let _ = self.events.send(AutosaveEvent::SaveFailed {
                        page,
                        message: message.clone(),
                    });

                    // Keep the payload for an explicit retry — unless a newer
                    // edit already superseded it.
                    if self.pending.is_none() {
                        self.pending = Some((page, correction));
                    }
                    failure = Some((page, message));
                    break;
                }
            }
        }

        let document = self.document;
        let settled = |failure: &Option<(PageNumber, String)>| match failure {
            None => Ok(()),
            Some((page, message)) => Err(SessionError::SaveFailure {
                document,
                page: *page,
                source: anyhow!(message.clone()),
            }),
        };

        for reply in self.waiting_flushes.drain(..) {
            let _ = reply.send(settled(&failure));
        }
    }

    fn drain_buffered_messages(&mut self) {
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                Message::TextChanged { page, correction } => {
                    self.pending = Some((page, correction));
                }
                Message::Flush { reply } => self.waiting_flushes.push(reply),
                // A save is already running; there is nothing extra to do.
                Message::Retry => {}
                Message::DiscardPending => self.pending = None,
            }
        }
    }
}
