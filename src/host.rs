//! Async host for the controller.
//!
//! Owns the pieces the controller leaves out: debounce timers, in-flight
//! requests and navigation. Input events arrive on an mpsc channel;
//! dropdown snapshots are published on a watch channel after every
//! change. Timer expiries and responses are fed back to the controller on
//! the same task, so the controller itself is never shared.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::controller::{ClickTarget, DropdownState, Effect, SearchBoxController, Seq, Ticket};
use crate::navigate::Navigator;
use crate::search::{SearchBackend, SearchError, SearchResponse};

/// Things that happen in the input field and around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Input(String),
    Submit(String),
    ViewAll,
    Focus,
    Click(ClickTarget),
    Shutdown,
}

enum Completion {
    TimerFired(Ticket),
    Response(Seq, Result<SearchResponse, SearchError>),
}

pub struct SearchBoxHost<B, N> {
    controller: SearchBoxController,
    backend: Arc<B>,
    navigator: N,
    timer: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    snapshot: watch::Sender<DropdownState>,
}

/// Channels for talking to a running host.
#[derive(Debug, Clone)]
pub struct HostHandle {
    pub events: mpsc::UnboundedSender<HostEvent>,
    pub dropdown: watch::Receiver<DropdownState>,
}

impl HostHandle {
    /// Returns `false` once the host has stopped.
    pub fn send(&self, event: HostEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

impl<B, N> SearchBoxHost<B, N>
where
    B: SearchBackend + 'static,
    N: Navigator,
{
    pub fn new(
        controller: SearchBoxController,
        backend: Arc<B>,
        navigator: N,
    ) -> (Self, watch::Receiver<DropdownState>) {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshot, snapshot_rx) = watch::channel(controller.dropdown().clone());
        (
            Self {
                controller,
                backend,
                navigator,
                timer: None,
                completions_tx,
                completions_rx,
                snapshot,
            },
            snapshot_rx,
        )
    }

    /// Process events until `Shutdown` or until every sender is dropped.
    /// Returns the controller for inspection.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<HostEvent>,
    ) -> SearchBoxController {
        loop {
            tokio::select! {
                event = events.recv() => {
                    let effects = match event {
                        None | Some(HostEvent::Shutdown) => break,
                        Some(HostEvent::Input(text)) => self.controller.on_input(&text),
                        Some(HostEvent::Submit(text)) => self.controller.on_submit(&text),
                        Some(HostEvent::ViewAll) => self.controller.on_view_all(),
                        Some(HostEvent::Focus) => self.controller.on_focus(),
                        Some(HostEvent::Click(target)) => self.controller.on_outside_click(target),
                    };
                    self.apply(effects);
                }
                Some(completion) = self.completions_rx.recv() => {
                    let effects = match completion {
                        Completion::TimerFired(ticket) => self.controller.on_timer(ticket),
                        Completion::Response(seq, result) => self.controller.on_response(seq, result),
                    };
                    self.apply(effects);
                }
            }
        }

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        debug!(component = "host", "search box host stopped");
        self.controller
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ArmTimer { ticket, delay } => {
                    if let Some(previous) = self.timer.take() {
                        previous.abort();
                    }
                    let tx = self.completions_tx.clone();
                    self.timer = Some(tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(Completion::TimerFired(ticket));
                    }));
                }
                Effect::CancelTimer => {
                    if let Some(previous) = self.timer.take() {
                        previous.abort();
                    }
                }
                Effect::Search { seq, request } => {
                    let backend = Arc::clone(&self.backend);
                    let tx = self.completions_tx.clone();
                    tokio::spawn(async move {
                        let result = backend.search(request).await;
                        let _ = tx.send(Completion::Response(seq, result));
                    });
                }
                Effect::Navigate { url } => {
                    if let Err(e) = self.navigator.navigate(&url) {
                        warn!(component = "host", url = %url, "navigation failed: {e}");
                    }
                }
                Effect::Redraw => {
                    self.snapshot.send_replace(self.controller.dropdown().clone());
                }
            }
        }
    }
}

/// Spawn a host on the current tokio runtime.
pub fn spawn_host<B, N>(
    controller: SearchBoxController,
    backend: Arc<B>,
    navigator: N,
) -> (HostHandle, JoinHandle<SearchBoxController>)
where
    B: SearchBackend + 'static,
    N: Navigator + Send + 'static,
{
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (host, dropdown) = SearchBoxHost::new(controller, backend, navigator);
    let join = tokio::spawn(host.run(events_rx));
    (
        HostHandle {
            events: events_tx,
            dropdown,
        },
        join,
    )
}

/// Run one query through `controller` without debouncing and wait for
/// the response. Used by the one-shot CLI commands.
pub async fn search_once<B: SearchBackend>(
    controller: &mut SearchBoxController,
    backend: &B,
    query: &str,
) -> Result<(), SearchError> {
    controller.on_input(query);
    for effect in controller.dispatch() {
        if let Effect::Search { seq, request } = effect {
            let result = backend.search(request).await;
            let failure = result.as_ref().err().cloned();
            controller.on_response(seq, result);
            if let Some(err) = failure {
                return Err(err);
            }
        }
    }
    Ok(())
}
