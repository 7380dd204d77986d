//! Search box controller.
//!
//! A single-threaded state machine between the input field, the remote
//! search call and the dropdown. It performs no I/O: every event handler
//! returns the [`Effect`]s the host must carry out (arm a timer, send a
//! request, navigate, repaint). Timers and requests are tagged so late
//! deliveries can be recognised and ignored:
//!
//! - each armed debounce timer gets a fresh [`Ticket`]; only the latest one
//!   may dispatch,
//! - each dispatched request gets a monotonically increasing [`Seq`]; only
//!   the most recently issued one may update the dropdown.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ConfigError, SearchBoxConfig};
use crate::navigate::results_url;
use crate::render::{DisplayItem, SafeMarkup, render_dropdown, resolve};
use crate::search::{SearchError, SearchRequest, SearchResponse};

/// Identifies one armed debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Ticket(pub u64);

/// Identifies one dispatched search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Seq(pub u64);

/// What the dropdown currently holds. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DropdownContent {
    #[default]
    Empty,
    NoResults {
        query: String,
    },
    Results {
        query: String,
        items: Vec<DisplayItem>,
        /// Total matches reported by the service; may exceed `items`.
        #[serde(skip_serializing_if = "Option::is_none")]
        total: Option<u64>,
    },
}

impl DropdownContent {
    pub fn is_empty(&self) -> bool {
        matches!(self, DropdownContent::Empty)
    }

    /// Content for a completed search of `query`.
    pub fn from_response(query: &str, response: &SearchResponse, config: &SearchBoxConfig) -> Self {
        let items: Vec<DisplayItem> = response
            .items
            .iter()
            .map(|item| resolve(item, config))
            .collect();
        if items.is_empty() {
            DropdownContent::NoResults {
                query: query.to_string(),
            }
        } else {
            DropdownContent::Results {
                query: query.to_string(),
                items,
                total: response.nb_hits,
            }
        }
    }

    pub fn items(&self) -> &[DisplayItem] {
        match self {
            DropdownContent::Results { items, .. } => items,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DropdownState {
    pub visible: bool,
    pub content: DropdownContent,
}

/// Where a click landed, resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Input,
    Dropdown,
    Outside,
}

/// Work for the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Fire [`SearchBoxController::on_timer`] with `ticket` after `delay`,
    /// replacing any timer armed earlier.
    ArmTimer { ticket: Ticket, delay: Duration },
    /// Drop the armed timer, if any.
    CancelTimer,
    /// Send `request`; deliver the outcome to
    /// [`SearchBoxController::on_response`] with the same `seq`.
    Search { seq: Seq, request: SearchRequest },
    Navigate { url: String },
    /// Dropdown state changed.
    Redraw,
}

#[derive(Debug, Clone)]
struct InFlight {
    seq: Seq,
    query: String,
}

#[derive(Debug)]
pub struct SearchBoxController {
    config: Arc<SearchBoxConfig>,
    query: String,
    dropdown: DropdownState,
    pending: Option<Ticket>,
    next_ticket: u64,
    next_seq: u64,
    authoritative: Option<InFlight>,
}

impl SearchBoxController {
    /// Fails when the configuration is incomplete; the host then leaves the
    /// input alone.
    pub fn new(config: SearchBoxConfig) -> Result<Self, ConfigError> {
        Self::with_shared_config(Arc::new(config))
    }

    pub fn with_shared_config(config: Arc<SearchBoxConfig>) -> Result<Self, ConfigError> {
        config.ensure_valid()?;
        Ok(Self {
            config,
            query: String::new(),
            dropdown: DropdownState::default(),
            pending: None,
            next_ticket: 0,
            next_seq: 0,
            authoritative: None,
        })
    }

    pub fn config(&self) -> &Arc<SearchBoxConfig> {
        &self.config
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn dropdown(&self) -> &DropdownState {
        &self.dropdown
    }

    /// Current dropdown body as escaped markup.
    pub fn markup(&self) -> SafeMarkup {
        render_dropdown(&self.dropdown.content, &self.config)
    }

    pub fn has_pending_dispatch(&self) -> bool {
        self.pending.is_some()
    }

    /// Sequence number whose response would currently be applied.
    pub fn in_flight(&self) -> Option<Seq> {
        self.authoritative.as_ref().map(|f| f.seq)
    }

    fn meets_minimum(&self) -> bool {
        self.query.chars().count() >= self.config.input.min_chars
    }

    fn set_visible(&mut self, visible: bool, effects: &mut Vec<Effect>) {
        if self.dropdown.visible != visible {
            self.dropdown.visible = visible;
            effects.push(Effect::Redraw);
        }
    }

    fn cancel_pending(&mut self, effects: &mut Vec<Effect>) {
        if self.pending.take().is_some() {
            effects.push(Effect::CancelTimer);
        }
    }

    /// A keystroke changed the input to `text`.
    pub fn on_input(&mut self, text: &str) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.query = text.trim().to_string();
        self.cancel_pending(&mut effects);

        if !self.meets_minimum() {
            if self.authoritative.take().is_some() {
                debug!(component = "controller", "query too short; in-flight response invalidated");
            }
            let had_content = !self.dropdown.content.is_empty();
            self.dropdown.content = DropdownContent::Empty;
            self.set_visible(false, &mut effects);
            if had_content && !effects.contains(&Effect::Redraw) {
                effects.push(Effect::Redraw);
            }
            return effects;
        }

        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.pending = Some(ticket);
        effects.push(Effect::ArmTimer {
            ticket,
            delay: self.config.debounce(),
        });
        effects
    }

    /// The debounce timer `ticket` elapsed.
    pub fn on_timer(&mut self, ticket: Ticket) -> Vec<Effect> {
        if self.pending != Some(ticket) {
            debug!(
                component = "controller",
                ticket = ticket.0,
                "ignoring superseded debounce timer"
            );
            return Vec::new();
        }
        self.pending = None;
        self.dispatch()
    }

    /// Issue a search for the current query now. The new request becomes
    /// the only one whose response will be applied.
    pub fn dispatch(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        if !self.meets_minimum() {
            return effects;
        }

        self.next_seq += 1;
        let seq = Seq(self.next_seq);
        let request = SearchRequest {
            query: self.query.clone(),
            count: self.config.dropdown.hits_per_page,
            fields: self.config.fields.retrieve_keys(),
            highlight_fields: self.config.fields.highlight_keys(),
        };
        if let Some(previous) = self.authoritative.replace(InFlight {
            seq,
            query: self.query.clone(),
        }) {
            debug!(
                component = "controller",
                superseded = previous.seq.0,
                seq = seq.0,
                "newer query issued before response"
            );
        }
        debug!(
            component = "controller",
            operation = "dispatch",
            seq = seq.0,
            query_len = self.query.chars().count(),
            "dispatching search"
        );
        effects.push(Effect::Search { seq, request });
        effects
    }

    /// The request tagged `seq` completed.
    pub fn on_response(
        &mut self,
        seq: Seq,
        result: Result<SearchResponse, SearchError>,
    ) -> Vec<Effect> {
        let in_flight = match self.authoritative.take() {
            Some(f) if f.seq == seq => f,
            other => {
                debug!(
                    component = "controller",
                    seq = seq.0,
                    current = other.as_ref().map(|f| f.seq.0),
                    "dropping stale response"
                );
                self.authoritative = other;
                return Vec::new();
            }
        };

        let mut effects = Vec::new();
        match result {
            Ok(response) => {
                let content =
                    DropdownContent::from_response(&in_flight.query, &response, &self.config);
                debug!(
                    component = "controller",
                    operation = "render",
                    seq = seq.0,
                    hits = content.items().len(),
                    processing_time_ms = response.processing_time_ms,
                    "applying search results"
                );
                self.dropdown.content = content;
                self.dropdown.visible = true;
                effects.push(Effect::Redraw);
            }
            Err(err) => {
                warn!(component = "controller", seq = seq.0, "search error: {err}");
                self.dropdown.content = DropdownContent::Empty;
                self.set_visible(false, &mut effects);
            }
        }
        effects
    }

    /// Enter key or search icon with the input's current `text`.
    pub fn on_submit(&mut self, text: &str) -> Vec<Effect> {
        let Some(url) = results_url(&self.config.results, text) else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        self.cancel_pending(&mut effects);
        self.authoritative = None;
        self.query.clear();
        self.dropdown.content = DropdownContent::Empty;
        self.set_visible(false, &mut effects);
        effects.push(Effect::Navigate { url });
        effects
    }

    /// "View all results" for the current query.
    pub fn on_view_all(&mut self) -> Vec<Effect> {
        let query = self.query.clone();
        self.on_submit(&query)
    }

    pub fn on_outside_click(&mut self, target: ClickTarget) -> Vec<Effect> {
        let mut effects = Vec::new();
        if target == ClickTarget::Outside {
            self.set_visible(false, &mut effects);
        }
        effects
    }

    /// Input regained focus: bring back a dismissed dropdown.
    pub fn on_focus(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.meets_minimum() && !self.dropdown.content.is_empty() {
            self.set_visible(true, &mut effects);
        }
        effects
    }
}
