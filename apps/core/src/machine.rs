//! The lookup controller: form submission in, persistence/fetch effects out.
//!
//! `Idle -> Validating -> (Invalid | Fetching) -> (Rendered | Failed) -> Idle`
//!
//! The controller never performs I/O itself. Each [`LookupController::dispatch`]
//! call returns a [`Transition`] listing the phases walked through and the
//! effects the host must run, in order.

use std::fmt;

use crate::config::TrackerConfig;
use crate::map::{LatLng, MapView};
use crate::notification::Notification;
use crate::record::{LookupError, LookupRecord};
use crate::validate::Ipv4Query;
use crate::view::InfoPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    Validating,
    Invalid,
    Fetching,
    Rendered,
    Failed,
}

impl fmt::Display for LookupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Validating => write!(f, "Validating"),
            Self::Invalid => write!(f, "Invalid"),
            Self::Fetching => write!(f, "Fetching"),
            Self::Rendered => write!(f, "Rendered"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// Identifies one outbound lookup. Later requests compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub id: RequestId,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupEvent {
    /// First lookup with the persisted (or default) address.
    Startup(String),
    /// Raw contents of the query field.
    Submit(String),
    Resolved {
        request: RequestId,
        result: Result<LookupRecord, LookupError>,
    },
}

impl fmt::Display for LookupEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup(address) => write!(f, "Startup({address})"),
            Self::Submit(raw) => write!(f, "Submit({raw:?})"),
            Self::Resolved {
                request,
                result: Ok(_),
            } => write!(f, "Resolved({request}, ok)"),
            Self::Resolved {
                request,
                result: Err(error),
            } => write!(f, "Resolved({request}, {error})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Overwrite the stored last query.
    Persist(Ipv4Query),
    /// Send the lookup and feed the outcome back as [`LookupEvent::Resolved`].
    Fetch(LookupRequest),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub trace: Vec<LookupPhase>,
    pub effects: Vec<Effect>,
    /// Set when a response arrived for a request that has been superseded.
    pub discarded: bool,
}

impl Transition {
    pub fn fetch(&self) -> Option<&LookupRequest> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Fetch(request) => Some(request),
            Effect::Persist(_) => None,
        })
    }
}

#[derive(Debug)]
pub struct TransitionError {
    from: LookupPhase,
    event: String,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid transition from {} with event {}",
            self.from, self.event
        )
    }
}

impl std::error::Error for TransitionError {}

#[derive(Debug)]
pub struct LookupController {
    config: TrackerConfig,
    phase: LookupPhase,
    panel: InfoPanel,
    map: MapView,
    notification: Option<Notification>,
    last_record: Option<LookupRecord>,
    next_request: u64,
    outstanding: Option<RequestId>,
    started: bool,
}

impl LookupController {
    pub fn new(config: TrackerConfig) -> Self {
        let map = MapView::initialize(&config.map).with_marker_policy(config.marker_policy);
        Self {
            config,
            phase: LookupPhase::Idle,
            panel: InfoPanel::skeleton(),
            map,
            notification: None,
            last_record: None,
            next_request: 0,
            outstanding: None,
            started: false,
        }
    }

    pub const fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub const fn phase(&self) -> LookupPhase {
        self.phase
    }

    pub const fn is_fetching(&self) -> bool {
        self.outstanding.is_some()
    }

    pub const fn panel(&self) -> &InfoPanel {
        &self.panel
    }

    pub const fn map(&self) -> &MapView {
        &self.map
    }

    pub const fn map_mut(&mut self) -> &mut MapView {
        &mut self.map
    }

    pub const fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub const fn last_record(&self) -> Option<&LookupRecord> {
        self.last_record.as_ref()
    }

    pub fn dispatch(&mut self, event: LookupEvent) -> Result<Transition, TransitionError> {
        match event {
            LookupEvent::Startup(address) => self.startup(address),
            LookupEvent::Submit(raw) => Ok(self.submit(&raw)),
            LookupEvent::Resolved { request, result } => self.resolve(request, result),
        }
    }

    fn startup(&mut self, address: String) -> Result<Transition, TransitionError> {
        if self.started {
            return Err(self.reject(&LookupEvent::Startup(address)));
        }
        self.started = true;

        let request = self.issue(address);
        self.phase = LookupPhase::Fetching;
        Ok(Transition {
            trace: vec![LookupPhase::Fetching],
            effects: vec![Effect::Fetch(request)],
            discarded: false,
        })
    }

    fn submit(&mut self, raw: &str) -> Transition {
        self.started = true;
        let mut trace = vec![LookupPhase::Validating];

        let Ok(query) = Ipv4Query::parse(raw) else {
            self.notification = Some(Notification::invalid_address());
            trace.push(LookupPhase::Invalid);
            trace.push(self.resting_phase());
            self.phase = self.resting_phase();
            return Transition {
                trace,
                effects: Vec::new(),
                discarded: false,
            };
        };

        let request = self.issue(query.as_str().to_string());
        trace.push(LookupPhase::Fetching);
        self.phase = LookupPhase::Fetching;

        Transition {
            trace,
            effects: vec![Effect::Persist(query), Effect::Fetch(request)],
            discarded: false,
        }
    }

    fn resolve(
        &mut self,
        request: RequestId,
        result: Result<LookupRecord, LookupError>,
    ) -> Result<Transition, TransitionError> {
        let latest = match self.outstanding {
            Some(latest) if request <= latest => latest,
            _ => return Err(self.reject(&LookupEvent::Resolved { request, result })),
        };

        if request < latest {
            return Ok(Transition {
                trace: vec![self.phase],
                effects: Vec::new(),
                discarded: true,
            });
        }

        self.outstanding = None;
        let outcome = match result {
            Ok(record) => {
                self.render(&record);
                self.last_record = Some(record);
                LookupPhase::Rendered
            }
            Err(_) => {
                self.notification = Some(Notification::lookup_failure());
                LookupPhase::Failed
            }
        };
        self.phase = LookupPhase::Idle;

        Ok(Transition {
            trace: vec![outcome, LookupPhase::Idle],
            effects: Vec::new(),
            discarded: false,
        })
    }

    fn render(&mut self, record: &LookupRecord) {
        self.panel.render(record);
        self.map.update(LatLng::new(record.lat, record.lng));
        self.map.apply_mobile_offset(
            self.config.mobile_breakpoint,
            self.config.mobile_offset_ratio,
        );
    }

    fn issue(&mut self, address: String) -> LookupRequest {
        self.next_request += 1;
        let id = RequestId(self.next_request);
        self.outstanding = Some(id);
        LookupRequest { id, address }
    }

    const fn resting_phase(&self) -> LookupPhase {
        if self.outstanding.is_some() {
            LookupPhase::Fetching
        } else {
            LookupPhase::Idle
        }
    }

    fn reject(&self, event: &LookupEvent) -> TransitionError {
        TransitionError {
            from: self.phase,
            event: event.to_string(),
        }
    }
}
