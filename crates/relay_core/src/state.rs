use std::collections::{BTreeMap, BTreeSet};

use crate::presentation::{Outcome, PresentationId, PresentationSession};
use crate::view_model::AppViewModel;
use crate::RelayConfig;

pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    config: RelayConfig,
    next_request_id: RequestId,
    next_presentation_id: PresentationId,
    in_flight: BTreeSet<RequestId>,
    presentations: BTreeMap<PresentationId, PresentationSession>,
    dirty: bool,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            in_flight: self.in_flight.len(),
            presentations: self
                .presentations
                .values()
                .filter(|session| session.lifecycle.is_shown())
                .map(PresentationSession::render)
                .collect(),
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_in_flight(&self, request_id: RequestId) -> bool {
        self.in_flight.contains(&request_id)
    }

    pub fn session(&self, id: PresentationId) -> Option<&PresentationSession> {
        self.presentations.get(&id)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn begin_request(&mut self) -> RequestId {
        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.in_flight.insert(request_id);
        self.dirty = true;
        request_id
    }

    /// Returns false for unknown or already finished requests.
    pub(crate) fn finish_request(&mut self, request_id: RequestId) -> bool {
        let removed = self.in_flight.remove(&request_id);
        if removed {
            self.dirty = true;
        }
        removed
    }

    pub(crate) fn open_presentation(&mut self, outcome: Outcome) -> &PresentationSession {
        self.next_presentation_id += 1;
        let id = self.next_presentation_id;
        let session = PresentationSession::new(id, self.config.presenter, outcome);
        self.dirty = true;
        self.presentations.entry(id).or_insert(session)
    }

    pub(crate) fn session_mut(&mut self, id: PresentationId) -> Option<&mut PresentationSession> {
        self.presentations.get_mut(&id)
    }

    /// User-driven end of a presentation: marks it dismissed, then drops it.
    pub(crate) fn dismiss_presentation(
        &mut self,
        id: PresentationId,
    ) -> Option<PresentationSession> {
        if let Some(session) = self.presentations.get_mut(&id) {
            session.lifecycle.dismiss();
        }
        self.close_presentation(id)
    }

    /// Removes the record; the presentation is gone for good.
    pub(crate) fn close_presentation(&mut self, id: PresentationId) -> Option<PresentationSession> {
        let removed = self.presentations.remove(&id);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub(crate) fn presentation_ids(&self) -> Vec<PresentationId> {
        self.presentations.keys().copied().collect()
    }
}
