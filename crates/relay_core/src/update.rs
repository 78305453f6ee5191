use std::time::Duration;

use crate::presentation::{CopyAck, Outcome, PresentationId};
use crate::{AppState, Effect, Msg, RelayError, Selection};

pub const SUCCESS_TITLE: &str = "Response ready";
pub const FORWARDED_TITLE: &str = "Sent to backend";
pub const FORWARDED_MESSAGE: &str = "Your selection was forwarded successfully.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SelectionTriggered {
            selection_text,
            page,
            template,
        } => {
            // Preflight failures never reach the network.
            let accepted = state.config().validate().and_then(|()| {
                Selection::parse(&selection_text, state.config().menu_title())
            });
            match accepted {
                Ok(selection) => {
                    let request_id = state.begin_request();
                    let template = template.or(state.config().default_template);
                    vec![Effect::SendSelection {
                        request_id,
                        selection,
                        page,
                        template,
                    }]
                }
                Err(err) => present_error(&mut state, &err),
            }
        }
        Msg::SendFinished { request_id, result } => {
            if !state.finish_request(request_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(reply) => present_reply(&mut state, reply),
                Err(err) => present_error(&mut state, &err),
            }
        }
        Msg::NotificationClicked { id } | Msg::NotificationButtonClicked { id } => {
            match state.dismiss_presentation(id) {
                Some(session) => {
                    let mut effects = Vec::with_capacity(2);
                    if let Some(url) = session.target_url() {
                        effects.push(Effect::OpenUrl {
                            url: url.to_string(),
                        });
                    }
                    effects.push(Effect::Dismiss { id });
                    effects
                }
                None => Vec::new(),
            }
        }
        Msg::NotificationClosed { id } => {
            state.dismiss_presentation(id);
            Vec::new()
        }
        Msg::PointerEntered { id } => {
            if let Some(session) = state.session_mut(id) {
                session.lifecycle.suspend();
            }
            Vec::new()
        }
        Msg::PointerLeft { id } => {
            if let Some(session) = state.session_mut(id) {
                session.lifecycle.resume();
            }
            Vec::new()
        }
        Msg::CopyClicked { id } => state
            .session(id)
            .and_then(|session| session.copy_text())
            .map(|text| {
                vec![Effect::CopyToClipboard {
                    id,
                    text: text.to_string(),
                }]
            })
            .unwrap_or_default(),
        Msg::CopyFinished { id, ok } => {
            let rendered = state.session_mut(id).map(|session| {
                session.copy_ack = CopyAck::acknowledge(ok);
                session.render()
            });
            match rendered {
                Some(presentation) => {
                    state.mark_dirty();
                    vec![Effect::Update(presentation)]
                }
                None => Vec::new(),
            }
        }
        Msg::Tick { elapsed } => advance_presentations(&mut state, elapsed),
    };

    (state, effects)
}

fn present_reply(state: &mut AppState, reply: String) -> Vec<Effect> {
    let target_url = state.config().success_link_url.clone();
    let outcome = if reply.is_empty() {
        Outcome {
            title: FORWARDED_TITLE.to_string(),
            message: FORWARDED_MESSAGE.to_string(),
            is_error: false,
            target_url,
            copy_text: None,
        }
    } else {
        Outcome {
            title: SUCCESS_TITLE.to_string(),
            message: reply.clone(),
            is_error: false,
            target_url,
            copy_text: Some(reply),
        }
    };
    vec![Effect::Show(state.open_presentation(outcome).render())]
}

fn present_error(state: &mut AppState, err: &RelayError) -> Vec<Effect> {
    let outcome = Outcome {
        title: err.title().to_string(),
        message: err.to_string(),
        is_error: true,
        target_url: state.config().failure_link_url.clone(),
        copy_text: None,
    };
    vec![Effect::Show(state.open_presentation(outcome).render())]
}

fn advance_presentations(state: &mut AppState, elapsed: Duration) -> Vec<Effect> {
    let mut effects = Vec::new();
    let mut expired: Vec<PresentationId> = Vec::new();

    for id in state.presentation_ids() {
        let Some(session) = state.session_mut(id) else {
            continue;
        };
        if session.copy_ack.advance(elapsed) {
            effects.push(Effect::Update(session.render()));
        }
        if session.lifecycle.advance(elapsed) {
            expired.push(id);
        }
    }

    for id in expired {
        state.close_presentation(id);
        effects.push(Effect::Dismiss { id });
    }
    if !effects.is_empty() {
        state.mark_dirty();
    }
    effects
}
