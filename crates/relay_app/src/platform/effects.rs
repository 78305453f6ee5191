use relay_core::{Effect, Presentation, PresentationId};
use relay_engine::{EngineHandle, SendJob};
use relay_logging::relay_info;

/// Surface that displays presentations and performs user-facing side effects.
pub(crate) trait Presenter {
    fn show(&mut self, presentation: Presentation);
    fn update(&mut self, presentation: Presentation);
    fn dismiss(&mut self, id: PresentationId);
    fn open_url(&mut self, url: String);
    fn copy_to_clipboard(&mut self, id: PresentationId, text: String);
}

/// Routes effects: sends go to the engine, everything else to the presenter.
pub(crate) struct EffectRunner<P: Presenter> {
    engine: EngineHandle,
    presenter: P,
}

impl<P: Presenter> EffectRunner<P> {
    pub(crate) fn new(engine: EngineHandle, presenter: P) -> Self {
        Self { engine, presenter }
    }

    pub(crate) fn presenter(&self) -> &P {
        &self.presenter
    }

    pub(crate) fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SendSelection {
                    request_id,
                    selection,
                    page,
                    template,
                } => {
                    relay_info!(
                        "SendSelection request_id={} selection_len={} template={:?}",
                        request_id,
                        selection.as_str().len(),
                        template.map(|key| key.as_str())
                    );
                    self.engine.send(SendJob {
                        request_id,
                        selection,
                        page,
                        template,
                    });
                }
                Effect::Show(presentation) => self.presenter.show(presentation),
                Effect::Update(presentation) => self.presenter.update(presentation),
                Effect::Dismiss { id } => self.presenter.dismiss(id),
                Effect::OpenUrl { url } => self.presenter.open_url(url),
                Effect::CopyToClipboard { id, text } => self.presenter.copy_to_clipboard(id, text),
            }
        }
    }
}
