use std::io::{self, Write};

use relay_core::{ActionKind, Presentation, PresentationId};
use relay_logging::{relay_debug, relay_error};

use super::effects::Presenter;
use super::native_messaging::{write_command, HostCommand};

const DISPLAY_FAILED_TITLE: &str = "Display failed";
const DISPLAY_FAILED_MESSAGE: &str = "The result was too large to display.";

/// Plain-text rendering of a presentation for terminal output.
pub(crate) fn render_text(presentation: &Presentation) -> String {
    let mut out = format!("{}\n{}", presentation.title, presentation.message);
    if let Some(url) = &presentation.target_url {
        let label = presentation
            .actions
            .iter()
            .find(|button| button.action == ActionKind::OpenLink)
            .map(|button| button.label.as_str())
            .unwrap_or("Link");
        out.push_str(&format!("\n{label}: {url}"));
    }
    out
}

/// Prints presentations for the one-shot `send` command.
pub(crate) struct TerminalPresenter<W: Write> {
    out: W,
    last: Option<Presentation>,
}

impl<W: Write> TerminalPresenter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub(crate) fn last(&self) -> Option<&Presentation> {
        self.last.as_ref()
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            relay_error!("Failed to write to terminal: {}", err);
        }
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn show(&mut self, presentation: Presentation) {
        let text = render_text(&presentation);
        self.print(&text);
        self.last = Some(presentation);
    }

    fn update(&mut self, presentation: Presentation) {
        self.last = Some(presentation);
    }

    fn dismiss(&mut self, id: PresentationId) {
        relay_debug!("presentation {} dismissed", id);
    }

    fn open_url(&mut self, url: String) {
        self.print(&format!("Open: {url}"));
    }

    fn copy_to_clipboard(&mut self, id: PresentationId, _text: String) {
        relay_debug!("presentation {} copy requested without a clipboard", id);
    }
}

/// Forwards presentation effects to the browser as native-messaging frames.
pub(crate) struct HostPresenter<W: Write> {
    out: W,
}

impl<W: Write> HostPresenter<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn send(&mut self, command: HostCommand) -> io::Result<()> {
        let result = write_command(&mut self.out, &command);
        if let Err(err) = &result {
            relay_error!("Failed to write host command: {}", err);
        }
        result
    }

    /// Show `presentation`, or a short error in its place if it cannot be framed.
    fn show_or_fallback(&mut self, presentation: Presentation) {
        let fallback = Presentation {
            id: presentation.id,
            style: presentation.style,
            title: DISPLAY_FAILED_TITLE.to_string(),
            message: DISPLAY_FAILED_MESSAGE.to_string(),
            is_error: true,
            target_url: None,
            actions: Vec::new(),
        };
        if self.send(HostCommand::Show { presentation }).is_err() {
            let _ = self.send(HostCommand::Show {
                presentation: fallback,
            });
        }
    }
}

impl<W: Write> Presenter for HostPresenter<W> {
    fn show(&mut self, presentation: Presentation) {
        self.show_or_fallback(presentation);
    }

    fn update(&mut self, presentation: Presentation) {
        let _ = self.send(HostCommand::Update { presentation });
    }

    fn dismiss(&mut self, id: PresentationId) {
        let _ = self.send(HostCommand::Dismiss { id });
    }

    fn open_url(&mut self, url: String) {
        let _ = self.send(HostCommand::OpenUrl { url });
    }

    fn copy_to_clipboard(&mut self, id: PresentationId, text: String) {
        let _ = self.send(HostCommand::CopyToClipboard { id, text });
    }
}
