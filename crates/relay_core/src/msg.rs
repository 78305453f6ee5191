use std::time::Duration;

use crate::{PageMetadata, PresentationId, RelayError, RequestId, TemplateKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Host reported a selection-context trigger.
    SelectionTriggered {
        selection_text: String,
        page: Option<PageMetadata>,
        template: Option<TemplateKey>,
    },
    /// Engine finished a send; `Ok` carries the extracted reply text.
    SendFinished {
        request_id: RequestId,
        result: Result<String, RelayError>,
    },
    /// User clicked the body of a presentation.
    NotificationClicked { id: PresentationId },
    /// User clicked the "Open link" button.
    NotificationButtonClicked { id: PresentationId },
    /// Presentation went away by any means on the host side.
    NotificationClosed { id: PresentationId },
    /// Pointer or focus entered a toast.
    PointerEntered { id: PresentationId },
    /// Pointer or focus left a toast.
    PointerLeft { id: PresentationId },
    /// User clicked the "Copy" button.
    CopyClicked { id: PresentationId },
    /// Host reported the clipboard write result.
    CopyFinished { id: PresentationId, ok: bool },
    /// Time passed; drives toast expiry and copy acknowledgements.
    Tick { elapsed: Duration },
}
