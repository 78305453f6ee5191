use crate::{PageMetadata, Presentation, PresentationId, RequestId, Selection, TemplateKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// The one primary outbound request for an accepted trigger.
    SendSelection {
        request_id: RequestId,
        selection: Selection,
        page: Option<PageMetadata>,
        template: Option<TemplateKey>,
    },
    Show(Presentation),
    /// Re-render an existing presentation, e.g. after a copy acknowledgement.
    Update(Presentation),
    Dismiss { id: PresentationId },
    OpenUrl { url: String },
    CopyToClipboard { id: PresentationId, text: String },
}
