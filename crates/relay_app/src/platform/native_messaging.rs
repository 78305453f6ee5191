//! Browser native-messaging framing and the host message vocabulary.
//!
//! Every message is a 4-byte length in native byte order followed by that
//! many bytes of UTF-8 JSON.

use std::io::{self, ErrorKind, Read, Write};

use relay_core::{Msg, PageMetadata, Presentation, PresentationId, TemplateKey};
use relay_logging::relay_warn;
use serde::{Deserialize, Serialize};

pub(crate) const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Inbound events from the extension side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum HostEvent {
    Trigger {
        selection_text: String,
        #[serde(default)]
        page: Option<PageMetadata>,
        #[serde(default)]
        template: Option<String>,
    },
    NotificationClicked {
        id: PresentationId,
    },
    NotificationButtonClicked {
        id: PresentationId,
    },
    NotificationClosed {
        id: PresentationId,
    },
    PointerEntered {
        id: PresentationId,
    },
    PointerLeft {
        id: PresentationId,
    },
    CopyClicked {
        id: PresentationId,
    },
    CopyFinished {
        id: PresentationId,
        ok: bool,
    },
}

impl HostEvent {
    pub(crate) fn into_msg(self) -> Msg {
        match self {
            HostEvent::Trigger {
                selection_text,
                page,
                template,
            } => Msg::SelectionTriggered {
                selection_text,
                page,
                template: template.as_deref().and_then(|name| {
                    let key = TemplateKey::parse(name);
                    if key.is_none() {
                        relay_warn!("Requested unknown prompt template \"{name}\".");
                    }
                    key
                }),
            },
            HostEvent::NotificationClicked { id } => Msg::NotificationClicked { id },
            HostEvent::NotificationButtonClicked { id } => Msg::NotificationButtonClicked { id },
            HostEvent::NotificationClosed { id } => Msg::NotificationClosed { id },
            HostEvent::PointerEntered { id } => Msg::PointerEntered { id },
            HostEvent::PointerLeft { id } => Msg::PointerLeft { id },
            HostEvent::CopyClicked { id } => Msg::CopyClicked { id },
            HostEvent::CopyFinished { id, ok } => Msg::CopyFinished { id, ok },
        }
    }
}

/// Outbound commands for the extension side to carry out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum HostCommand {
    Show { presentation: Presentation },
    Update { presentation: Presentation },
    Dismiss { id: PresentationId },
    OpenUrl { url: String },
    CopyToClipboard { id: PresentationId, text: String },
}

/// Read one frame; `Ok(None)` on a clean end of stream.
pub(crate) fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    match reader.read_exact(&mut len_bytes) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err),
    }
    let len = u32::from_ne_bytes(len_bytes) as usize;
    if len > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("frame of {len} bytes exceeds {MAX_FRAME_BYTES}"),
        ));
    }
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload)?;
    Ok(Some(payload))
}

pub(crate) fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    if payload.len() > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("frame of {} bytes exceeds {MAX_FRAME_BYTES}", payload.len()),
        ));
    }
    let len = payload.len() as u32;
    writer.write_all(&len.to_ne_bytes())?;
    writer.write_all(payload)?;
    writer.flush()
}

pub(crate) fn decode_event(payload: &[u8]) -> Result<HostEvent, serde_json::Error> {
    serde_json::from_slice(payload)
}

pub(crate) fn write_command<W: Write>(writer: &mut W, command: &HostCommand) -> io::Result<()> {
    let payload = serde_json::to_vec(command).map_err(io::Error::other)?;
    write_frame(writer, &payload)
}
