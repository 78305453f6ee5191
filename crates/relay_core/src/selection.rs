use serde::{Deserialize, Serialize};

use crate::RelayError;

/// User-highlighted text, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(String);

impl Selection {
    /// Trims `raw`; whitespace-only input becomes `EmptyInput`.
    pub fn parse(raw: &str, menu_title: &str) -> Result<Self, RelayError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RelayError::EmptyInput {
                menu_title: menu_title.to_string(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Best-effort description of the page the selection came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMetadata {
    pub url: Option<String>,
    pub title: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
}

impl PageMetadata {
    /// Fallback when the page itself could not be inspected: tab-level fields only.
    pub fn from_tab(url: Option<String>, title: Option<String>) -> Self {
        Self {
            url,
            title,
            ..Self::default()
        }
    }

    /// Labelled fields in their fixed order, skipping absent or blank values.
    pub fn present_fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("URL", &self.url),
            ("Title", &self.title),
            ("Language", &self.language),
            ("Description", &self.description),
            ("OG title", &self.og_title),
            ("OG description", &self.og_description),
            ("Referrer", &self.referrer),
            ("User agent", &self.user_agent),
        ]
        .into_iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (label, v))
        })
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }
}

/// Identifies the sending extension in the prompt footer and proxy payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub name: String,
    pub version: String,
}

impl SourceInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_selection_is_rejected() {
        let err = Selection::parse(" \n\t ", "Send it").unwrap_err();
        assert_eq!(
            err,
            RelayError::EmptyInput {
                menu_title: "Send it".into()
            }
        );
    }

    #[test]
    fn selection_is_trimmed() {
        let selection = Selection::parse("  hello world \n", "Send it").unwrap();
        assert_eq!(selection.as_str(), "hello world");
    }

    #[test]
    fn present_fields_keep_fixed_order_and_skip_blanks() {
        let meta = PageMetadata {
            user_agent: Some("agent".into()),
            url: Some("https://a.test".into()),
            title: Some("   ".into()),
            og_title: Some("OG".into()),
            ..PageMetadata::default()
        };
        assert_eq!(
            meta.present_fields(),
            vec![
                ("URL", "https://a.test"),
                ("OG title", "OG"),
                ("User agent", "agent")
            ]
        );
    }

    #[test]
    fn tab_fallback_only_sets_tab_fields() {
        let meta = PageMetadata::from_tab(Some("https://a.test".into()), None);
        assert_eq!(meta.present_fields(), vec![("URL", "https://a.test")]);
        assert!(PageMetadata::default().is_empty());
    }
}
