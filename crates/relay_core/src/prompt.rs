use crate::{PageMetadata, Selection, SourceInfo};

pub const SNIPPET_LABEL: &str = "Conversation snippet:";
pub const METADATA_LABEL: &str = "Page details:";

/// Assemble the prompt text. Sections are separated by one blank line:
/// template, labelled selection, page details, source footer.
///
/// Absent or blank templates and metadata are skipped. Nothing is escaped.
pub fn build_prompt(
    selection: &Selection,
    template: Option<&str>,
    metadata: Option<&PageMetadata>,
    source: &SourceInfo,
) -> String {
    let mut sections = Vec::with_capacity(4);

    if let Some(template) = template.map(str::trim).filter(|t| !t.is_empty()) {
        sections.push(template.to_string());
    }

    sections.push(format!("{SNIPPET_LABEL}\n{}", selection.as_str()));

    if let Some(fields) = metadata
        .map(PageMetadata::present_fields)
        .filter(|fields| !fields.is_empty())
    {
        let mut block = String::from(METADATA_LABEL);
        for (label, value) in fields {
            block.push_str(&format!("\n- {label}: {value}"));
        }
        sections.push(block);
    }

    sections.push(source_line(source));
    sections.join("\n\n")
}

pub fn source_line(source: &SourceInfo) -> String {
    format!("Source extension: {} v{}", source.name, source.version)
}
