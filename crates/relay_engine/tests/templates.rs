use std::fs;

use relay_core::TemplateKey;
use relay_engine::PromptLibrary;
use tempfile::TempDir;

fn write(dir: &TempDir, key: TemplateKey, text: &str) {
    let path = dir.path().join(key.relative_path());
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

#[test]
fn lists_known_templates() {
    assert_eq!(PromptLibrary::list(), vec!["summarize", "format"]);
}

#[test]
fn loads_and_trims_template() {
    let dir = TempDir::new().unwrap();
    write(&dir, TemplateKey::Format, "  Format as a table.\n");
    let library = PromptLibrary::new(Some(dir.path().to_path_buf()));
    assert_eq!(library.get(TemplateKey::Format), "Format as a table.");
}

#[test]
fn loaded_template_is_cached() {
    let dir = TempDir::new().unwrap();
    write(&dir, TemplateKey::Summarize, "v1");
    let library = PromptLibrary::new(Some(dir.path().to_path_buf()));
    assert_eq!(library.get(TemplateKey::Summarize), "v1");

    write(&dir, TemplateKey::Summarize, "v2");
    assert_eq!(library.get(TemplateKey::Summarize), "v1");
}

#[test]
fn missing_template_is_empty_and_retried() {
    let dir = TempDir::new().unwrap();
    let library = PromptLibrary::new(Some(dir.path().to_path_buf()));
    assert_eq!(library.get(TemplateKey::Summarize), "");

    write(&dir, TemplateKey::Summarize, "now present");
    assert_eq!(library.get(TemplateKey::Summarize), "now present");
}

#[test]
fn unknown_name_is_empty() {
    let library = PromptLibrary::new(None);
    assert_eq!(library.get_by_name("translate"), "");
}
