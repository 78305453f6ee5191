use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use relay_core::TemplateKey;
use relay_logging::{relay_debug, relay_warn};

/// Prompt templates read from `{root}/prompts/*.txt`, loaded once per key.
///
/// Unreadable files yield an empty template and are retried on the next
/// request; successful loads are cached for the life of the library.
pub struct PromptLibrary {
    root: Option<PathBuf>,
    cache: Mutex<HashMap<TemplateKey, String>>,
}

impl PromptLibrary {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn list() -> Vec<&'static str> {
        TemplateKey::ALL.iter().map(|key| key.as_str()).collect()
    }

    /// Template text by name; unknown names warn and give an empty template.
    pub fn get_by_name(&self, name: &str) -> String {
        match TemplateKey::parse(name) {
            Some(key) => self.get(key),
            None => {
                relay_warn!("Requested unknown prompt template \"{name}\".");
                String::new()
            }
        }
    }

    /// Blocking: the first request for a key reads the file. The cache lock
    /// is not held while reading.
    pub fn get(&self, key: TemplateKey) -> String {
        if let Some(template) = self.cached(key) {
            return template;
        }
        match self.load(key) {
            Some(template) => {
                self.cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(key)
                    .or_insert(template)
                    .clone()
            }
            None => String::new(),
        }
    }

    fn cached(&self, key: TemplateKey) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned()
    }

    fn load(&self, key: TemplateKey) -> Option<String> {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let path = root.join(key.relative_path());
        match fs::read_to_string(&path) {
            Ok(text) => {
                relay_debug!("Loaded prompt template {:?} from {:?}", key, path);
                Some(text.trim().to_string())
            }
            Err(err) => {
                relay_warn!("Unable to read prompt template {:?}: {}", path, err);
                None
            }
        }
    }
}
