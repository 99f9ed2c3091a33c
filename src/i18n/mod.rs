//! Translations for labels shown on peripheral settings screens.
//!
//! Messages are simple `key = value` lines in one `.ftl` file per language,
//! compiled into the binary. Lookups fall back to English, then to the key.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Dutch,
    German,
    French,
    Spanish,
}

impl Language {
    /// Get the language identifier string.
    pub fn id(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Dutch => "nl",
            Language::German => "de",
            Language::French => "fr",
            Language::Spanish => "es",
        }
    }

    /// Get the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Dutch => "Nederlands",
            Language::German => "Deutsch",
            Language::French => "Français",
            Language::Spanish => "Español",
        }
    }

    /// Parse from a language identifier such as `de-AT` or `nl`.
    pub fn from_id(id: &str) -> Option<Self> {
        let prefix = id.split(['-', '_']).next().unwrap_or(id).to_lowercase();
        Language::all()
            .iter()
            .copied()
            .find(|lang| lang.id().split('-').next() == Some(prefix.as_str()))
    }

    /// Get all supported languages.
    pub fn all() -> &'static [Language] {
        &[
            Language::English,
            Language::Dutch,
            Language::German,
            Language::French,
            Language::Spanish,
        ]
    }

    fn bundled_ftl(&self) -> &'static str {
        match self {
            Language::English => include_str!("locales/en-US/main.ftl"),
            Language::Dutch => include_str!("locales/nl/main.ftl"),
            Language::German => include_str!("locales/de/main.ftl"),
            Language::French => include_str!("locales/fr/main.ftl"),
            Language::Spanish => include_str!("locales/es/main.ftl"),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Errors that can occur when loading translations.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("No messages in {0}")]
    Empty(String),
}

fn parse_ftl(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

/// Translation service holding every language's messages.
pub struct TranslationService {
    /// Current language
    current_language: Language,
    /// Translations per language (language -> key -> value)
    translations: HashMap<Language, HashMap<String, String>>,
}

impl Default for TranslationService {
    fn default() -> Self {
        Self::new()
    }
}

impl TranslationService {
    /// Create a service with the bundled translations, set to English.
    pub fn new() -> Self {
        let translations = Language::all()
            .iter()
            .map(|lang| (*lang, parse_ftl(lang.bundled_ftl())))
            .collect();

        Self {
            current_language: Language::English,
            translations,
        }
    }

    pub fn language(&self) -> Language {
        self.current_language
    }

    pub fn set_language(&mut self, lang: Language) {
        self.current_language = lang;
    }

    /// Merge messages from an `.ftl` file over the bundled ones for `lang`.
    ///
    /// Returns the number of messages read.
    pub fn load_file(&mut self, lang: Language, path: &Path) -> Result<usize, TranslationError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| TranslationError::IoError(e.to_string()))?;

        let messages = parse_ftl(&content);
        if messages.is_empty() {
            return Err(TranslationError::Empty(path.display().to_string()));
        }

        let count = messages.len();
        self.translations.entry(lang).or_default().extend(messages);
        tracing::debug!("Loaded {} {} messages from {}", count, lang.id(), path.display());
        Ok(count)
    }

    /// Translate a message by key.
    pub fn translate(&self, key: &str) -> String {
        let lookup = |lang: Language| {
            self.translations
                .get(&lang)
                .and_then(|messages| messages.get(key))
                .cloned()
        };

        lookup(self.current_language)
            .or_else(|| lookup(Language::English))
            .unwrap_or_else(|| key.to_string())
    }
}

/// Global translation service.
static TRANSLATIONS: OnceLock<Mutex<TranslationService>> = OnceLock::new();

fn service() -> &'static Mutex<TranslationService> {
    TRANSLATIONS.get_or_init(|| Mutex::new(TranslationService::new()))
}

/// Translate a message by key with the global service.
pub fn t(key: &str) -> String {
    match service().lock() {
        Ok(service) => service.translate(key),
        Err(poisoned) => poisoned.into_inner().translate(key),
    }
}

/// Get the current global language.
pub fn current_language() -> Language {
    match service().lock() {
        Ok(service) => service.language(),
        Err(poisoned) => poisoned.into_inner().language(),
    }
}

/// Set the global language.
pub fn set_language(lang: Language) {
    match service().lock() {
        Ok(mut service) => service.set_language(lang),
        Err(poisoned) => poisoned.into_inner().set_language(lang),
    }
}

/// Detect the system locale and return the best matching language.
pub fn detect_system_locale() -> Language {
    sys_locale::get_locale()
        .and_then(|locale| Language::from_id(&locale))
        .unwrap_or(Language::English)
}

/// Pick the language for a configured value: `auto` follows the system locale.
pub fn resolve_language(configured: &str) -> Language {
    if configured.eq_ignore_ascii_case("auto") {
        return detect_system_locale();
    }
    Language::from_id(configured).unwrap_or_else(|| {
        tracing::warn!("Unknown language '{}', using English", configured);
        Language::English
    })
}
