//! Translation loader and i18n management
//!
//! This module provides the core internationalization functionality including
//! translation loading, language detection, and message formatting.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::I18nConfig;
use crate::utils::errors::{Result, SplitBuddyError};

/// Main internationalization manager
#[derive(Debug, Clone)]
pub struct I18n {
    /// Loaded translations by language code
    translations: HashMap<String, Map<String, Value>>,
    /// Default language code
    default_language: String,
    /// Supported language codes
    supported_languages: Vec<String>,
    /// Directory holding `<lang>.json` files
    directory: PathBuf,
}

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

impl I18n {
    /// Create a new I18n instance
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
            directory: PathBuf::from(&config.directory),
        }
    }

    /// Build from already parsed translation documents, keyed by language
    pub fn from_translations(config: &I18nConfig, translations: HashMap<String, Value>) -> Result<Self> {
        let mut i18n = Self::new(config);
        for (lang_code, document) in translations {
            i18n.insert_document(&lang_code, document)?;
        }
        Ok(i18n)
    }

    /// Load all translation files from the translations directory
    pub async fn load_translations(&mut self) -> Result<()> {
        let translations_dir = self.directory.clone();
        if !translations_dir.exists() {
            return Err(SplitBuddyError::Config(format!(
                "Translations directory not found: {}",
                translations_dir.display()
            )));
        }

        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = translations_dir.join(format!("{}.json", lang_code));

            if file_path.exists() {
                match self.load_language_file(&file_path, lang_code).await {
                    Ok(_) => info!("Loaded translations for language: {}", lang_code),
                    Err(e) => {
                        error!("Failed to load translations for {}: {}", lang_code, e);
                        if lang_code == &self.default_language {
                            return Err(SplitBuddyError::Config(format!(
                                "Failed to load default language translations: {}",
                                e
                            )));
                        }
                    }
                }
            } else {
                warn!("Translation file not found: {}", file_path.display());
                if lang_code == &self.default_language {
                    return Err(SplitBuddyError::Config(format!(
                        "Default language translation file not found: {}",
                        file_path.display()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Load a single language file
    async fn load_language_file(&mut self, file_path: &Path, lang_code: &str) -> Result<()> {
        let content = fs::read_to_string(file_path).await?;
        let document: Value = serde_json::from_str(&content)?;
        self.insert_document(lang_code, document)
    }

    fn insert_document(&mut self, lang_code: &str, document: Value) -> Result<()> {
        let Value::Object(map) = document else {
            return Err(SplitBuddyError::Config(format!(
                "Invalid translation file format for {}",
                lang_code
            )));
        };

        debug!("Loaded {} translation keys for {}", count_keys(&map), lang_code);
        self.translations.insert(lang_code.to_string(), map);
        Ok(())
    }

    /// Get a translated message
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);

        let value = self
            .get_translation_value(key, &effective_lang)
            .or_else(|| self.get_translation_value(key, &self.default_language));

        match value {
            Some(translation) => {
                let text = extract_text_from_value(translation);
                format_message(&text, params)
            }
            None => {
                warn!("Translation key '{}' not found in any language", key);
                key.to_string()
            }
        }
    }

    /// Get a translated message with pluralization support.
    ///
    /// Keys without plural forms are translated as plain keys.
    pub fn tp(&self, key: &str, lang: &str, count: i64, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);
        let plural_key = format!("{}.{}", key, plural_form(count, &effective_lang));

        let mut final_params = params.cloned().unwrap_or_default();
        final_params.insert("count".to_string(), count.to_string());

        if self.has_key(&plural_key, &effective_lang) {
            self.t(&plural_key, &effective_lang, Some(&final_params))
        } else {
            self.t(key, &effective_lang, Some(&final_params))
        }
    }

    /// Check whether `key` resolves in `lang` or the default language
    pub fn has_key(&self, key: &str, lang: &str) -> bool {
        self.get_translation_value(key, lang).is_some()
            || self.get_translation_value(key, &self.default_language).is_some()
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.supported_languages.iter().any(|supported| supported == lang)
    }

    /// Get the effective language (fallback to default if not supported)
    fn get_effective_language(&self, lang: &str) -> String {
        if self.is_language_supported(lang) && self.translations.contains_key(lang) {
            lang.to_string()
        } else {
            self.default_language.clone()
        }
    }

    /// Get translation value from nested JSON structure
    fn get_translation_value(&self, key: &str, lang: &str) -> Option<&Value> {
        let translations = self.translations.get(lang)?;

        // Support nested keys like "dialog.amount_prompt"
        let mut parts = key.split('.');
        let mut current = translations.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }

        Some(current)
    }

    /// Get supported languages
    pub fn supported_languages(&self) -> &[String] {
        &self.supported_languages
    }

    /// Get default language
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Detect user language from the client's language code
    pub fn detect_user_language(&self, client_lang: Option<&str>) -> String {
        if let Some(lang) = client_lang {
            // Extract language code from locale (e.g., "en-US" -> "en")
            let lang_code = lang.split('-').next().unwrap_or(lang);

            if self.is_language_supported(lang_code) {
                return lang_code.to_string();
            }
        }

        self.default_language.clone()
    }

    /// Get translation statistics
    pub fn get_stats(&self) -> TranslationStats {
        let mut stats = TranslationStats {
            languages: Vec::new(),
            total_keys: 0,
        };

        for (lang, translations) in &self.translations {
            let key_count = count_keys(translations);
            stats.languages.push(LanguageStats {
                code: lang.clone(),
                key_count,
            });
            if lang == &self.default_language {
                stats.total_keys = key_count;
            }
        }

        stats
    }
}

/// Extract text from JSON value (handle both strings and objects with pluralization)
fn extract_text_from_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(obj) => {
            // For pluralization objects, default to "other" or first available key
            if let Some(other) = obj.get("other") {
                extract_text_from_value(other)
            } else if let Some((_, first_value)) = obj.iter().next() {
                extract_text_from_value(first_value)
            } else {
                String::new()
            }
        }
        _ => value.to_string(),
    }
}

/// Format message with parameters
fn format_message(template: &str, params: Option<&TranslationParams>) -> String {
    match params {
        Some(params) => params.iter().fold(template.to_string(), |result, (key, value)| {
            result.replace(&format!("{{{}}}", key), value)
        }),
        None => template.to_string(),
    }
}

/// Determine plural form based on language-specific rules
fn plural_form(count: i64, lang: &str) -> &'static str {
    match lang {
        "ru" => {
            // Russian: one, few, many
            let abs_count = count.abs();
            let last_digit = abs_count % 10;
            let last_two_digits = abs_count % 100;

            if last_digit == 1 && last_two_digits != 11 {
                "one"
            } else if (2..=4).contains(&last_digit) && !(12..=14).contains(&last_two_digits) {
                "few"
            } else {
                "many"
            }
        }
        // English rules for everything else
        _ => {
            if count == 1 { "one" } else { "other" }
        }
    }
}

/// Recursively count translation keys
fn count_keys(obj: &Map<String, Value>) -> usize {
    obj.values()
        .map(|value| match value {
            Value::Object(nested) => count_keys(nested),
            _ => 1,
        })
        .sum()
}

/// Translation statistics
#[derive(Debug, Clone)]
pub struct TranslationStats {
    pub languages: Vec<LanguageStats>,
    pub total_keys: usize,
}

/// Language-specific statistics
#[derive(Debug, Clone)]
pub struct LanguageStats {
    pub code: String,
    pub key_count: usize,
}
