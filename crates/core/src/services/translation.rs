//! Translation service for report descriptions.
//!
//! One prompt per request: the model is asked to return a JSON object
//! mapping each requested language code to the translated text. The
//! whole response is cached in memory for a while since reports are
//! immutable once submitted.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use validator::Validate;

use pulso_common::config::TranslationSettings;
use pulso_common::{AppError, AppResult};

/// Supported translation providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationProvider {
    /// `OpenAI` API (or any chat-completions compatible endpoint)
    OpenAI,
    /// Local LLM via Ollama
    Ollama,
}

impl TranslationProvider {
    /// Parse a provider from its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAI),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }
}

/// Configuration for translation service.
#[derive(Debug, Clone)]
pub struct TranslationConfig {
    /// Active provider
    pub provider: TranslationProvider,
    /// API key for hosted providers
    pub api_key: Option<String>,
    /// Model identifier
    pub model: Option<String>,
    /// Base URL override (chat-completions root or Ollama root)
    pub base_url: Option<String>,
    /// Enable caching
    pub cache_enabled: bool,
    /// Cache TTL in seconds
    pub cache_ttl_seconds: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::OpenAI,
            api_key: None,
            model: Some("gpt-4o-mini".to_string()),
            base_url: None,
            cache_enabled: true,
            cache_ttl_seconds: 3600,
        }
    }
}

impl TranslationConfig {
    /// Build from the file/environment settings section.
    pub fn from_settings(settings: &TranslationSettings) -> AppResult<Self> {
        let provider = TranslationProvider::from_name(&settings.provider).ok_or_else(|| {
            AppError::Config(format!(
                "unknown translation provider: {}",
                settings.provider
            ))
        })?;

        Ok(Self {
            provider,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            cache_enabled: true,
            cache_ttl_seconds: settings.cache_ttl_seconds,
        })
    }
}

/// Translation request input.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TranslateInput {
    /// Text to translate
    #[validate(length(min = 1, max = 2000, message = "must be between 1 and 2000 characters"))]
    pub text: String,
    /// Target language codes (e.g., "es", "fr")
    #[validate(length(min = 1, max = 6, message = "between 1 and 6 languages per request"))]
    pub target_languages: Vec<String>,
}

/// Translation response: language code to translated text.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationsResponse {
    pub translations: HashMap<String, String>,
}

/// Supported language info.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedLanguage {
    /// Language code
    pub code: &'static str,
    /// Language name
    pub name: &'static str,
    /// Native name
    pub native_name: &'static str,
}

/// Languages the translation endpoint accepts.
pub const SUPPORTED_LANGUAGES: &[SupportedLanguage] = &[
    SupportedLanguage {
        code: "es",
        name: "Spanish",
        native_name: "Español",
    },
    SupportedLanguage {
        code: "fr",
        name: "French",
        native_name: "Français",
    },
    SupportedLanguage {
        code: "de",
        name: "German",
        native_name: "Deutsch",
    },
    SupportedLanguage {
        code: "ja",
        name: "Japanese",
        native_name: "日本語",
    },
    SupportedLanguage {
        code: "pt",
        name: "Portuguese",
        native_name: "Português",
    },
    SupportedLanguage {
        code: "en",
        name: "English",
        native_name: "English",
    },
];

/// Cache entry for translations.
#[derive(Debug, Clone)]
struct CacheEntry {
    response: TranslationsResponse,
    expires_at: std::time::Instant,
}

/// Translation service.
#[derive(Clone)]
pub struct TranslationService {
    config: TranslationConfig,
    http_client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl TranslationService {
    /// Create a new translation service.
    #[must_use]
    pub fn new(config: TranslationConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get supported languages.
    #[must_use]
    pub fn supported_languages() -> Vec<SupportedLanguage> {
        SUPPORTED_LANGUAGES.to_vec()
    }

    /// Get active provider.
    #[must_use]
    pub const fn active_provider(&self) -> TranslationProvider {
        self.config.provider
    }

    /// Translate text into every requested language.
    pub async fn translate(&self, input: TranslateInput) -> AppResult<TranslationsResponse> {
        input.validate()?;

        let languages = Self::normalize_languages(&input.target_languages)?;
        let cache_key = Self::cache_key(&input.text, &languages);

        // Check cache first
        if let Some(cached) = self.check_cache(&cache_key).await {
            return Ok(cached);
        }

        let content = match self.config.provider {
            TranslationProvider::OpenAI => self.request_openai(&input.text, &languages).await?,
            TranslationProvider::Ollama => self.request_ollama(&input.text, &languages).await?,
        };

        let response = Self::parse_translations(&content, &languages)?;

        // Store in cache
        self.store_cache(cache_key, response.clone()).await;

        Ok(response)
    }

    /// Lowercase, deduplicate and verify each requested language.
    fn normalize_languages(requested: &[String]) -> AppResult<Vec<String>> {
        let mut languages = Vec::new();
        for code in requested {
            let code = code.to_lowercase();
            if !SUPPORTED_LANGUAGES.iter().any(|l| l.code == code) {
                return Err(AppError::BadRequest(format!(
                    "Unsupported language: {code}"
                )));
            }
            if !languages.contains(&code) {
                languages.push(code);
            }
        }
        Ok(languages)
    }

    /// Create a cache key from request parameters.
    fn cache_key(text: &str, languages: &[String]) -> String {
        let mut sorted = languages.to_vec();
        sorted.sort();
        format!("{}:{}", sorted.join(","), text)
    }

    /// Check cache for a translation.
    async fn check_cache(&self, key: &str) -> Option<TranslationsResponse> {
        if !self.config.cache_enabled {
            return None;
        }

        let cache = self.cache.read().await;
        if let Some(entry) = cache.get(key) {
            if entry.expires_at > std::time::Instant::now() {
                return Some(entry.response.clone());
            }
        }
        None
    }

    /// Store a translation in the cache.
    async fn store_cache(&self, key: String, response: TranslationsResponse) {
        if !self.config.cache_enabled {
            return;
        }

        let entry = CacheEntry {
            response,
            expires_at: std::time::Instant::now()
                + std::time::Duration::from_secs(self.config.cache_ttl_seconds),
        };

        let mut cache = self.cache.write().await;
        cache.insert(key, entry);

        // Clean up expired entries occasionally
        if cache.len() > 1000 {
            let now = std::time::Instant::now();
            cache.retain(|_, v| v.expires_at > now);
        }
    }

    fn build_prompt(text: &str, languages: &[String]) -> String {
        let targets = languages
            .iter()
            .map(|code| format!("\"{code}\" ({})", Self::language_code_to_name(code)))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Translate the following text into each of these languages: {targets}. \
             Respond with only a JSON object mapping each language code to the \
             translated text, with no explanation and no code fences.\n\n{text}"
        )
    }

    async fn request_openai(&self, text: &str, languages: &[String]) -> AppResult<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| AppError::BadRequest("OpenAI API key not configured".to_string()))?;

        let model = self.config.model.as_deref().unwrap_or("gpt-4o-mini");
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1");

        let body = serde_json::json!({
            "model": model,
            "messages": [
                {"role": "user", "content": Self::build_prompt(text, languages)}
            ],
            "temperature": 0.3,
        });

        let response = self
            .http_client
            .post(format!("{base_url}/chat/completions"))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("OpenAI request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "OpenAI API error: {status} - {body}"
            )));
        }

        #[derive(Deserialize)]
        struct OpenAiResponse {
            choices: Vec<OpenAiChoice>,
        }

        #[derive(Deserialize)]
        struct OpenAiChoice {
            message: OpenAiMessage,
        }

        #[derive(Deserialize)]
        struct OpenAiMessage {
            content: String,
        }

        let parsed: OpenAiResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse OpenAI response: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ExternalService("No translation returned".to_string()))?
            .message
            .content;

        Ok(content)
    }

    async fn request_ollama(&self, text: &str, languages: &[String]) -> AppResult<String> {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("http://localhost:11434");
        let model = self.config.model.as_deref().unwrap_or("llama3.2");

        let body = serde_json::json!({
            "model": model,
            "prompt": Self::build_prompt(text, languages),
            "stream": false,
            "format": "json",
        });

        let response = self
            .http_client
            .post(format!("{base_url}/api/generate"))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Ollama API error: {status} - {body}"
            )));
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            response: String,
        }

        let parsed: OllamaResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse Ollama response: {e}"))
        })?;

        Ok(parsed.response)
    }

    /// Parse the model's JSON object and verify every requested
    /// language came back.
    fn parse_translations(
        content: &str,
        languages: &[String],
    ) -> AppResult<TranslationsResponse> {
        let cleaned = Self::strip_code_fences(content);

        let translations: HashMap<String, String> =
            serde_json::from_str(&cleaned).map_err(|e| {
                AppError::ExternalService(format!("Translation response was not valid JSON: {e}"))
            })?;

        for code in languages {
            if !translations.contains_key(code) {
                return Err(AppError::ExternalService(format!(
                    "Translation response missing language: {code}"
                )));
            }
        }

        Ok(TranslationsResponse { translations })
    }

    /// Models wrap JSON in markdown fences often enough to handle it.
    fn strip_code_fences(content: &str) -> String {
        let trimmed = content.trim();
        if let Some(inner) = trimmed.strip_prefix("```") {
            let inner = inner.strip_prefix("json").unwrap_or(inner);
            let inner = inner.strip_suffix("```").unwrap_or(inner);
            return inner.trim().to_string();
        }
        trimmed.to_string()
    }

    fn language_code_to_name(code: &str) -> &'static str {
        SUPPORTED_LANGUAGES
            .iter()
            .find(|l| l.code == code)
            .map_or("the target language", |l| l.name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_order_independent() {
        let a = TranslationService::cache_key(
            "hello",
            &["fr".to_string(), "es".to_string()],
        );
        let b = TranslationService::cache_key(
            "hello",
            &["es".to_string(), "fr".to_string()],
        );
        assert_eq!(a, b);
        assert_eq!(a, "es,fr:hello");
    }

    #[test]
    fn test_normalize_languages_rejects_unknown() {
        let err =
            TranslationService::normalize_languages(&["es".to_string(), "xx".to_string()])
                .unwrap_err();
        assert_eq!(err.error_code(), "BAD_REQUEST");
    }

    #[test]
    fn test_normalize_languages_deduplicates() {
        let languages = TranslationService::normalize_languages(&[
            "ES".to_string(),
            "es".to_string(),
            "fr".to_string(),
        ])
        .unwrap();
        assert_eq!(languages, vec!["es".to_string(), "fr".to_string()]);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(
            TranslationService::strip_code_fences("{\"es\": \"hola\"}"),
            "{\"es\": \"hola\"}"
        );
        assert_eq!(
            TranslationService::strip_code_fences("```json\n{\"es\": \"hola\"}\n```"),
            "{\"es\": \"hola\"}"
        );
        assert_eq!(
            TranslationService::strip_code_fences("```\n{\"es\": \"hola\"}\n```"),
            "{\"es\": \"hola\"}"
        );
    }

    #[test]
    fn test_parse_translations_requires_every_language() {
        let languages = vec!["es".to_string(), "fr".to_string()];

        let ok = TranslationService::parse_translations(
            "{\"es\": \"hola\", \"fr\": \"bonjour\"}",
            &languages,
        )
        .unwrap();
        assert_eq!(ok.translations["es"], "hola");

        let err =
            TranslationService::parse_translations("{\"es\": \"hola\"}", &languages).unwrap_err();
        assert_eq!(err.error_code(), "EXTERNAL_SERVICE_ERROR");
    }

    #[test]
    fn test_provider_from_name() {
        assert_eq!(
            TranslationProvider::from_name("openai"),
            Some(TranslationProvider::OpenAI)
        );
        assert_eq!(
            TranslationProvider::from_name("Ollama"),
            Some(TranslationProvider::Ollama)
        );
        assert_eq!(TranslationProvider::from_name("deepl"), None);
    }

    #[test]
    fn test_supported_languages_match_the_picker() {
        let codes: Vec<_> = TranslationService::supported_languages()
            .iter()
            .map(|l| l.code)
            .collect();
        assert_eq!(codes, vec!["es", "fr", "de", "ja", "pt", "en"]);
    }

    #[tokio::test]
    async fn test_translate_rejects_empty_text() {
        let service = TranslationService::new(TranslationConfig::default());

        let err = service
            .translate(TranslateInput {
                text: String::new(),
                target_languages: vec!["es".to_string()],
            })
            .await
            .unwrap_err();

        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
