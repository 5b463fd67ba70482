use abstractor_core::config_file::GenerationSection;

pub const DEFAULT_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 1200;

/// Resolved settings for the generation step.
#[derive(Clone, PartialEq)]
pub struct GenerationConfig {
    /// Access credential; `None` means every document gets the empty payload.
    pub api_key: Option<String>,
    pub model: String,
    /// Sampling temperature, only sent when explicitly set to a non-default value.
    pub temperature: Option<f64>,
    /// Optional project scoping for project-bound keys.
    pub project: Option<String>,
    pub base_url: String,
    pub max_completion_tokens: Option<u32>,
    /// Offline override: never call the backend.
    pub force_mock: bool,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("project", &self.project)
            .field("base_url", &self.base_url)
            .field("max_completion_tokens", &self.max_completion_tokens)
            .field("force_mock", &self.force_mock)
            .finish()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            project: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_completion_tokens: Some(DEFAULT_MAX_COMPLETION_TOKENS),
            force_mock: false,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a `TEMPERATURE` value. Empty, `1` and `1.0` mean "use the model
/// default" and yield `None`, as does anything unparseable.
pub fn parse_temperature(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if matches!(raw, "" | "1" | "1.0") {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(t) => Some(t),
        Err(_) => {
            tracing::warn!(value = raw, "ignoring unparseable TEMPERATURE");
            None
        }
    }
}

impl GenerationConfig {
    /// Resolve configuration: env vars > config file > defaults.
    ///
    /// `env` looks up a variable by name; pass `|k| std::env::var(k).ok()`
    /// for the process environment. Recognized variables: `OPENAI_API_KEY`,
    /// `OPENAI_MODEL`, `TEMPERATURE`, `OPENAI_PROJECT`, `OPENAI_BASE_URL`,
    /// `FORCE_MOCK` (`1` enables the offline override).
    pub fn resolve(
        file: Option<&GenerationSection>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let defaults = Self::default();

        let temperature = match env("TEMPERATURE") {
            Some(raw) => parse_temperature(&raw),
            None => file
                .and_then(|f| f.temperature)
                .filter(|t| (*t - 1.0).abs() > f64::EPSILON),
        };

        let force_mock = env("FORCE_MOCK").is_some_and(|v| v.trim() == "1")
            || file.and_then(|f| f.force_mock).unwrap_or(false);

        Self {
            api_key: non_empty(env("OPENAI_API_KEY")),
            model: non_empty(env("OPENAI_MODEL"))
                .or_else(|| non_empty(file.and_then(|f| f.model.clone())))
                .unwrap_or(defaults.model),
            temperature,
            project: non_empty(env("OPENAI_PROJECT"))
                .or_else(|| non_empty(file.and_then(|f| f.project.clone()))),
            base_url: non_empty(env("OPENAI_BASE_URL"))
                .or_else(|| non_empty(file.and_then(|f| f.base_url.clone())))
                .unwrap_or(defaults.base_url),
            max_completion_tokens: file
                .and_then(|f| f.max_completion_tokens)
                .or(defaults.max_completion_tokens),
            force_mock,
        }
    }

    /// [`resolve`](Self::resolve) against the process environment.
    pub fn from_env(file: Option<&GenerationSection>) -> Self {
        Self::resolve(file, |k| std::env::var(k).ok())
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }
}
