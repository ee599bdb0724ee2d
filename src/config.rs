/// Credentials for the two AI backends, captured once at startup. A missing
/// or blank variable means that backend is skipped, not that requests fail.
#[derive(Debug, Clone, Default)]
pub struct AiConfig {
    pub openrouter_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl AiConfig {
    pub fn from_env() -> Self {
        Self {
            openrouter_api_key: read_key("OPENROUTER_API_KEY"),
            gemini_api_key: read_key("GEMINI_API_KEY"),
        }
    }
}

fn read_key(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_owned()),
        _ => None,
    }
}
