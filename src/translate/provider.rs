use std::{convert::Infallible, fmt, str::FromStr};

/// AI providers speaking the OpenAI chat-completions protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    OpenAi,
    OpenRouter,
    Groq,
    Mistral,
    DeepSeek,
    Ollama,
    /// Any other OpenAI-compatible endpoint, given by its base URL.
    Custom(String),
}

impl Provider {
    /// Base URL the `/chat/completions` path is appended to.
    pub fn base_url(&self) -> &str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Mistral => "https://api.mistral.ai/v1",
            Provider::DeepSeek => "https://api.deepseek.com/v1",
            Provider::Ollama => "http://localhost:11434/v1",
            Provider::Custom(url) => url.trim_end_matches('/'),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Provider::OpenAi => "openai",
            Provider::OpenRouter => "openrouter",
            Provider::Groq => "groq",
            Provider::Mistral => "mistral",
            Provider::DeepSeek => "deepseek",
            Provider::Ollama => "ollama",
            Provider::Custom(url) => url,
        }
    }
}

impl FromStr for Provider {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Provider::OpenAi,
            "openrouter" => Provider::OpenRouter,
            "groq" => Provider::Groq,
            "mistral" => Provider::Mistral,
            "deepseek" => Provider::DeepSeek,
            "ollama" => Provider::Ollama,
            _ => Provider::Custom(s.trim().to_string()),
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
