use serde::Deserialize;

fn default_ai_provider() -> String {
    "huggingface".into()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com".into()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".into()
}

fn default_huggingface_api_base() -> String {
    "https://router.huggingface.co".into()
}

fn default_huggingface_model() -> String {
    "Qwen/Qwen2.5-7B-Instruct".into()
}

fn default_history_limit() -> usize {
    20
}

/// Runtime settings, read from the process environment.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_ai_provider")]
    pub ai_provider: String,
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default = "default_openai_api_base")]
    pub openai_api_base: String,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default)]
    pub huggingface_api_key: String,
    #[serde(default = "default_huggingface_api_base")]
    pub huggingface_api_base: String,
    #[serde(default = "default_huggingface_model")]
    pub huggingface_model: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default())
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ai_provider: default_ai_provider(),
            openai_api_key: String::new(),
            openai_api_base: default_openai_api_base(),
            openai_model: default_openai_model(),
            huggingface_api_key: String::new(),
            huggingface_api_base: default_huggingface_api_base(),
            huggingface_model: default_huggingface_model(),
            history_limit: default_history_limit(),
        }
    }
}
