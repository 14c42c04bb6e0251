use super::Config;
use crate::core::images::Aspect;

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides read through `lookup`. Unparseable numbers are ignored
    /// with a warning so a typo never silently zeroes a setting.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_empty(lookup(key));

        if let Some(key) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(key);
        }
        if let Some(key) = get("GOOGLE_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
            self.gemini.api_key = Some(key);
        }
        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(token);
        }
        if let Some(chat) = get("TELEGRAM_TARGET_CHAT_ID") {
            self.telegram.target_chat_id = Some(chat);
        }
        if let Some(env) = get("APP_ENV") {
            self.app.env = env;
        }
        if let Some(tz) = get("TZ") {
            self.app.tz = tz;
        }
        if let Some(format) = get("NANOBANANA_LOG_FORMAT") {
            match format.parse() {
                Ok(format) => self.app.log_format = format,
                Err(_) => tracing::warn!(value = %format, "ignoring invalid NANOBANANA_LOG_FORMAT"),
            }
        }
        if let Some(level) = get("NANOBANANA_LOG_LEVEL") {
            self.app.log_level = level;
        }

        if let Some(aspect) = get("IMAGE_ASPECT") {
            self.generation.image_aspect = Aspect::parse_or_default(&aspect);
        }
        if let Some(format) = get("IMAGE_FORMAT") {
            self.generation.image_format = format;
        }
        if let Some(value) = parsed(&get, "IMAGES_PER_JOB") {
            self.generation.images_per_job = value;
        }
        if let Some(value) = parsed(&get, "RETRY_BACKOFF_MINUTES") {
            self.generation.retry_backoff_minutes = value;
        }
        if let Some(value) = parsed(&get, "MAX_PROMPT_REGENS") {
            self.generation.max_prompt_regens = value;
        }
        if let Some(value) = parsed(&get, "MAX_TOTAL_FAILURE_CYCLES") {
            self.generation.max_total_failure_cycles = value;
        }

        if let Some(port) = parsed(&get, "NANOBANANA_GATEWAY_PORT") {
            self.gateway.port = port;
        }
        if let Some(host) = get("NANOBANANA_GATEWAY_HOST") {
            self.gateway.host = host;
        }
    }
}

fn parsed<T, G>(get: &G, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}
