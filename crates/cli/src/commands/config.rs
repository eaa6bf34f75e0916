use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use concierge_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key_path, value, env_key) in effective_values(&config) {
        let source =
            field_source(key_path, env_key, config_file_doc.as_ref(), config_file_path.as_deref());
        lines.push(format!("- {key_path} = {value} (source: {source})"));
    }

    lines.join("\n")
}

/// Key path, rendered value, and environment override of every reported setting.
fn effective_values(config: &AppConfig) -> Vec<(&'static str, String, &'static str)> {
    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    let origins = if config.server.cors_allowed_origins.is_empty() {
        "<none>".to_string()
    } else {
        config.server.cors_allowed_origins.join(",")
    };

    vec![
        ("database.url", config.database.url.clone(), "CONCIERGE_DATABASE_URL"),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            "CONCIERGE_DATABASE_MAX_CONNECTIONS",
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "CONCIERGE_DATABASE_TIMEOUT_SECS",
        ),
        ("llm.provider", format!("{:?}", config.llm.provider), "CONCIERGE_LLM_PROVIDER"),
        ("llm.model", config.llm.model.clone(), "CONCIERGE_LLM_MODEL"),
        (
            "llm.base_url",
            config.llm.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            "CONCIERGE_LLM_BASE_URL",
        ),
        ("llm.api_key", llm_api_key.to_string(), "CONCIERGE_LLM_API_KEY"),
        ("server.bind_address", config.server.bind_address.clone(), "CONCIERGE_SERVER_BIND_ADDRESS"),
        ("server.port", config.server.port.to_string(), "CONCIERGE_SERVER_PORT"),
        ("server.cors_allowed_origins", origins, "CONCIERGE_SERVER_CORS_ALLOWED_ORIGINS"),
        ("logging.level", config.logging.level.clone(), "CONCIERGE_LOGGING_LEVEL"),
        ("logging.format", format!("{:?}", config.logging.format), "CONCIERGE_LOGGING_FORMAT"),
        (
            "guardrails.enforce",
            config.guardrails.enforce.to_string(),
            "CONCIERGE_GUARDRAILS_ENFORCE",
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("concierge.toml"), PathBuf::from("config/concierge.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: &str,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if env::var_os(env_key).is_some() {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

#[cfg(test)]
mod tests {
    use concierge_core::config::AppConfig;
    use toml::Value;

    use super::{contains_path, effective_values};

    #[test]
    fn api_key_is_never_printed() {
        let mut config = AppConfig::default();
        config.llm.api_key = Some("sk-live-secret".to_string().into());

        let rendered = effective_values(&config)
            .into_iter()
            .map(|(key, value, _)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n");

        assert!(rendered.contains("llm.api_key=<redacted>"));
        assert!(!rendered.contains("sk-live-secret"));
    }

    #[test]
    fn nested_keys_are_found_in_the_file() {
        let doc = "[server]\nport = 9000\n".parse::<Value>().expect("toml");

        assert!(contains_path(&doc, "server.port"));
        assert!(!contains_path(&doc, "server.bind_address"));
    }
}
