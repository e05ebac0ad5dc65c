use std::time::Duration;

use tracing::warn;

pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:4000/v1/chat/completions";
pub const DEFAULT_API_KEY: &str = "replace-with-your-litellm-api-key";
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_TRACE_SECRET: &str = "replace-with-langfuse-secret";
pub const DEFAULT_TRACE_PUBLIC: &str = "replace-with-langfuse-public";
pub const DEFAULT_TRACE_HOST: &str = "http://localhost:3000";

/// Credentials and endpoint of the Langfuse trace backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceConfig {
    secret_key: String,
    public_key: String,
    host: String,
    enabled: bool,
}

impl TraceConfig {
    pub fn new(
        secret_key: impl Into<String>,
        public_key: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            secret_key: secret_key.into(),
            public_key: public_key.into(),
            host: host.into(),
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_SECRET, DEFAULT_TRACE_PUBLIC, DEFAULT_TRACE_HOST)
    }
}

/// Process-wide settings, read once at startup and passed by reference to
/// every component that needs them.
///
/// | Variable               | Default                                       |
/// |------------------------|-----------------------------------------------|
/// | `LITELLM_API_URL`      | `http://localhost:4000/v1/chat/completions`   |
/// | `LITELLM_API_KEY`      | placeholder                                   |
/// | `LITELLM_MODEL`        | `gpt-4.1-mini`                                |
/// | `LITELLM_TIMEOUT_SECS` | unset (no timeout)                            |
/// | `LITELLM_VERIFY_TLS`   | `false`                                       |
/// | `LANGFUSE_SECRET_KEY`  | placeholder                                   |
/// | `LANGFUSE_PUBLIC_KEY`  | placeholder                                   |
/// | `LANGFUSE_HOST`        | `http://localhost:3000`                       |
/// | `LANGFUSE_ENABLED`     | `true`                                        |
///
/// Nothing is validated here. A bad URL or a placeholder key shows up later as
/// a transport or authorization failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    gateway_url: String,
    api_key: String,
    model_name: String,
    request_timeout: Option<Duration>,
    verify_tls: bool,
    trace: TraceConfig,
}

impl ChatConfig {
    pub fn new(
        gateway_url: impl Into<String>,
        api_key: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            api_key: api_key.into(),
            model_name: model_name.into(),
            request_timeout: None,
            verify_tls: false,
            trace: TraceConfig::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source. Missing keys
    /// take their built-in default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let request_timeout = lookup("LITELLM_TIMEOUT_SECS").and_then(|raw| {
            match raw.trim().parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    warn!("Ignoring LITELLM_TIMEOUT_SECS={raw:?}: not a whole number of seconds");
                    None
                }
            }
        });
        let verify_tls = lookup("LITELLM_VERIFY_TLS")
            .map(|raw| parse_flag("LITELLM_VERIFY_TLS", &raw, false))
            .unwrap_or(false);
        let trace_enabled = lookup("LANGFUSE_ENABLED")
            .map(|raw| parse_flag("LANGFUSE_ENABLED", &raw, true))
            .unwrap_or(true);

        let trace = TraceConfig::new(
            get("LANGFUSE_SECRET_KEY", DEFAULT_TRACE_SECRET),
            get("LANGFUSE_PUBLIC_KEY", DEFAULT_TRACE_PUBLIC),
            get("LANGFUSE_HOST", DEFAULT_TRACE_HOST),
        )
        .with_enabled(trace_enabled);

        Self {
            gateway_url: get("LITELLM_API_URL", DEFAULT_GATEWAY_URL),
            api_key: get("LITELLM_API_KEY", DEFAULT_API_KEY),
            model_name: get("LITELLM_MODEL", DEFAULT_MODEL),
            request_timeout,
            verify_tls,
            trace,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_trace(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }

    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// `None` means the gateway call may block indefinitely.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Certificate verification is off unless explicitly enabled.
    pub fn verify_tls(&self) -> bool {
        self.verify_tls
    }

    pub fn trace(&self) -> &TraceConfig {
        &self.trace
    }

    /// Names of the credentials still holding their placeholder default.
    pub fn placeholder_secrets(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.api_key == DEFAULT_API_KEY {
            names.push("LITELLM_API_KEY");
        }
        if self.trace.is_enabled() {
            if self.trace.secret_key == DEFAULT_TRACE_SECRET {
                names.push("LANGFUSE_SECRET_KEY");
            }
            if self.trace.public_key == DEFAULT_TRACE_PUBLIC {
                names.push("LANGFUSE_PUBLIC_KEY");
            }
        }
        names
    }

    pub fn has_placeholder_secrets(&self) -> bool {
        !self.placeholder_secrets().is_empty()
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_URL, DEFAULT_API_KEY, DEFAULT_MODEL)
    }
}

fn parse_flag(name: &str, raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!("Ignoring {name}={raw:?}: expected true/false");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ChatConfig::from_lookup(|_| None);

        assert_eq!(config.gateway_url(), DEFAULT_GATEWAY_URL);
        assert_eq!(config.api_key(), DEFAULT_API_KEY);
        assert_eq!(config.model_name(), "gpt-4.1-mini");
        assert_eq!(config.trace().host(), "http://localhost:3000");
        assert_eq!(config.request_timeout(), None);
        assert!(!config.verify_tls());
        assert!(config.trace().is_enabled());
        assert_eq!(config, ChatConfig::default());
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("LITELLM_API_URL", "https://gw.example/v1/chat/completions"),
            ("LITELLM_API_KEY", "sk-123"),
            ("LITELLM_MODEL", "gpt-4o"),
            ("LANGFUSE_SECRET_KEY", "sk-lf"),
            ("LANGFUSE_PUBLIC_KEY", "pk-lf"),
            ("LANGFUSE_HOST", "https://cloud.langfuse.com"),
            ("LITELLM_TIMEOUT_SECS", "30"),
            ("LITELLM_VERIFY_TLS", "true"),
        ]));

        assert_eq!(config.gateway_url(), "https://gw.example/v1/chat/completions");
        assert_eq!(config.api_key(), "sk-123");
        assert_eq!(config.model_name(), "gpt-4o");
        assert_eq!(config.trace().secret_key(), "sk-lf");
        assert_eq!(config.trace().public_key(), "pk-lf");
        assert_eq!(config.trace().host(), "https://cloud.langfuse.com");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert!(config.verify_tls());
        assert!(!config.has_placeholder_secrets());
    }

    #[test]
    fn test_malformed_values_pass_through_or_fall_back() {
        let config = ChatConfig::from_lookup(lookup_from(&[
            ("LITELLM_API_URL", "not a url"),
            ("LITELLM_API_KEY", ""),
            ("LITELLM_TIMEOUT_SECS", "soon"),
            ("LANGFUSE_ENABLED", "maybe"),
        ]));

        assert_eq!(config.gateway_url(), "not a url");
        assert_eq!(config.api_key(), "");
        assert_eq!(config.request_timeout(), None);
        assert!(config.trace().is_enabled());
    }

    #[test]
    fn test_placeholder_secrets_are_reported() {
        let config = ChatConfig::default();
        assert_eq!(
            config.placeholder_secrets(),
            vec!["LITELLM_API_KEY", "LANGFUSE_SECRET_KEY", "LANGFUSE_PUBLIC_KEY"]
        );

        let untraced = ChatConfig::from_lookup(lookup_from(&[
            ("LITELLM_API_KEY", "sk-real"),
            ("LANGFUSE_ENABLED", "0"),
        ]));
        assert!(!untraced.has_placeholder_secrets());
    }
}
