//! Client configuration.

use taskboard_shared::constants::DEFAULT_API_URL;

use crate::coordinator::MergePolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API, without a trailing slash.
    /// Env: `TASKBOARD_API_URL`
    /// Default: `http://127.0.0.1:8080`
    pub base_url: String,

    /// What a settled mutation does to the cache besides invalidating it.
    pub merge_policy: MergePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize(&base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup("TASKBOARD_API_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Self::new(url)
            }
            Some(url) => {
                tracing::warn!(value = %url, "Invalid TASKBOARD_API_URL, using default");
                Self::default()
            }
            None => Self::default(),
        }
    }
}

fn normalize(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_local_server() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.merge_policy, MergePolicy::InvalidateOnly);
    }

    #[test]
    fn test_env_url_is_normalized() {
        let config = ClientConfig::from_lookup(|key| {
            (key == "TASKBOARD_API_URL").then(|| "https://tasks.example.org/ ".to_string())
        });
        assert_eq!(config.base_url, "https://tasks.example.org");
    }

    #[test]
    fn test_non_http_url_falls_back() {
        let config = ClientConfig::from_lookup(|_| Some("ftp://nope".to_string()));
        assert_eq!(config, ClientConfig::default());
    }
}
