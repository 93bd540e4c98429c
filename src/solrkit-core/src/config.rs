use serde::{Deserialize, Serialize};

/// Connection settings for one Solr core or collection
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Core URL, e.g. `http://localhost:8983/solr/mycore`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_update_path")]
    pub update_path: String,

    #[serde(default = "default_select_path")]
    pub select_path: String,

    /// Empty means the base URL itself
    #[serde(default)]
    pub ping_path: String,

    /// Request timeout handed to the HTTP transport; none by default
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub insecure_skip_verify: bool,

    /// HTTP statuses accepted as success
    #[serde(default = "default_success_statuses")]
    pub success_statuses: Vec<u16>,
}

fn default_base_url() -> String {
    "http://localhost:8983/solr".to_string()
}

fn default_update_path() -> String {
    "update".to_string()
}

fn default_select_path() -> String {
    "select".to_string()
}

fn default_success_statuses() -> Vec<u16> {
    vec![200]
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Defaults with `SOLR_URL` applied when set
    pub fn from_env() -> Self {
        match std::env::var("SOLR_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }

    /// Full URL of an endpoint below the base URL
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/", base)
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn update_url(&self) -> String {
        self.endpoint(&self.update_path)
    }

    pub fn select_url(&self) -> String {
        self.endpoint(&self.select_path)
    }

    pub fn ping_url(&self) -> String {
        self.endpoint(&self.ping_path)
    }

    pub fn is_success(&self, status: u16) -> bool {
        self.success_statuses.contains(&status)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            update_path: default_update_path(),
            select_path: default_select_path(),
            ping_path: String::new(),
            timeout_secs: None,
            insecure_skip_verify: false,
            success_statuses: default_success_statuses(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_with_one_slash() {
        let config = ClientConfig::new("http://localhost:8983/solr/");
        assert_eq!(config.update_url(), "http://localhost:8983/solr/update");
        assert_eq!(config.select_url(), "http://localhost:8983/solr/select");
        assert_eq!(config.ping_url(), "http://localhost:8983/solr/");
        assert_eq!(
            config.endpoint("/admin/ping"),
            "http://localhost:8983/solr/admin/ping"
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://solr:8983/solr/books"}"#).unwrap();
        assert_eq!(config.base_url, "http://solr:8983/solr/books");
        assert_eq!(config.update_path, "update");
        assert_eq!(config.success_statuses, vec![200]);
        assert!(config.is_success(200));
        assert!(!config.is_success(404));
        assert!(config.timeout_secs.is_none());
    }
}
