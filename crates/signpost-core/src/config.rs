use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SignpostError};

/// Top-level configuration for the Signpost assistant.
///
/// Loaded from `~/.signpost/config.toml` by default. Each section corresponds
/// to one component of the assistant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignpostConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

impl SignpostConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SignpostConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SignpostError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Where the conversation document comes from and how it is rooted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Document location: an `http(s)://` or `file:` URL, or a bare path to a
    /// `.json` or `.toml` document. Reloads fetch it again.
    pub source: String,
    /// Name of the landing node every session starts from.
    pub root_node: String,
    /// Directory that photo references are resolved against.
    pub photo_dir: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            source: "file:conversation_tree.json".to_string(),
            root_node: "/start".to_string(),
            photo_dir: "photo".to_string(),
        }
    }
}

/// Free-text search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Morphological analyzers to enable, by language code.
    pub languages: Vec<String>,
    /// Tokens shorter than this (in characters) are discarded.
    pub min_token_length: usize,
    /// Weight of a word found in a node's name or alt-names.
    pub identity_weight: u64,
    /// Weight of a word found in keywords, answers or link labels.
    pub content_weight: u64,
    /// Maximum number of candidates offered when a query matches several nodes.
    pub shortlist_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "ru".to_string()],
            min_token_length: 3,
            identity_weight: 9000,
            content_weight: 1,
            shortlist_limit: 5,
        }
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minutes of inactivity after which a session is forgotten.
    pub ttl_minutes: u32,
    /// Keep sessions between events. When false every event starts from a
    /// fresh session at the root.
    pub persist: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 30,
            persist: true,
        }
    }
}

/// Interaction statistics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Collect interaction statistics.
    pub enabled: bool,
    /// Number of most visited nodes listed in the statistics report.
    pub top_nodes: usize,
    /// IANA time zone the report shows start and reload times in.
    pub timezone: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_nodes: 20,
            timezone: "Europe/Zurich".to_string(),
        }
    }
}

/// Feedback relay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Name of the channel feedback is relayed to. `None` disables relaying.
    pub channel: Option<String>,
}

/// Privileged users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Usernames allowed into the admin menu.
    pub users: Vec<String>,
}

impl AdminConfig {
    /// Whether `username` is allowed into the admin menu.
    pub fn is_admin(&self, username: Option<&str>) -> bool {
        match username {
            Some(name) => self.users.iter().any(|u| u == name),
            None => false,
        }
    }
}

/// User-facing texts and button labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    pub prompt_reply: String,
    pub back: String,
    pub start_over: String,
    pub feedback: String,
    pub prompt_feedback: String,
    pub continue_feedback: String,
    pub send_feedback: String,
    pub send_feedback_anonymously: String,
    pub thank_for_feedback: String,
    pub admin: String,
    pub admin_prompt: String,
    pub reload: String,
    pub reload_done: String,
    pub reload_failed: String,
    pub statistics: String,
    pub statistics_unavailable: String,
    pub data_refreshed: String,
    pub empty_search_results: String,
    pub search_result_header: String,
    /// Header for a single search hit; `{}` is replaced by the node name.
    pub single_search_result_header: String,
    pub error_occurred: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            prompt_reply: "Choose an option".to_string(),
            back: "Back".to_string(),
            start_over: "Return to start".to_string(),
            feedback: "Leave feedback".to_string(),
            prompt_feedback: "Write your feedback right here.".to_string(),
            continue_feedback: "Keep writing if you want to add something. \
                                Press \"Send feedback\" when you are ready."
                .to_string(),
            send_feedback: "Send feedback".to_string(),
            send_feedback_anonymously: "Send feedback anonymously".to_string(),
            thank_for_feedback: "Thank you for your feedback!".to_string(),
            admin: "Admin".to_string(),
            admin_prompt: "Long time no see! How are you?".to_string(),
            reload: "Reload conversation data".to_string(),
            reload_done: "Conversation data reloaded.".to_string(),
            reload_failed: "Conversation data could not be reloaded; \
                            the previous version stays active."
                .to_string(),
            statistics: "Statistics".to_string(),
            statistics_unavailable: "Statistics are not being collected.".to_string(),
            data_refreshed: "The conversation data has been updated. \
                             Please return to the start."
                .to_string(),
            empty_search_results: "Nothing was found for your query. \
                                   Please try a different query or pick a menu option."
                .to_string(),
            search_result_header: "These articles match your query:".to_string(),
            single_search_result_header: "Found the article \"{}\":".to_string(),
            error_occurred: "Sorry, something went wrong. Please start over.".to_string(),
        }
    }
}

impl MessagesConfig {
    /// Header announcing a single search hit.
    pub fn single_search_result(&self, node_name: &str) -> String {
        self.single_search_result_header.replacen("{}", node_name, 1)
    }
}
