//! Typed views over the merged configuration tree.

use serde_json::Value;

use super::defaults::{
    DEFAULT_ARCHIVE_FILE, DEFAULT_ARCHIVE_PREFIX, DEFAULT_CREDENTIAL_ENV,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_STORE_DIR, DEFAULT_TEXT_MODEL,
};

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl ServerSettings {
    pub fn from_config(config: &Value) -> Self {
        let server = config.get("server");
        let port = std::env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .or_else(|| {
                server
                    .and_then(|s| s.get("port"))
                    .and_then(Value::as_u64)
                    .map(|p| p as u16)
            })
            .unwrap_or(8888);

        Self {
            host: str_field(server, "host").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            cors_allowed_origins: server
                .and_then(|s| s.get("cors_allowed_origins"))
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct RagSettings {
    pub archive_file: String,
    pub archive_prefix: String,
    pub store_dir: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embed_batch_size: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            archive_file: DEFAULT_ARCHIVE_FILE.to_string(),
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            store_dir: DEFAULT_STORE_DIR.to_string(),
            chunk_size: 500,
            chunk_overlap: 50,
            top_k: 4,
            embed_batch_size: 32,
        }
    }
}

impl RagSettings {
    pub fn from_config(config: &Value) -> Self {
        let rag = config.get("rag");
        let defaults = Self::default();
        Self {
            archive_file: str_field(rag, "archive_file").unwrap_or(defaults.archive_file),
            archive_prefix: str_field(rag, "archive_prefix").unwrap_or(defaults.archive_prefix),
            store_dir: str_field(rag, "store_dir").unwrap_or(defaults.store_dir),
            chunk_size: usize_field(rag, "chunk_size").unwrap_or(defaults.chunk_size),
            chunk_overlap: usize_field(rag, "chunk_overlap").unwrap_or(defaults.chunk_overlap),
            top_k: usize_field(rag, "top_k").unwrap_or(defaults.top_k),
            embed_batch_size: usize_field(rag, "embed_batch_size")
                .unwrap_or(defaults.embed_batch_size),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelEndpoint {
    pub id: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    /// Name of the environment variable holding the model-server credential.
    pub credential_env: String,
    pub text_model: ModelEndpoint,
    pub embedding_model: ModelEndpoint,
    pub temperature: f64,
    pub max_tokens: i32,
    pub repeat_penalty: f64,
    pub prompt_template: Option<String>,
}

impl ModelSettings {
    pub fn from_config(config: &Value) -> Self {
        let models = config.get("models");
        let text = models.and_then(|m| m.get("text_model"));
        let embedding = models.and_then(|m| m.get("embedding_model"));

        Self {
            credential_env: str_field(models, "credential_env")
                .unwrap_or_else(|| DEFAULT_CREDENTIAL_ENV.to_string()),
            text_model: ModelEndpoint {
                id: str_field(text, "id").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
                base_url: str_field(text, "base_url")
                    .unwrap_or_else(|| "http://127.0.0.1:8080".to_string()),
            },
            embedding_model: ModelEndpoint {
                id: str_field(embedding, "id")
                    .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
                base_url: str_field(embedding, "base_url")
                    .unwrap_or_else(|| "http://127.0.0.1:8081".to_string()),
            },
            temperature: text
                .and_then(|t| t.get("temperature"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            max_tokens: text
                .and_then(|t| t.get("max_tokens"))
                .and_then(Value::as_i64)
                .map(|v| v as i32)
                .unwrap_or(512),
            repeat_penalty: text
                .and_then(|t| t.get("repeat_penalty"))
                .and_then(Value::as_f64)
                .unwrap_or(1.1),
            prompt_template: str_field(text, "prompt_template"),
        }
    }
}

fn str_field(section: Option<&Value>, key: &str) -> Option<String> {
    section
        .and_then(|s| s.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn usize_field(section: Option<&Value>, key: &str) -> Option<usize> {
    section
        .and_then(|s| s.get(key))
        .and_then(Value::as_u64)
        .map(|v| v as usize)
}
