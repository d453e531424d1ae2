use serde_json::{json, Value};

pub const DEFAULT_ARCHIVE_FILE: &str = "archive.zip";
pub const DEFAULT_STORE_DIR: &str = "vector_db";
pub const DEFAULT_ARCHIVE_PREFIX: &str = "document_parses/pdf_json";
pub const DEFAULT_TEXT_MODEL: &str = "meta-llama/Llama-2-7b-chat-hf";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_CREDENTIAL_ENV: &str = "HF_AUTH_TOKEN";

/// Built-in configuration that `config.yml` is merged over.
pub fn default_config() -> Value {
    json!({
        "server": {
            "host": "0.0.0.0",
            "port": 8888,
            "cors_allowed_origins": []
        },
        "rag": {
            "archive_file": DEFAULT_ARCHIVE_FILE,
            "archive_prefix": DEFAULT_ARCHIVE_PREFIX,
            "store_dir": DEFAULT_STORE_DIR,
            "chunk_size": 500,
            "chunk_overlap": 50,
            "top_k": 4,
            "embed_batch_size": 32
        },
        "models": {
            "credential_env": DEFAULT_CREDENTIAL_ENV,
            "text_model": {
                "id": DEFAULT_TEXT_MODEL,
                "base_url": "http://127.0.0.1:8080",
                "temperature": 0.0,
                "max_tokens": 512,
                "repeat_penalty": 1.1
            },
            "embedding_model": {
                "id": DEFAULT_EMBEDDING_MODEL,
                "base_url": "http://127.0.0.1:8081"
            }
        }
    })
}
