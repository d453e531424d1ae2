//! Archive ingestion: ZIP of paper JSON files → chunks → embeddings → store.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;
use zip::ZipArchive;

use super::splitter::{DocumentFragment, TextSplitter};
use super::store::{RagStore, StoredChunk};
use crate::core::config::RagSettings;
use crate::core::errors::ApiError;
use crate::llm::LlmProvider;

pub const EMBEDDING_MODEL_META_KEY: &str = "embedding_model";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read archive {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("invalid JSON in {file}: {source}")]
    Json {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{file} is missing required field '{field}'")]
    MissingField { file: String, field: String },

    #[error("store was built with embedding model '{stored}', refusing to append with '{requested}'")]
    ModelMismatch { stored: String, requested: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Fragments read from an archive, plus the entries they came from.
#[derive(Debug, Clone)]
pub struct LoadedArchive {
    /// Archive entries that were parsed, in archive order.
    pub files: Vec<String>,
    pub fragments: Vec<DocumentFragment>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub files: usize,
    pub fragments: usize,
    pub chunks: usize,
}

/// Reads every `*.json` entry under `prefix` (first `limit` of them when a
/// limit is given) and collects the `abstract` then `body_text` paragraph
/// texts of each, in archive order.
pub fn load_documents(
    zip_path: &Path,
    prefix: &str,
    limit: Option<usize>,
) -> Result<LoadedArchive, IngestError> {
    let file = File::open(zip_path).map_err(|source| IngestError::Io {
        path: zip_path.to_path_buf(),
        source,
    })?;
    let mut zip = ZipArchive::new(file)?;

    let mut entries = Vec::new();
    for index in 0..zip.len() {
        let entry = zip.by_index(index)?;
        let name = entry.name();
        if name.ends_with(".json") && name.starts_with(prefix) {
            entries.push((index, name.to_string()));
        }
    }
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    let mut files = Vec::with_capacity(entries.len());
    let mut fragments = Vec::new();
    for (index, name) in entries {
        let mut entry = zip.by_index(index)?;
        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|source| IngestError::Io {
                path: zip_path.join(&name),
                source,
            })?;

        let data: Value = serde_json::from_str(&content).map_err(|source| IngestError::Json {
            file: name.clone(),
            source,
        })?;

        for section in ["abstract", "body_text"] {
            for text in section_texts(&data, section, &name)? {
                fragments.push(DocumentFragment {
                    text,
                    source: name.clone(),
                });
            }
        }
        files.push(name);
    }

    Ok(LoadedArchive { files, fragments })
}

fn section_texts(data: &Value, section: &str, file: &str) -> Result<Vec<String>, IngestError> {
    let items = data
        .get(section)
        .and_then(Value::as_array)
        .ok_or_else(|| IngestError::MissingField {
            file: file.to_string(),
            field: section.to_string(),
        })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.get("text")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| IngestError::MissingField {
                    file: file.to_string(),
                    field: format!("{}[{}].text", section, index),
                })
        })
        .collect()
}

/// Loads, splits, embeds and persists an archive into `store`.
///
/// Chunks are appended; a store already built with a different embedding
/// model is rejected before anything is written.
pub async fn create_store(
    zip_path: &Path,
    store: &dyn RagStore,
    embedder: &dyn LlmProvider,
    embedding_model: &str,
    settings: &RagSettings,
    limit: Option<usize>,
) -> Result<IngestReport, IngestError> {
    let recorded = store.get_meta(EMBEDDING_MODEL_META_KEY).await?;
    if let Some(stored) = &recorded {
        if stored != embedding_model {
            return Err(IngestError::ModelMismatch {
                stored: stored.clone(),
                requested: embedding_model.to_string(),
            });
        }
    }

    let path = zip_path.to_path_buf();
    let prefix = settings.archive_prefix.clone();
    let loaded = tokio::task::spawn_blocking(move || load_documents(&path, &prefix, limit))
        .await
        .map_err(ApiError::internal)??;
    tracing::info!(
        "Loaded {} fragments from {} files in {}",
        loaded.fragments.len(),
        loaded.files.len(),
        zip_path.display()
    );

    let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap)?;
    let chunks = splitter.split_fragments(&loaded.fragments);
    tracing::info!(
        "Split into {} chunks (size {}, overlap {})",
        chunks.len(),
        splitter.chunk_size(),
        splitter.chunk_overlap()
    );

    // Recorded before the first insert so a run that fails midway still
    // pins the store to this model.
    if recorded.is_none() && !chunks.is_empty() {
        store
            .set_meta(EMBEDDING_MODEL_META_KEY, embedding_model)
            .await?;
    }

    let batch_size = settings.embed_batch_size.max(1);
    let mut written = 0usize;
    for batch in chunks.chunks(batch_size) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed(&texts, embedding_model).await?;
        if embeddings.len() != texts.len() {
            return Err(ApiError::Upstream(format!(
                "embedding model returned {} vectors for {} inputs",
                embeddings.len(),
                texts.len()
            ))
            .into());
        }

        let items = batch
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                let stored = StoredChunk {
                    chunk_id: Uuid::new_v4().to_string(),
                    content: chunk.text.clone(),
                    source: chunk.source.clone(),
                    metadata: Some(json!({
                        "fragment_index": chunk.fragment_index,
                        "chunk_index": chunk.chunk_index,
                    })),
                };
                (stored, embedding)
            })
            .collect();
        store.insert_batch(items).await?;

        written += batch.len();
        tracing::debug!("Persisted {}/{} chunks", written, chunks.len());
    }

    Ok(IngestReport {
        files: loaded.files.len(),
        fragments: loaded.fragments.len(),
        chunks: written,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    use super::*;
    use crate::llm::testing::HashingProvider;
    use crate::rag::SqliteRagStore;

    const PREFIX: &str = "document_parses/pdf_json";

    fn paper(abstract_texts: &[&str], body_texts: &[&str]) -> String {
        let section = |texts: &[&str]| {
            texts
                .iter()
                .map(|t| json!({ "text": t, "section": "" }))
                .collect::<Vec<_>>()
        };
        json!({
            "paper_id": "x",
            "abstract": section(abstract_texts),
            "body_text": section(body_texts),
        })
        .to_string()
    }

    fn write_archive(dir: &Path, entries: &[(&str, String)]) -> PathBuf {
        let path = dir.join("archive.zip");
        let file = File::create(&path).unwrap();
        let mut writer = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, body) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn load_documents_reads_abstract_then_body() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = write_archive(
            tmp.path(),
            &[(
                "document_parses/pdf_json/a.json",
                paper(&["abstract one"], &["body one", "body two"]),
            )],
        );

        let loaded = load_documents(&archive, PREFIX, None).unwrap();
        let texts: Vec<&str> = loaded.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["abstract one", "body one", "body two"]);
        assert!(loaded
            .fragments
            .iter()
            .all(|f| f.source == "document_parses/pdf_json/a.json"));
    }

    #[test]
    fn limit_selects_first_files_in_archive_order() {
        let tmp = tempfile::tempdir().unwrap();
        let entries: Vec<(&str, String)> = vec![
            ("document_parses/pdf_json/c.json", paper(&["c"], &[])),
            ("document_parses/pmc_json/skip.json", paper(&["skip"], &[])),
            ("document_parses/pdf_json/a.json", paper(&["a"], &[])),
            ("document_parses/pdf_json/readme.txt", "not json".to_string()),
            ("document_parses/pdf_json/b.json", paper(&["b"], &[])),
            ("document_parses/pdf_json/d.json", paper(&["d"], &[])),
        ];
        let archive = write_archive(tmp.path(), &entries);

        let all = load_documents(&archive, PREFIX, None).unwrap();
        assert_eq!(all.files.len(), 4);

        let limited = load_documents(&archive, PREFIX, Some(2)).unwrap();
        assert_eq!(
            limited.files,
            vec![
                "document_parses/pdf_json/c.json".to_string(),
                "document_parses/pdf_json/a.json".to_string(),
            ]
        );
        let texts: Vec<&str> = limited.fragments.iter().map(|f| f.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a"]);
    }

    #[test]
    fn missing_body_text_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = write_archive(
            tmp.path(),
            &[(
                "document_parses/pdf_json/bad.json",
                json!({ "abstract": [] }).to_string(),
            )],
        );

        match load_documents(&archive, PREFIX, None) {
            Err(IngestError::MissingField { file, field }) => {
                assert_eq!(file, "document_parses/pdf_json/bad.json");
                assert_eq!(field, "body_text");
            }
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = load_documents(&tmp.path().join("nope.zip"), PREFIX, None);
        assert!(matches!(result, Err(IngestError::Io { .. })));
    }

    #[tokio::test]
    async fn create_store_persists_every_chunk() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = write_archive(
            tmp.path(),
            &[
                (
                    "document_parses/pdf_json/a.json",
                    paper(&["ACE2 receptor binding"], &["Spike protein structure"]),
                ),
                (
                    "document_parses/pdf_json/b.json",
                    paper(&["Incubation period estimates"], &[]),
                ),
            ],
        );
        let store = SqliteRagStore::create(&tmp.path().join("vector_db"))
            .await
            .unwrap();
        let embedder = HashingProvider::default();
        let settings = RagSettings {
            embed_batch_size: 2,
            ..RagSettings::default()
        };

        let report = create_store(&archive, &store, &embedder, "hash-embed", &settings, None)
            .await
            .unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.fragments, 3);
        assert_eq!(report.chunks, 3);
        assert_eq!(store.count().await.unwrap(), 3);
        assert_eq!(
            store
                .get_meta(EMBEDDING_MODEL_META_KEY)
                .await
                .unwrap()
                .as_deref(),
            Some("hash-embed")
        );
    }

    #[tokio::test]
    async fn appending_with_another_model_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = write_archive(
            tmp.path(),
            &[("document_parses/pdf_json/a.json", paper(&["x"], &[]))],
        );
        let store = SqliteRagStore::create(&tmp.path().join("vector_db"))
            .await
            .unwrap();
        store
            .set_meta(EMBEDDING_MODEL_META_KEY, "other-model")
            .await
            .unwrap();

        let result = create_store(
            &archive,
            &store,
            &HashingProvider::default(),
            "hash-embed",
            &RagSettings::default(),
            None,
        )
        .await;

        assert!(matches!(result, Err(IngestError::ModelMismatch { .. })));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    /// Embeds the first batch, then fails every later call.
    struct FlakyEmbedder {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl LlmProvider for FlakyEmbedder {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn chat(
            &self,
            _request: crate::llm::ChatRequest,
            _model_id: &str,
        ) -> Result<String, ApiError> {
            Err(ApiError::Upstream("chat unsupported".to_string()))
        }

        async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, ApiError> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call > 0 {
                return Err(ApiError::Upstream("embedding server went away".to_string()));
            }
            Ok(inputs.iter().map(|t| HashingProvider::embed_text(t)).collect())
        }
    }

    #[tokio::test]
    async fn interrupted_run_still_pins_the_embedding_model() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = write_archive(
            tmp.path(),
            &[(
                "document_parses/pdf_json/a.json",
                paper(&["first"], &["second", "third"]),
            )],
        );
        let store = SqliteRagStore::create(&tmp.path().join("vector_db"))
            .await
            .unwrap();
        let settings = RagSettings {
            embed_batch_size: 1,
            ..RagSettings::default()
        };
        let flaky = FlakyEmbedder {
            calls: std::sync::atomic::AtomicUsize::new(0),
        };

        let first = create_store(&archive, &store, &flaky, "model-a", &settings, None).await;
        assert!(first.is_err());
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(
            store
                .get_meta(EMBEDDING_MODEL_META_KEY)
                .await
                .unwrap()
                .as_deref(),
            Some("model-a")
        );

        let second = create_store(
            &archive,
            &store,
            &HashingProvider::default(),
            "model-b",
            &settings,
            None,
        )
        .await;
        assert!(matches!(second, Err(IngestError::ModelMismatch { .. })));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
