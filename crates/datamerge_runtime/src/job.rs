//! One merge run: load, merge, save

use crate::boot_config::BootConfig;
use datamerge_ir::{MergeOutcome, RawRecord};
use datamerge_kernel::{MergeEngine, MergeError};
use datamerge_scene::{Document, NodeId, SceneError, SceneHost};
use datamerge_services::{
    FileRecordSource, FileStore, HttpClient, HttpImageSource, KeyValueStore, RecordSource, ServiceError,
    SheetRecordSource, SheetUrl, StaticFontLoader, SHEET_URL_KEY,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors that end a run
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("No document given (use --document or DATAMERGE_DOCUMENT)")]
    NoDocument,

    #[error("No records given and no sheet link saved")]
    NoRecords,

    #[error("No node matches {0:?}")]
    RootNotFound(String),

    #[error("Nothing selected to merge into")]
    NoRoots,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Document(#[from] SceneError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Merge(#[from] MergeError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Run one merge as configured and write the document back
pub async fn run(config: &BootConfig) -> RuntimeResult<MergeOutcome> {
    let document_path = config.input.document.as_deref().ok_or(RuntimeError::NoDocument)?;
    let mut document = read_document(document_path).await?;

    let roots = resolve_roots(&document, &config.input.roots)?;
    let store = FileStore::new(&config.network.state_path);
    let client = HttpClient::new()?;
    let records = load_records(config, &store, &client).await?;
    log::info!("Loaded {} records", records.len());

    let mut images = HttpImageSource::new(client);
    if let Some(proxy) = &config.network.proxy {
        images = images.with_proxy(proxy.clone());
    }
    let engine = MergeEngine::new(Arc::new(images), Arc::new(StaticFontLoader::permissive()));
    let outcome = engine.merge(&mut document, &roots, &records, &config.merge).await?;

    let output = config.input.output_path().unwrap_or(document_path);
    write_document(&document, output).await?;
    log::info!("Wrote {}", output.display());
    Ok(outcome)
}

async fn read_document(path: &Path) -> RuntimeResult<Document> {
    let json = tokio::fs::read_to_string(path).await.map_err(|source| RuntimeError::Read {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Document::from_json(&json)?)
}

async fn write_document(document: &Document, path: &Path) -> RuntimeResult<()> {
    let json = document.to_json()?;
    tokio::fs::write(path, json).await.map_err(|source| RuntimeError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Turn `--root` values into node ids
///
/// A value naming an existing node id picks that node; anything else picks
/// every node with that name. Without values the document's saved selection
/// is used.
pub fn resolve_roots(document: &Document, specs: &[String]) -> RuntimeResult<Vec<NodeId>> {
    if specs.is_empty() {
        let selection = document.selection().to_vec();
        if selection.is_empty() {
            return Err(RuntimeError::NoRoots);
        }
        return Ok(selection);
    }

    let mut roots = Vec::new();
    for spec in specs {
        if let Ok(id) = spec.parse::<NodeId>() {
            if document.node(id).is_some() {
                roots.push(id);
                continue;
            }
        }
        let named = document.find_all_by_name(document.root(), spec);
        if named.is_empty() {
            return Err(RuntimeError::RootNotFound(spec.clone()));
        }
        roots.extend(named);
    }
    roots.dedup();
    Ok(roots)
}

/// Read records from the configured file or spreadsheet
///
/// A records file wins over a sheet link. Without either, the last sheet
/// link saved in `store` is used. A sheet that loads is saved for next time.
pub async fn load_records(
    config: &BootConfig,
    store: &dyn KeyValueStore,
    client: &HttpClient,
) -> RuntimeResult<Vec<RawRecord>> {
    if let Some(path) = &config.input.records {
        let source = FileRecordSource::new(path);
        log::info!("Reading records from {}", source.describe());
        return Ok(source.records().await?);
    }

    let link = match &config.input.sheet_url {
        Some(link) => link.clone(),
        None => store.get(SHEET_URL_KEY).await?.ok_or(RuntimeError::NoRecords)?,
    };
    let url = SheetUrl::parse(&link).map_err(ServiceError::from)?;

    let mut source = SheetRecordSource::new(url, client.clone());
    if let Some(proxy) = &config.network.proxy {
        source = source.with_proxy(proxy.clone());
    }
    if config.network.csv_export {
        source = source.with_csv_export();
    }

    let records = source.records().await?;
    store.set(SHEET_URL_KEY, source.sheet_url().as_str()).await?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datamerge_ir::Value;
    use datamerge_scene::{Node, NodeKind};
    use datamerge_services::MemoryStore;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("datamerge-runtime-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn card_document() -> (Document, NodeId) {
        let mut doc = Document::new();
        let card = doc
            .insert(doc.root(), Node::new(NodeKind::Frame, "Card").with_size(100.0, 60.0))
            .unwrap();
        doc.insert(card, Node::new(NodeKind::Text, "Title")).unwrap();
        (doc, card)
    }

    #[test]
    fn test_resolve_roots() {
        let (mut doc, card) = card_document();

        let by_name = resolve_roots(&doc, &["Card".to_string()]).unwrap();
        assert_eq!(by_name, vec![card]);

        let by_id = resolve_roots(&doc, &[card.to_string()]).unwrap();
        assert_eq!(by_id, vec![card]);

        assert!(matches!(
            resolve_roots(&doc, &["Badge".to_string()]),
            Err(RuntimeError::RootNotFound(name)) if name == "Badge"
        ));
        assert!(matches!(resolve_roots(&doc, &[]), Err(RuntimeError::NoRoots)));

        doc.set_selection(vec![card]);
        assert_eq!(resolve_roots(&doc, &[]).unwrap(), vec![card]);
    }

    #[tokio::test]
    async fn test_records_file_wins() {
        let dir = temp_dir("records");
        let path = dir.join("rows.csv");
        std::fs::write(&path, "Title.text,Card.x\nHello,10\n").unwrap();

        let mut config = BootConfig::default();
        config.input.records = Some(path);
        config.input.sheet_url = Some("not a link".to_string());
        let store = MemoryStore::new();

        let records = load_records(&config, &store, &HttpClient::new().unwrap()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Title.text"), Some(&Value::from("Hello")));
        assert_eq!(records[0].get("Card.x"), Some(&Value::Int(10)));
        assert_eq!(store.get(SHEET_URL_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let config = BootConfig::default();
        let result = load_records(&config, &MemoryStore::new(), &HttpClient::new().unwrap()).await;
        assert!(matches!(result, Err(RuntimeError::NoRecords)));
    }

    #[tokio::test]
    async fn test_saved_link_is_parsed() {
        let store = MemoryStore::new();
        store.set(SHEET_URL_KEY, "https://example.com/sheet").await.unwrap();

        let result = load_records(&BootConfig::default(), &store, &HttpClient::new().unwrap()).await;
        assert!(matches!(result, Err(RuntimeError::Service(ServiceError::SheetUrl(_)))));
    }

    #[tokio::test]
    async fn test_run_writes_output() {
        let dir = temp_dir("run");
        let (mut doc, card) = card_document();
        doc.set_selection(vec![card]);
        let document_path = dir.join("cards.json");
        let output_path = dir.join("merged.json");
        let records_path = dir.join("rows.json");
        std::fs::write(&document_path, doc.to_json().unwrap()).unwrap();
        std::fs::write(
            &records_path,
            r#"[{"Title.text": "One"}, {"Title.text": "Two", "Card.bogus": 1}]"#,
        )
        .unwrap();

        let mut config = BootConfig::default();
        config.input.document = Some(document_path.clone());
        config.input.records = Some(records_path);
        config.input.output = Some(output_path.clone());

        let outcome = run(&config).await.unwrap();
        assert_eq!(outcome.copies.len(), 2);
        assert_eq!(outcome.messages(), vec![r#"Card.bogus: unknown property "bogus""#.to_string()]);

        let merged = Document::from_json(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
        assert_eq!(merged.selection(), outcome.copies.as_slice());
        let titles: Vec<String> = outcome
            .copies
            .iter()
            .flat_map(|copy| merged.find_all_by_name(*copy, "Title"))
            .filter_map(|id| merged.node(id)?.text.as_ref().map(|t| t.characters.clone()))
            .collect();
        assert_eq!(titles, vec!["One", "Two"]);

        let untouched = Document::from_json(&std::fs::read_to_string(&document_path).unwrap()).unwrap();
        assert_eq!(untouched.len(), doc.len());
    }
}
