use std::collections::BTreeMap;

use log::debug;
use tokio::sync::RwLock;

use super::{DocumentStore, prepare_save};
use crate::{
    errors::ApiError,
    types::{DocType, Document},
};

/// Process-local document store, used by tests and the CLI `--seed` mode.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<(DocType, String), Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `documents`, keeping their `modified` stamps.
    pub fn with_documents<I>(documents: I) -> Self
    where
        I: IntoIterator<Item = Document>,
    {
        let documents = documents
            .into_iter()
            .map(|doc| ((doc.doctype, doc.name.clone()), doc))
            .collect();
        Self {
            documents: RwLock::new(documents),
        }
    }

    /// Parse a JSON array of documents (the `--seed` fixture format).
    pub fn from_seed_json(json: &str) -> Result<Self, ApiError> {
        let documents: Vec<Document> = serde_json::from_str(json)?;
        if let Some(child) = documents.iter().find(|doc| doc.doctype.is_child()) {
            return Err(ApiError::invalid(format!(
                "seed document {} is a {} row; nest it under its parent",
                child.name, child.doctype
            )));
        }
        Ok(Self::with_documents(documents))
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    async fn documents(&self, doctype: DocType) -> Result<Vec<Document>, ApiError> {
        let documents = self.documents.read().await;
        Ok(documents
            .iter()
            .filter(|((kind, _), _)| *kind == doctype)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn get(&self, doctype: DocType, name: &str) -> Result<Option<Document>, ApiError> {
        let documents = self.documents.read().await;
        Ok(documents.get(&(doctype, name.to_string())).cloned())
    }

    async fn save(&self, doc: &mut Document) -> Result<(), ApiError> {
        prepare_save(doc)?;
        let mut documents = self.documents.write().await;
        documents.insert((doc.doctype, doc.name.clone()), doc.clone());
        debug!("saved {} {} in memory store", doc.doctype, doc.name);
        Ok(())
    }
}
