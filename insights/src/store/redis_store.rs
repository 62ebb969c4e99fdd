use log::debug;
use redis::{aio::ConnectionManager, cmd};

use super::{DocumentStore, prepare_save};
use crate::{
    errors::ApiError,
    keys::KeyContext,
    types::{DocType, Document},
};

const SCAN_COUNT: usize = 1024;

/// Documents stored as RedisJSON values, one key per document.
///
/// Child rows live inside their parent's JSON value, so only top-level doctypes get keys.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    prefix: String,
    site: String,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, site: impl Into<String>) -> Self {
        Self {
            conn,
            prefix: prefix.into(),
            site: site.into(),
        }
    }

    pub fn key_context(&self) -> KeyContext<'_> {
        KeyContext::new(&self.prefix, &self.site)
    }

    async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, ApiError> {
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next_cursor, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }
        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn read_key(&self, key: &str) -> Result<Option<Document>, ApiError> {
        let mut conn = self.conn.clone();
        let result: Option<String> = cmd("JSON.GET").arg(key).query_async(&mut conn).await?;
        match result {
            Some(json) => Ok(Some(serde_json::from_str::<Document>(&json)?)),
            None => Ok(None),
        }
    }

    /// Remove every key under this store's site namespace. Returns the number deleted.
    pub async fn clear(&self) -> Result<u64, ApiError> {
        let pattern = format!("{}:{}:*", self.prefix, self.site);
        let keys = self.scan_keys(&pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.conn.clone();
        let deleted: u64 = cmd("DEL").arg(&keys).query_async(&mut conn).await?;
        Ok(deleted)
    }
}

impl DocumentStore for RedisStore {
    async fn documents(&self, doctype: DocType) -> Result<Vec<Document>, ApiError> {
        if doctype.is_child() {
            return Ok(Vec::new());
        }
        let pattern = self.key_context().doctype_pattern(doctype);
        let mut documents = Vec::new();
        for key in self.scan_keys(&pattern).await? {
            if let Some(doc) = self.read_key(&key).await? {
                documents.push(doc);
            }
        }
        Ok(documents)
    }

    async fn get(&self, doctype: DocType, name: &str) -> Result<Option<Document>, ApiError> {
        let key = self.key_context().document(doctype, name);
        self.read_key(&key).await
    }

    async fn save(&self, doc: &mut Document) -> Result<(), ApiError> {
        prepare_save(doc)?;
        let key = self.key_context().document(doc.doctype, &doc.name);
        let payload = serde_json::to_string(doc)?;
        let mut conn = self.conn.clone();
        let _: () = cmd("JSON.SET").arg(&key).arg("$").arg(payload).query_async(&mut conn).await?;
        debug!("saved {} {} at {key}", doc.doctype, doc.name);
        Ok(())
    }
}
