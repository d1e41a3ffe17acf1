use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mongodb::bson::{self, oid::ObjectId, Bson, Document};

use super::{DocumentCollection, DocumentStore};
use crate::document::TestDocument;
use crate::error::{HarnessError, Result};

type Collections = HashMap<String, Vec<Document>>;

/// In-process store for dry runs and tests.
///
/// Documents are kept as BSON, so everything inserted goes through the same
/// encoding a real server would see. Cloning shares the underlying data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `database.name`.
    pub fn count(&self, database: &str, name: &str) -> usize {
        lock(&self.collections)
            .get(&namespace(database, name))
            .map_or(0, Vec::len)
    }

    /// Names of every collection that has seen an insert, sorted.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.collections).keys().cloned().collect();
        names.sort();
        names
    }
}

impl DocumentStore for MemoryStore {
    type Collection = MemoryCollection;

    fn collection(&self, database: &str, name: &str) -> MemoryCollection {
        MemoryCollection {
            namespace: namespace(database, name),
            name: name.to_string(),
            collections: Arc::clone(&self.collections),
        }
    }

    fn label(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone)]
pub struct MemoryCollection {
    namespace: String,
    name: String,
    collections: Arc<Mutex<Collections>>,
}

impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self, doc: &TestDocument) -> Result<ObjectId> {
        let mut stored = bson::to_document(doc).map_err(|e| {
            HarnessError::Write(format!("failed to encode document for {}: {}", self.namespace, e))
        })?;
        let id = doc.id.unwrap_or_else(ObjectId::new);
        stored.insert("_id", id);

        let mut collections = lock(&self.collections);
        let docs = collections.entry(self.namespace.clone()).or_default();
        if docs.iter().any(|d| d.get_object_id("_id").ok() == Some(id)) {
            return Err(HarnessError::Write(format!(
                "duplicate key {} in {}",
                id, self.namespace
            )));
        }
        docs.push(stored);
        Ok(id)
    }

    fn find(&self, filter: Document) -> Result<Vec<TestDocument>> {
        let collections = lock(&self.collections);
        let Some(docs) = collections.get(&self.namespace) else {
            return Ok(Vec::new());
        };
        docs.iter()
            .filter(|d| matches(d, &filter))
            .map(|d| self.decode(d))
            .collect()
    }

    fn find_one(&self, filter: Document) -> Result<Option<TestDocument>> {
        let collections = lock(&self.collections);
        collections
            .get(&self.namespace)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)))
            .map(|d| self.decode(d))
            .transpose()
    }

    fn update(&self, filter: Document, patch: Document) -> Result<()> {
        let mut fields = Document::new();
        for (op, value) in patch {
            match (op.as_str(), value) {
                ("$set", Bson::Document(set)) => {
                    for (key, value) in set {
                        fields.insert(key, value);
                    }
                }
                (op, _) => {
                    return Err(HarnessError::Write(format!(
                        "unsupported update operator '{}' on {}",
                        op, self.namespace
                    )))
                }
            }
        }

        let mut collections = lock(&self.collections);
        let target = collections
            .get_mut(&self.namespace)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &filter)))
            .ok_or_else(|| {
                HarnessError::Write(format!("no document in {} matches {}", self.namespace, filter))
            })?;
        for (key, value) in fields {
            target.insert(key, value);
        }
        Ok(())
    }

    fn delete(&self, filter: Document) -> Result<()> {
        let mut collections = lock(&self.collections);
        let docs = collections.get_mut(&self.namespace);
        let position = docs
            .as_ref()
            .and_then(|docs| docs.iter().position(|d| matches(d, &filter)));
        match (docs, position) {
            (Some(docs), Some(pos)) => {
                docs.remove(pos);
                Ok(())
            }
            _ => Err(HarnessError::Write(format!(
                "no document in {} matches {}",
                self.namespace, filter
            ))),
        }
    }
}

impl MemoryCollection {
    fn decode(&self, doc: &Document) -> Result<TestDocument> {
        bson::from_document(doc.clone()).map_err(|e| {
            HarnessError::Read(format!("failed to decode document from {}: {}", self.namespace, e))
        })
    }
}

/// Top-level equality on every filter field; `{}` matches everything.
fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

fn namespace(database: &str, name: &str) -> String {
    format!("{}.{}", database, name)
}

fn lock(collections: &Mutex<Collections>) -> MutexGuard<'_, Collections> {
    collections.lock().unwrap_or_else(PoisonError::into_inner)
}
