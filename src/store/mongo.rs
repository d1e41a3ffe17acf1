use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::sync::{Client, Collection};

use super::{DocumentCollection, DocumentStore};
use crate::document::TestDocument;
use crate::error::{HarnessError, Result};

/// MongoDB through the driver's blocking API.
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
}

impl MongoStore {
    /// Build a client for `uri` and ping the server, so an unreachable
    /// deployment fails here rather than on the first insert.
    pub fn connect(uri: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .map_err(|e| HarnessError::Connection(format!("{}: {}", uri, e)))?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .run()
            .map_err(|e| HarnessError::Connection(format!("ping failed: {}", e)))?;
        log::info!("connected to MongoDB");
        Ok(Self { client })
    }
}

impl DocumentStore for MongoStore {
    type Collection = MongoCollection;

    fn collection(&self, database: &str, name: &str) -> MongoCollection {
        MongoCollection {
            inner: self.client.database(database).collection(name),
        }
    }

    fn label(&self) -> &'static str {
        "mongodb"
    }
}

#[derive(Clone)]
pub struct MongoCollection {
    inner: Collection<TestDocument>,
}

impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn insert(&self, doc: &TestDocument) -> Result<ObjectId> {
        let result = self
            .inner
            .insert_one(doc)
            .run()
            .map_err(|e| HarnessError::Write(format!("insert into {}: {}", self.name(), e)))?;
        result.inserted_id.as_object_id().ok_or_else(|| {
            HarnessError::Write(format!(
                "insert into {} returned a non-ObjectId _id: {}",
                self.name(),
                result.inserted_id
            ))
        })
    }

    fn find(&self, filter: Document) -> Result<Vec<TestDocument>> {
        let cursor = self
            .inner
            .find(filter)
            .run()
            .map_err(|e| HarnessError::Read(format!("find in {}: {}", self.name(), e)))?;
        cursor
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| HarnessError::Read(format!("decode from {}: {}", self.name(), e)))
    }

    fn find_one(&self, filter: Document) -> Result<Option<TestDocument>> {
        self.inner
            .find_one(filter)
            .run()
            .map_err(|e| HarnessError::Read(format!("find_one in {}: {}", self.name(), e)))
    }

    fn update(&self, filter: Document, patch: Document) -> Result<()> {
        let result = self
            .inner
            .update_one(filter.clone(), patch)
            .run()
            .map_err(|e| HarnessError::Write(format!("update in {}: {}", self.name(), e)))?;
        if result.matched_count == 0 {
            return Err(HarnessError::Write(format!(
                "no document in {} matches {}",
                self.name(),
                filter
            )));
        }
        Ok(())
    }

    fn delete(&self, filter: Document) -> Result<()> {
        let result = self
            .inner
            .delete_one(filter.clone())
            .run()
            .map_err(|e| HarnessError::Write(format!("delete in {}: {}", self.name(), e)))?;
        if result.deleted_count == 0 {
            return Err(HarnessError::Write(format!(
                "no document in {} matches {}",
                self.name(),
                filter
            )));
        }
        Ok(())
    }
}
