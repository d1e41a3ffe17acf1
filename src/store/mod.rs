//! The storage collaborator the harness measures.
//!
//! [`DocumentStore`] hands out collections; [`DocumentCollection`] is the
//! handful of driver calls a round trip needs. Filters and patches are plain
//! BSON documents, the same shape the MongoDB driver takes.

mod memory;
mod mongo;

pub use memory::{MemoryCollection, MemoryStore};
pub use mongo::{MongoCollection, MongoStore};

use mongodb::bson::{doc, oid::ObjectId, Document};

use crate::document::TestDocument;
use crate::error::Result;

/// A connected database server.
pub trait DocumentStore {
    type Collection: DocumentCollection;

    /// Handle to `database.name`. Collections are created lazily on first insert.
    fn collection(&self, database: &str, name: &str) -> Self::Collection;

    /// Short label used in reports, e.g. `"mongodb"`.
    fn label(&self) -> &'static str;
}

/// One collection of [`TestDocument`]s.
pub trait DocumentCollection {
    fn name(&self) -> &str;

    /// Insert `doc` and return the id it was stored under.
    fn insert(&self, doc: &TestDocument) -> Result<ObjectId>;

    fn find(&self, filter: Document) -> Result<Vec<TestDocument>>;

    fn find_one(&self, filter: Document) -> Result<Option<TestDocument>>;

    /// Apply `patch` (a `$set` update) to the first match. No match is an error.
    fn update(&self, filter: Document, patch: Document) -> Result<()>;

    /// Delete the first match. No match is an error.
    fn delete(&self, filter: Document) -> Result<()>;
}

/// `{ _id: id }`
pub fn id_filter(id: ObjectId) -> Document {
    doc! { "_id": id }
}
