//! Synthetic test documents and their BSON size.

use mongodb::bson::{self, oid::ObjectId};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Length of every `NestedObject::data` string.
pub const DATA_LEN: usize = 12;
/// Fewest ids a nested object carries.
pub const MIN_IDS: usize = 5;
/// Most ids a nested object carries.
pub const MAX_IDS: usize = 20;

/// `chrono` format of `TestDocument::insertion_time`.
pub const INSERTION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The document inserted once per measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDocument {
    /// Assigned by the store on insert.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub objects: Vec<NestedObject>,
    /// BSON length measured before stamping, stored as int32.
    pub size_in_bytes: i32,
    pub insertion_time: String,
    /// Whole milliseconds spent reading the document back.
    pub retrieval_time: i64,
}

/// One entry of the embedded array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedObject {
    pub order: i32,
    pub data: String,
    /// Only there to take up space.
    #[serde(rename = "bool")]
    pub flag: bool,
    pub ids: Vec<ObjectId>,
}

impl TestDocument {
    /// Attach the measured size and the time the round trip started.
    pub fn stamp(&mut self, size_in_bytes: usize, insertion_time: String) {
        // BSON documents are capped at 16 MiB
        self.size_in_bytes = i32::try_from(size_in_bytes).unwrap_or(i32::MAX);
        self.insertion_time = insertion_time;
    }
}

/// Build a document whose `objects` array holds exactly `n` entries.
///
/// Everything random, object ids included, comes from `rng`, so a seeded
/// generator yields the same document every time.
pub fn synthesize<R: Rng>(n: usize, rng: &mut R) -> TestDocument {
    let objects = (0..n)
        .map(|i| {
            let data = random_string(rng, DATA_LEN);
            let flag = rng.random_bool(0.5);
            let id_count = rng.random_range(MIN_IDS..=MAX_IDS);
            NestedObject {
                order: i32::try_from(i).unwrap_or(i32::MAX),
                data,
                flag,
                ids: random_object_ids(rng, id_count),
            }
        })
        .collect();

    TestDocument {
        id: None,
        objects,
        size_in_bytes: 0,
        insertion_time: String::new(),
        retrieval_time: 0,
    }
}

/// Length of the document's BSON encoding.
pub fn document_size(doc: &TestDocument) -> Result<usize> {
    Ok(bson::to_vec(doc)?.len())
}

fn random_string<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

fn random_object_ids<R: Rng>(rng: &mut R, count: usize) -> Vec<ObjectId> {
    (0..count)
        .map(|_| ObjectId::from_bytes(rng.random()))
        .collect()
}
