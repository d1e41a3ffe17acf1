//! Round trips against a real MongoDB deployment.
//!
//! Ignored by default. Run with a server available:
//! `MONGODB_URI=mongodb://localhost:27017 cargo test --test mongo -- --ignored`

mod common;

use common::{lines, rng};
use embedded_array_benchmarks::config::DEFAULT_URI;
use embedded_array_benchmarks::document::{document_size, synthesize};
use embedded_array_benchmarks::naming::TimestampNamer;
use embedded_array_benchmarks::runner::{Runner, RunnerConfig};
use embedded_array_benchmarks::store::{id_filter, DocumentCollection, DocumentStore, MongoStore};
use embedded_array_benchmarks::HarnessError;
use mongodb::bson::doc;

fn store() -> MongoStore {
    let uri = std::env::var("MONGODB_URI").unwrap_or_else(|_| DEFAULT_URI.to_string());
    MongoStore::connect(&uri).expect("MongoDB not reachable")
}

#[test]
#[ignore]
fn insert_then_find_by_id_round_trips() {
    let store = store();
    let coll = store.collection("embedded_array_tests", "round_trip");

    let mut doc = synthesize(55, &mut rng(11));
    let size = document_size(&doc).unwrap();
    doc.stamp(size, "2025-01-01 00:00:00".to_string());

    let id = coll.insert(&doc).unwrap();
    let found = coll.find_one(id_filter(id)).unwrap().unwrap();
    doc.id = Some(id);
    assert_eq!(found, doc);

    coll.update(id_filter(id), doc! { "$set": { "retrievalTime": 3i64 } })
        .unwrap();
    assert_eq!(coll.find_one(id_filter(id)).unwrap().unwrap().retrieval_time, 3);

    coll.delete(id_filter(id)).unwrap();
    assert!(coll.find_one(id_filter(id)).unwrap().is_none());
}

#[test]
#[ignore]
fn small_sweep_against_mongodb() {
    let store = store();
    let config = RunnerConfig {
        database: "embedded_array_tests".to_string(),
        ceiling: 13,
        delete_after_read: true,
        ..RunnerConfig::default()
    };
    let mut runner = Runner::new(&store, config, rng(5), TimestampNamer::new("sweep")).unwrap();
    let mut out = Vec::new();
    let report = runner.run(&mut out).unwrap();

    assert_eq!(report.rows.len(), 6);
    assert_eq!(lines(&String::from_utf8(out).unwrap()).len(), 7);
}

#[test]
fn unreachable_server_is_a_connection_error() {
    let result = MongoStore::connect("mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200");
    assert!(matches!(result, Err(HarnessError::Connection(_))));
}
