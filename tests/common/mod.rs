//! Shared test utilities: seeded runners and a store that fails on demand.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use embedded_array_benchmarks::document::TestDocument;
use embedded_array_benchmarks::naming::SequentialNamer;
use embedded_array_benchmarks::runner::{Runner, RunnerConfig, SweepReport};
use embedded_array_benchmarks::store::{
    DocumentCollection, DocumentStore, MemoryCollection, MemoryStore,
};
use embedded_array_benchmarks::{HarnessError, Result};
use mongodb::bson::{oid::ObjectId, Document};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DATABASE: &str = "testdb";
pub const PREFIX: &str = "t";

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn config(ceiling: usize) -> RunnerConfig {
    RunnerConfig {
        ceiling,
        ..RunnerConfig::default()
    }
}

/// Run a full sweep and return the outcome together with everything printed.
pub fn run_sweep<S: DocumentStore>(store: &S, config: RunnerConfig) -> (Result<SweepReport>, String) {
    let mut runner = Runner::new(store, config, rng(7), SequentialNamer::new(PREFIX))
        .expect("invalid runner config");
    let mut out = Vec::new();
    let result = runner.run(&mut out);
    (result, String::from_utf8(out).expect("output is not utf-8"))
}

pub fn lines(output: &str) -> Vec<&str> {
    output.lines().collect()
}

// =============================================================================
// Fault injection
// =============================================================================

/// Wraps a [`MemoryStore`], failing inserts once a budget is spent and,
/// optionally, every read.
#[derive(Clone)]
pub struct FaultyStore {
    pub inner: MemoryStore,
    inserts_left: Rc<Cell<usize>>,
    fail_reads: bool,
}

impl FaultyStore {
    pub fn failing_inserts_after(successful: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            inserts_left: Rc::new(Cell::new(successful)),
            fail_reads: false,
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            inner: MemoryStore::new(),
            inserts_left: Rc::new(Cell::new(usize::MAX)),
            fail_reads: true,
        }
    }
}

impl DocumentStore for FaultyStore {
    type Collection = FaultyCollection;

    fn collection(&self, database: &str, name: &str) -> FaultyCollection {
        FaultyCollection {
            inner: self.inner.collection(database, name),
            inserts_left: Rc::clone(&self.inserts_left),
            fail_reads: self.fail_reads,
        }
    }

    fn label(&self) -> &'static str {
        "faulty"
    }
}

pub struct FaultyCollection {
    inner: MemoryCollection,
    inserts_left: Rc<Cell<usize>>,
    fail_reads: bool,
}

impl FaultyCollection {
    fn check_read(&self) -> Result<()> {
        if self.fail_reads {
            return Err(HarnessError::Read("simulated read failure".into()));
        }
        Ok(())
    }
}

impl DocumentCollection for FaultyCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn insert(&self, doc: &TestDocument) -> Result<ObjectId> {
        let left = self.inserts_left.get();
        if left == 0 {
            return Err(HarnessError::Write("simulated write failure".into()));
        }
        self.inserts_left.set(left - 1);
        self.inner.insert(doc)
    }

    fn find(&self, filter: Document) -> Result<Vec<TestDocument>> {
        self.check_read()?;
        self.inner.find(filter)
    }

    fn find_one(&self, filter: Document) -> Result<Option<TestDocument>> {
        self.check_read()?;
        self.inner.find_one(filter)
    }

    fn update(&self, filter: Document, patch: Document) -> Result<()> {
        self.inner.update(filter, patch)
    }

    fn delete(&self, filter: Document) -> Result<()> {
        self.inner.delete(filter)
    }
}
