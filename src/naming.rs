//! Collection naming strategies.

use std::collections::HashMap;

use chrono::Local;

/// Default prefix of every collection the harness creates.
pub const DEFAULT_PREFIX: &str = "testcollection";

/// Picks the name of the collection the next documents go into.
///
/// `object_count` is `Some(n)` when each sweep value gets its own collection.
pub trait CollectionNamer {
    fn collection_name(&mut self, object_count: Option<usize>) -> String;
}

/// `testcollection_20250101_120000` or `testcollection_N=13_20250101_120000`.
///
/// A name already handed out gets a `_2`, `_3`, ... suffix, so a sweep that
/// repeats a size within the same second still gets a fresh collection.
#[derive(Debug, Clone)]
pub struct TimestampNamer {
    prefix: String,
    issued: HashMap<String, usize>,
}

impl TimestampNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: HashMap::new(),
        }
    }
}

impl Default for TimestampNamer {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl CollectionNamer for TimestampNamer {
    fn collection_name(&mut self, object_count: Option<usize>) -> String {
        let ts = Local::now().format("%Y%m%d_%H%M%S");
        let name = match object_count {
            Some(n) => format!("{}_N={}_{}", self.prefix, n, ts),
            None => format!("{}_{}", self.prefix, ts),
        };
        let uses = self.issued.entry(name.clone()).or_insert(0);
        *uses += 1;
        if *uses == 1 {
            name
        } else {
            format!("{}_{}", name, uses)
        }
    }
}

/// `prefix_0`, `prefix_1`, ... regardless of the object count.
#[derive(Debug, Clone)]
pub struct SequentialNamer {
    prefix: String,
    next: u64,
}

impl SequentialNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl CollectionNamer for SequentialNamer {
    fn collection_name(&mut self, _object_count: Option<usize>) -> String {
        let name = format!("{}_{}", self.prefix, self.next);
        self.next += 1;
        name
    }
}
