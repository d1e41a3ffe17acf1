//! The instrumented round-trip runner.
//!
//! For every value of the sweep the runner synthesizes documents, measures
//! their BSON size, inserts them and times the read-back, writing one CSV
//! line per result as soon as it is known. The first error ends the sweep;
//! lines already written stay valid.

use std::collections::HashSet;
use std::io::Write;
use std::time::{Duration, Instant};

use chrono::Local;
use log::{debug, info, warn};
use mongodb::bson::{doc, oid::ObjectId};
use rand::Rng;

use crate::document::{document_size, synthesize, TestDocument, INSERTION_TIME_FORMAT};
use crate::error::{HarnessError, Result};
use crate::naming::CollectionNamer;
use crate::store::{id_filter, DocumentCollection, DocumentStore};
use crate::sweep::{generate_sweep, SeedPair};

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_CEILING: usize = 10_000;
pub const DEFAULT_DATABASE: &str = "testdb";
/// Documents inserted per sweep value in aggregate mode.
pub const AGGREGATE_DOCUMENTS_PER_SIZE: usize = 35;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How results are measured and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportingMode {
    /// One line per document: its size and its own read-back time.
    PerDocument,
    /// One line per sweep value: average size and a bulk read of the collection.
    Aggregate,
}

impl ReportingMode {
    pub fn label(&self) -> &'static str {
        match self {
            ReportingMode::PerDocument => "per-document",
            ReportingMode::Aggregate => "aggregate",
        }
    }

    pub fn csv_header(&self) -> &'static str {
        match self {
            ReportingMode::PerDocument => "ObjectCount,SizeInBytes,InsertionTime,RetrievalTime(ms)",
            ReportingMode::Aggregate => "ObjectCount,AvgSizeInBytes,RetrievalTime(ms)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub database: String,
    pub seed: SeedPair,
    /// Largest array size in the sweep.
    pub ceiling: usize,
    pub repetitions_per_size: usize,
    pub mode: ReportingMode,
    /// Time a read of each document after inserting it (per-document mode).
    pub read_back: bool,
    /// Write the measured retrieval time back onto the stored document.
    pub persist_retrieval_time: bool,
    pub delete_after_read: bool,
    /// Fresh collection for every sweep value instead of one for the run.
    pub collection_per_size: bool,
    /// Bulk reads timed per sweep value (aggregate mode).
    pub read_samples: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            seed: SeedPair::default(),
            ceiling: DEFAULT_CEILING,
            repetitions_per_size: 1,
            mode: ReportingMode::PerDocument,
            read_back: true,
            persist_retrieval_time: true,
            delete_after_read: false,
            collection_per_size: false,
            read_samples: 1,
        }
    }
}

impl RunnerConfig {
    /// 35 documents per size, each size in its own collection.
    pub fn aggregate() -> Self {
        Self {
            repetitions_per_size: AGGREGATE_DOCUMENTS_PER_SIZE,
            mode: ReportingMode::Aggregate,
            persist_retrieval_time: false,
            collection_per_size: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.repetitions_per_size == 0 {
            return Err(HarnessError::Config(
                "repetitions per size must be at least 1".into(),
            ));
        }
        if self.read_samples == 0 {
            return Err(HarnessError::Config("read samples must be at least 1".into()));
        }
        if self.database.is_empty() {
            return Err(HarnessError::Config("database name is empty".into()));
        }
        // a shared collection would fold every earlier size into each bulk read
        if self.mode == ReportingMode::Aggregate && !self.collection_per_size {
            return Err(HarnessError::Config(
                "aggregate mode needs one collection per size".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One document's round trip.
#[derive(Debug, Clone)]
pub struct DocumentRow {
    pub object_count: usize,
    /// Index of this document among the repetitions for `object_count`.
    pub repetition: usize,
    pub collection: String,
    pub id: ObjectId,
    pub size_in_bytes: usize,
    pub insertion_time: String,
    pub serialize: Duration,
    pub insert: Duration,
    /// `None` when read-back is disabled.
    pub retrieval: Option<Duration>,
}

/// Many documents of one size, read back in bulk.
#[derive(Debug, Clone)]
pub struct AggregateRow {
    pub object_count: usize,
    pub collection: String,
    pub documents: usize,
    pub total_size_bytes: u64,
    pub avg_size_in_bytes: f64,
    pub avg_serialize: Duration,
    pub avg_insert: Duration,
    /// Mean of the bulk read samples.
    pub retrieval: Duration,
    pub min_retrieval: Duration,
    pub max_retrieval: Duration,
    pub samples: usize,
}

#[derive(Debug, Clone)]
pub enum SweepRow {
    Document(DocumentRow),
    Aggregate(AggregateRow),
}

impl SweepRow {
    pub fn object_count(&self) -> usize {
        match self {
            SweepRow::Document(row) => row.object_count,
            SweepRow::Aggregate(row) => row.object_count,
        }
    }

    /// The line printed for this row, without the newline.
    pub fn csv_line(&self) -> String {
        match self {
            SweepRow::Document(row) => format!(
                "{},{},{},{:.3}",
                row.object_count,
                row.size_in_bytes,
                row.insertion_time,
                row.retrieval.map_or(0.0, duration_ms),
            ),
            SweepRow::Aggregate(row) => format!(
                "{},{:.2},{:.3}",
                row.object_count,
                row.avg_size_in_bytes,
                duration_ms(row.retrieval),
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SweepReport {
    pub mode: ReportingMode,
    pub sweep: Vec<usize>,
    pub rows: Vec<SweepRow>,
}

pub fn duration_ms(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}

/// `total / count`, or zero when nothing was counted.
pub fn mean_duration(total: Duration, count: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    total.div_f64(count as f64)
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

struct Inserted {
    doc: TestDocument,
    id: ObjectId,
    size: usize,
    serialize: Duration,
    insert: Duration,
}

pub struct Runner<'s, S, R, N> {
    store: &'s S,
    config: RunnerConfig,
    rng: R,
    namer: N,
}

impl<'s, S, R, N> Runner<'s, S, R, N>
where
    S: DocumentStore,
    R: Rng,
    N: CollectionNamer,
{
    pub fn new(store: &'s S, config: RunnerConfig, rng: R, namer: N) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            rng,
            namer,
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the whole sweep, writing the CSV header and one line per row to `out`.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<SweepReport> {
        let sweep = generate_sweep(self.config.ceiling, self.config.seed);
        info!(
            "sweeping {} sizes up to {} ({} mode, {} per size, store={})",
            sweep.len(),
            self.config.ceiling,
            self.config.mode.label(),
            self.config.repetitions_per_size,
            self.store.label(),
        );

        writeln!(out, "{}", self.config.mode.csv_header())?;

        let shared = if self.config.collection_per_size {
            None
        } else {
            Some(self.open_collection(None))
        };

        let mut opened = HashSet::new();
        let mut rows = Vec::new();
        for &n in &sweep {
            let per_size;
            let collection = match &shared {
                Some(c) => c,
                None => {
                    per_size = self.open_collection(Some(n));
                    if !opened.insert(per_size.name().to_string()) {
                        return Err(HarnessError::Config(format!(
                            "collection {} was already used earlier in this sweep",
                            per_size.name()
                        )));
                    }
                    &per_size
                }
            };

            match self.config.mode {
                ReportingMode::PerDocument => {
                    for repetition in 0..self.config.repetitions_per_size {
                        let row = SweepRow::Document(self.measure_document(
                            collection, n, repetition,
                        )?);
                        writeln!(out, "{}", row.csv_line())?;
                        rows.push(row);
                    }
                }
                ReportingMode::Aggregate => {
                    let row = SweepRow::Aggregate(self.measure_aggregate(collection, n)?);
                    writeln!(out, "{}", row.csv_line())?;
                    rows.push(row);
                }
            }
            out.flush()?;
        }

        info!("sweep complete: {} rows", rows.len());
        Ok(SweepReport {
            mode: self.config.mode,
            sweep,
            rows,
        })
    }

    fn open_collection(&mut self, object_count: Option<usize>) -> S::Collection {
        let name = self.namer.collection_name(object_count);
        info!("using collection {}.{}", self.config.database, name);
        self.store.collection(&self.config.database, &name)
    }

    /// Synthesize, size, stamp and insert one document of `n` objects.
    fn insert_document(&mut self, collection: &S::Collection, n: usize) -> Result<Inserted> {
        let started = Local::now();
        let mut doc = synthesize(n, &mut self.rng);

        let t = Instant::now();
        let size = document_size(&doc)?;
        let serialize = t.elapsed();
        doc.stamp(size, started.format(INSERTION_TIME_FORMAT).to_string());

        let t = Instant::now();
        let id = collection.insert(&doc)?;
        let insert = t.elapsed();
        doc.id = Some(id);

        debug!(
            "n={} id={} size={}B serialize={:?} insert={:?}",
            n, id, size, serialize, insert
        );
        Ok(Inserted {
            doc,
            id,
            size,
            serialize,
            insert,
        })
    }

    fn measure_document(
        &mut self,
        collection: &S::Collection,
        n: usize,
        repetition: usize,
    ) -> Result<DocumentRow> {
        let Inserted {
            doc,
            id,
            size,
            serialize,
            insert,
        } = self.insert_document(collection, n)?;

        let retrieval = if self.config.read_back {
            let t = Instant::now();
            let found = collection.find_one(id_filter(id))?;
            let elapsed = t.elapsed();
            if found.is_none() {
                return Err(HarnessError::Read(format!(
                    "document {} missing from {} after insert",
                    id,
                    collection.name()
                )));
            }
            debug!("n={} id={} retrieval={:?}", n, id, elapsed);

            if self.config.persist_retrieval_time {
                let millis = elapsed.as_millis() as i64;
                collection.update(id_filter(id), doc! { "$set": { "retrievalTime": millis } })?;
            }
            Some(elapsed)
        } else {
            None
        };

        if self.config.delete_after_read {
            collection.delete(id_filter(id))?;
        }

        Ok(DocumentRow {
            object_count: n,
            repetition,
            collection: collection.name().to_string(),
            id,
            size_in_bytes: size,
            insertion_time: doc.insertion_time,
            serialize,
            insert,
            retrieval,
        })
    }

    fn measure_aggregate(&mut self, collection: &S::Collection, n: usize) -> Result<AggregateRow> {
        let documents = self.config.repetitions_per_size;
        let mut ids = Vec::with_capacity(documents);
        let mut total_size = 0u64;
        let mut serialize_total = Duration::ZERO;
        let mut insert_total = Duration::ZERO;

        for _ in 0..documents {
            let inserted = self.insert_document(collection, n)?;
            total_size += inserted.size as u64;
            serialize_total += inserted.serialize;
            insert_total += inserted.insert;
            ids.push(inserted.id);
        }

        let mut samples = Vec::with_capacity(self.config.read_samples);
        for _ in 0..self.config.read_samples {
            let t = Instant::now();
            let found = collection.find(doc! {})?;
            samples.push(t.elapsed());
            if found.len() != documents {
                warn!(
                    "bulk read of {} returned {} documents, expected {}",
                    collection.name(),
                    found.len(),
                    documents
                );
            }
        }

        if self.config.delete_after_read {
            for id in ids {
                collection.delete(id_filter(id))?;
            }
        }

        let retrieval = mean_duration(samples.iter().sum(), samples.len());
        debug!(
            "n={} documents={} bulk retrieval={:?} over {} samples",
            n,
            documents,
            retrieval,
            samples.len()
        );

        Ok(AggregateRow {
            object_count: n,
            collection: collection.name().to_string(),
            documents,
            total_size_bytes: total_size,
            avg_size_in_bytes: total_size as f64 / documents as f64,
            avg_serialize: mean_duration(serialize_total, documents),
            avg_insert: mean_duration(insert_total, documents),
            retrieval,
            min_retrieval: samples.iter().copied().min().unwrap_or_default(),
            max_retrieval: samples.iter().copied().max().unwrap_or_default(),
            samples: samples.len(),
        })
    }
}
