//! Per-unit result records and the append-only collection that holds them.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sweep::SweepParameter;

/// The outcome of executing one [`SweepParameter`].
///
/// The echoed inputs and the timing are typed; everything else a backend
/// wants to keep (circuit text, raw counts, method, ...) lives in `fields`,
/// which is flattened into the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub n_qbits: u32,
    pub depth: u32,
    pub replica: u32,
    /// Wall-clock execution time in seconds
    pub time_taken: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_memory_bytes: Option<u64>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl ResultRecord {
    pub fn new(parameter: SweepParameter, time_taken: f64) -> Self {
        Self {
            n_qbits: parameter.n_qbits,
            depth: parameter.depth,
            replica: parameter.replica,
            time_taken,
            peak_memory_bytes: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_memory(mut self, bytes: Option<u64>) -> Self {
        self.peak_memory_bytes = bytes;
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The parameter this record was produced from.
    pub fn key(&self) -> SweepParameter {
        SweepParameter::new(self.n_qbits, self.depth, self.replica)
    }
}

/// Ordered, append-only sequence of records with at most one record per key.
///
/// Serializes as a plain JSON array of records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ResultRecord>", into = "Vec<ResultRecord>")]
pub struct ResultCollection {
    records: Vec<ResultRecord>,
    keys: HashSet<SweepParameter>,
    dropped_duplicates: usize,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from records, keeping the first record seen for each key.
    pub fn from_records(records: impl IntoIterator<Item = ResultRecord>) -> Self {
        let mut collection = Self::new();
        for record in records {
            if !collection.push(record) {
                collection.dropped_duplicates += 1;
            }
        }
        collection
    }

    /// Append a record. Returns `false` (and leaves the collection unchanged)
    /// if a record with the same key is already present.
    pub fn push(&mut self, record: ResultRecord) -> bool {
        if !self.keys.insert(record.key()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains(&self, parameter: &SweepParameter) -> bool {
        self.keys.contains(parameter)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultRecord> {
        self.records.iter()
    }

    /// Number of duplicate records discarded while building this collection.
    pub fn dropped_duplicates(&self) -> usize {
        self.dropped_duplicates
    }
}

impl PartialEq for ResultCollection {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl From<Vec<ResultRecord>> for ResultCollection {
    fn from(records: Vec<ResultRecord>) -> Self {
        Self::from_records(records)
    }
}

impl From<ResultCollection> for Vec<ResultRecord> {
    fn from(collection: ResultCollection) -> Self {
        collection.records
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a ResultRecord;
    type IntoIter = std::slice::Iter<'a, ResultRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
