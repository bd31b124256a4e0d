//! Pre-sized, slot-indexed storage for result records
//!
//! Completion order differs from arrival order under concurrent dispatch,
//! so records are written into the slot of their request id instead of
//! being appended. Each slot is written at most once; concurrent writers
//! never contend because no two executions share a request id.

use crate::request::RequestId;
use crate::response::ResultRecord;
use std::sync::OnceLock;

/// Store violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Request id outside the store
    #[error("request {id} is outside a store of {capacity} slots")]
    OutOfRange {
        /// Offending id
        id: RequestId,
        /// Store size
        capacity: usize,
    },

    /// Slot already holds a record
    #[error("request {0} already has a result")]
    AlreadyWritten(RequestId),

    /// Frozen before every slot was filled
    #[error("{missing} of {capacity} results are missing")]
    Incomplete {
        /// Empty slots
        missing: usize,
        /// Store size
        capacity: usize,
    },
}

/// One write-once slot per scheduled request
#[derive(Debug)]
pub struct MetricsStore {
    slots: Vec<OnceLock<ResultRecord>>,
}

impl MetricsStore {
    /// Create a store with one empty slot per request
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of filled slots
    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    /// Whether every slot holds a record
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| slot.get().is_some())
    }

    /// Write `record` into the slot of its request id
    pub fn insert(&self, record: ResultRecord) -> Result<(), StoreError> {
        let id = record.request_id;
        let slot = self.slots.get(id.index()).ok_or(StoreError::OutOfRange {
            id,
            capacity: self.slots.len(),
        })?;
        slot.set(record).map_err(|_| StoreError::AlreadyWritten(id))
    }

    /// Record for `id`, if written
    pub fn get(&self, id: RequestId) -> Option<&ResultRecord> {
        self.slots.get(id.index()).and_then(OnceLock::get)
    }

    /// Copy out all records in id order
    ///
    /// Fails unless every slot has been written.
    pub fn freeze(&self) -> Result<Vec<ResultRecord>, StoreError> {
        let records: Vec<ResultRecord> = self
            .slots
            .iter()
            .filter_map(|slot| slot.get().cloned())
            .collect();

        if records.len() != self.slots.len() {
            return Err(StoreError::Incomplete {
                missing: self.slots.len() - records.len(),
                capacity: self.slots.len(),
            });
        }
        Ok(records)
    }
}
