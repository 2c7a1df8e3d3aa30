//! Deduplication of records sharing a model id
//!
//! A complete record (both prices present) is never displaced. A complete
//! candidate displaces a partial one. Two partial records are combined
//! field by field.

use std::collections::HashMap;

use crate::record::PriceRecord;

/// Combine two records known to share a `model_id`
pub fn merge(existing: PriceRecord, candidate: PriceRecord) -> PriceRecord {
    if existing.is_complete() {
        return existing;
    }
    if candidate.is_complete() {
        return candidate;
    }

    let mut merged = existing;
    if !merged.has_input() {
        merged.input_price_per_mtok = candidate.input_price_per_mtok;
        merged.original_input_price = candidate.original_input_price;
    }
    if !merged.has_output() {
        merged.output_price_per_mtok = candidate.output_price_per_mtok;
        merged.original_output_price = candidate.original_output_price;
    }
    merged
}

/// Accumulates records keyed by `model_id`, keeping first-seen order
#[derive(Debug, Default)]
pub struct RecordMerger {
    order: Vec<String>,
    records: HashMap<String, PriceRecord>,
}

impl RecordMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a candidate or merge it into the record with the same id
    pub fn offer(&mut self, candidate: PriceRecord) {
        match self.records.remove(&candidate.model_id) {
            Some(existing) => {
                let merged = merge(existing, candidate);
                self.records.insert(merged.model_id.clone(), merged);
            }
            None => {
                self.order.push(candidate.model_id.clone());
                self.records.insert(candidate.model_id.clone(), candidate);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Final records in first-seen order, zero-priced entries dropped
    pub fn into_records(mut self) -> Vec<PriceRecord> {
        self.order
            .iter()
            .filter_map(|id| self.records.remove(id))
            .filter(|r| !r.is_empty())
            .collect()
    }
}

impl Extend<PriceRecord> for RecordMerger {
    fn extend<I: IntoIterator<Item = PriceRecord>>(&mut self, iter: I) {
        for record in iter {
            self.offer(record);
        }
    }
}
