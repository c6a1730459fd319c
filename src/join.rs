use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::model::{DescriptionRecord, RawRecord};

/// Lookup from product identifier to the first description carrying it.
///
/// Identifiers are compared exactly. When several descriptions share an
/// identifier, the one earliest in file order wins and later duplicates are
/// ignored.
#[derive(Debug, Default)]
pub struct DescriptionIndex<'a> {
    by_id: HashMap<&'a str, &'a DescriptionRecord>,
    duplicates: usize,
}

impl<'a> DescriptionIndex<'a> {
    pub fn build(descriptions: &'a [DescriptionRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(descriptions.len());
        let mut duplicates = 0;
        for record in descriptions {
            match by_id.entry(record.product_id.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(_) => duplicates += 1,
            }
        }
        Self { by_id, duplicates }
    }

    pub fn lookup(&self, product_id: &str) -> Option<&'a DescriptionRecord> {
        self.by_id.get(product_id).copied()
    }

    /// Number of description rows shadowed by an earlier row with the same
    /// identifier.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Pairs every markup record with its description, keeping the order of
/// `raw`. Records without a counterpart are left out.
pub fn join<'a>(
    raw: &'a [RawRecord],
    descriptions: &'a [DescriptionRecord],
) -> Vec<(&'a RawRecord, &'a DescriptionRecord)> {
    let index = DescriptionIndex::build(descriptions);
    raw.iter()
        .filter_map(|record| {
            index
                .lookup(&record.product_id)
                .map(|description| (record, description))
        })
        .collect()
}
