// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dataset metadata returned by the server
//!
//! Everything here is immutable once decoded.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::sync::Arc;

/// Immutable ordered sequence with checked positional access
#[derive(Debug, PartialEq, Deserialize)]
#[serde(from = "Vec<T>")]
pub struct MetadataList<T> {
    items: Arc<[T]>,
}

impl<T> MetadataList<T> {
    /// Item at `index`, or [`Error::IndexOutOfRange`]
    pub fn at(&self, index: usize) -> Result<&T> {
        self.items.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Clone for MetadataList<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> From<Vec<T>> for MetadataList<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items: items.into(),
        }
    }
}

impl<'a, T> IntoIterator for &'a MetadataList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One downloadable dataset (e.g. a ward of a prefecture)
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DatasetMetadata {
    /// Server-side identifier
    pub id: String,
    /// Display title
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Highest level of detail available
    #[serde(default)]
    pub max_lod: u32,
    /// Feature types present, e.g. "bldg", "tran"
    #[serde(default)]
    pub feature_types: Vec<String>,
}

/// A named group of datasets (e.g. a prefecture)
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DatasetMetadataGroup {
    /// Server-side identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Datasets in this group
    #[serde(rename = "data", default = "empty_list")]
    pub datasets: MetadataList<DatasetMetadata>,
}

fn empty_list<T>() -> MetadataList<T> {
    MetadataList::from(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_is_stable_and_checked() {
        let list = MetadataList::from(vec!["東京都", "大阪府"]);
        assert_eq!(list.at(1).unwrap(), &"大阪府");
        assert!(std::ptr::eq(list.at(0).unwrap(), list.at(0).unwrap()));
        assert!(matches!(
            list.at(2),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_clone_shares_items() {
        let list = MetadataList::from(vec![1, 2, 3]);
        let copy = list.clone();
        assert!(std::ptr::eq(list.at(2).unwrap(), copy.at(2).unwrap()));
        assert_eq!(copy.iter().sum::<i32>(), 6);
    }
}
