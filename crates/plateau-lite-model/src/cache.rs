// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Populate-once cell used for lazily enumerated children

use crate::CacheState;
use once_cell::sync::OnceCell;

/// A value that goes from unpopulated to populated exactly once
///
/// A failed populate attempt leaves the cell unpopulated, so the next
/// access retries the query.
#[derive(Clone, Debug)]
pub struct PopulateOnce<T> {
    cell: OnceCell<T>,
}

impl<T> PopulateOnce<T> {
    /// Create an unpopulated cell
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Current populate state
    pub fn state(&self) -> CacheState {
        if self.cell.get().is_some() {
            CacheState::Populated
        } else {
            CacheState::Unpopulated
        }
    }

    /// The populated value, if any
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Return the cached value, running `populate` if the cell is still empty
    pub fn get_or_try_populate<E>(
        &self,
        populate: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        self.cell.get_or_try_init(populate)
    }
}

impl<T> Default for PopulateOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_populate_can_retry() {
        let cell: PopulateOnce<Vec<u32>> = PopulateOnce::new();
        assert_eq!(cell.state(), CacheState::Unpopulated);

        let failed: Result<&Vec<u32>, &str> = cell.get_or_try_populate(|| Err("boom"));
        assert!(failed.is_err());
        assert_eq!(cell.state(), CacheState::Unpopulated);

        let value = cell.get_or_try_populate::<&str>(|| Ok(vec![1, 2])).unwrap();
        assert_eq!(value, &vec![1, 2]);
        assert_eq!(cell.state(), CacheState::Populated);

        // Populated cells never run the closure again
        let again = cell
            .get_or_try_populate::<&str>(|| panic!("populated twice"))
            .unwrap();
        assert!(std::ptr::eq(value, again));
    }
}
