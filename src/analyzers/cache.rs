use std::cell::RefCell;
use std::collections::HashMap;

use chrono::Weekday;
use tracing::debug;

use crate::analyzers::aggregate::SamplePolicy;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    TripTime,
    InterStopTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub operation: Operation,
    pub headsign: String,
    pub day: Weekday,
    pub per_service: usize,
    pub policy: SamplePolicy,
}

/// Memoized sample queries. The reference data never changes during a
/// session, so entries never expire.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: RefCell<HashMap<QueryKey, Vec<f64>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_try_insert_with<F>(&self, key: QueryKey, compute: F) -> Result<Vec<f64>>
    where
        F: FnOnce() -> Result<Vec<f64>>,
    {
        if let Some(values) = self.entries.borrow().get(&key) {
            debug!(?key, "Query cache hit");
            return Ok(values.clone());
        }

        let values = compute()?;
        self.entries.borrow_mut().insert(key, values.clone());
        Ok(values)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    fn key(headsign: &str) -> QueryKey {
        QueryKey {
            operation: Operation::TripTime,
            headsign: headsign.to_string(),
            day: Weekday::Mon,
            per_service: 5,
            policy: SamplePolicy::TableOrder,
        }
    }

    #[test]
    fn test_computes_once_per_key() {
        let cache = QueryCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok(vec![1.0, 2.0])
        };

        assert_eq!(cache.get_or_try_insert_with(key("A"), compute).unwrap(), vec![1.0, 2.0]);
        assert_eq!(cache.get_or_try_insert_with(key("A"), compute).unwrap(), vec![1.0, 2.0]);
        assert_eq!(calls.get(), 1);

        cache.get_or_try_insert_with(key("B"), compute).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = QueryCache::new();
        assert!(cache
            .get_or_try_insert_with(key("A"), || Err(Error::EmptyTrip))
            .is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_try_insert_with(key("A"), || Ok(vec![3.0])).unwrap(), vec![3.0]);
    }
}
