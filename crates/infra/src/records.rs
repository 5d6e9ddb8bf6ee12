use std::collections::BTreeMap;
use std::sync::RwLock;

use fieldtrack_core::Entity;

struct Table<T: Entity> {
    rows: BTreeMap<T::Id, T>,
    last_id: i64,
}

/// In-memory record table with store-assigned integer ids.
///
/// Used for the passive stores (customers, jobs, materials). Ids increase
/// monotonically and are never reused after a removal.
pub struct InMemoryRecords<T: Entity> {
    inner: RwLock<Table<T>>,
}

impl<T> InMemoryRecords<T>
where
    T: Entity + Clone,
    T::Id: From<i64>,
{
    pub fn new() -> Self {
        Self::starting_after(0)
    }

    /// Empty table whose first assigned id is `last_id + 1`.
    pub fn starting_after(last_id: i64) -> Self {
        Self {
            inner: RwLock::new(Table {
                rows: BTreeMap::new(),
                last_id: last_id.max(0),
            }),
        }
    }

    /// Assign the next id and store the record built from it.
    pub fn insert_with(&self, build: impl FnOnce(T::Id) -> T) -> T {
        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        table.last_id += 1;
        let id = T::Id::from(table.last_id);
        let record = build(id);
        table.rows.insert(id, record.clone());
        record
    }

    pub fn get(&self, id: &T::Id) -> Option<T> {
        let table = self.inner.read().unwrap_or_else(|e| e.into_inner());
        table.rows.get(id).cloned()
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        let table = self.inner.read().unwrap_or_else(|e| e.into_inner());
        table.rows.contains_key(id)
    }

    /// All records in id order.
    pub fn list(&self) -> Vec<T> {
        let table = self.inner.read().unwrap_or_else(|e| e.into_inner());
        table.rows.values().cloned().collect()
    }

    /// Mutate a record in place; returns the updated copy.
    pub fn update(&self, id: &T::Id, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let record = table.rows.get_mut(id)?;
        f(record);
        Some(record.clone())
    }

    pub fn remove(&self, id: &T::Id) -> Option<T> {
        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        table.rows.remove(id)
    }

    /// Remove every record matching `pred`; returns how many were removed.
    pub fn remove_where(&self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let mut table = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let before = table.rows.len();
        table.rows.retain(|_, record| !pred(record));
        before - table.rows.len()
    }
}

impl<T> Default for InMemoryRecords<T>
where
    T: Entity + Clone,
    T::Id: From<i64>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> std::fmt::Debug for InMemoryRecords<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRecords").finish_non_exhaustive()
    }
}
