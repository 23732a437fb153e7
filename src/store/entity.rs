use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::error::StoreError;

/// Trait that any row type must implement to live in a store [`Table`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Ord + Hash + Send + Sync + Display + Debug + From<u64>;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Relation name used in log fields and error messages.
    const TABLE: &'static str;

    fn id(&self) -> Self::Id;

    /// Construct the full row from the allocated ID and the payload.
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, StoreError>;

    fn on_update(&mut self, _patch: Self::Patch) -> Result<(), StoreError> {
        Err(StoreError::Immutable(Self::TABLE))
    }

    /// Handle a row-specific action. Runs on a copy of the row; the copy only
    /// replaces the stored row when this returns `Ok`.
    fn handle_action(&mut self, _action: Self::Action) -> Result<Self::ActionResult, StoreError> {
        Err(StoreError::Immutable(Self::TABLE))
    }
}

/// One relation: rows keyed by a monotonically allocated ID.
///
/// IDs are never reused, even when the insert that consumed one is rolled back.
#[derive(Debug)]
pub struct Table<T: Entity> {
    rows: BTreeMap<T::Id, T>,
    next_id: u64,
}

impl<T: Entity> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Entity> Table<T> {
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.rows.get(&id)
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.rows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn insert(&mut self, params: T::CreateParams) -> Result<T::Id, StoreError> {
        let id = T::Id::from(self.next_id);
        self.next_id += 1;
        let row = T::from_create_params(id, params)?;
        self.rows.insert(id, row);
        Ok(id)
    }

    /// Applies `patch`, returning the row as it was before and after.
    pub fn update(
        &mut self,
        id: T::Id,
        patch: T::Patch,
        missing: impl FnOnce(T::Id) -> StoreError,
    ) -> Result<(T, T), StoreError> {
        let before = self.rows.get(&id).cloned().ok_or_else(|| missing(id))?;
        let mut after = before.clone();
        after.on_update(patch)?;
        self.rows.insert(id, after.clone());
        Ok((before, after))
    }

    /// Runs `action` against the row, returning the previous row and the result.
    pub fn act(
        &mut self,
        id: T::Id,
        action: T::Action,
        missing: impl FnOnce(T::Id) -> StoreError,
    ) -> Result<(T, T::ActionResult), StoreError> {
        let before = self.rows.get(&id).cloned().ok_or_else(|| missing(id))?;
        let mut after = before.clone();
        let result = after.handle_action(action)?;
        self.rows.insert(id, after);
        Ok((before, result))
    }

    pub(crate) fn restore(&mut self, row: T) {
        self.rows.insert(row.id(), row);
    }

    pub(crate) fn remove(&mut self, id: T::Id) {
        self.rows.remove(&id);
    }
}
