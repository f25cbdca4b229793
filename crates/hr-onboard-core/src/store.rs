//! Document store: sled-backed collections with unique-key enforcement.
//!
//! Each collection is one sled tree keyed by the document's primary key (JSON values).
//! Every unique field gets its own index tree `"{collection}.unique.{field}"` mapping the
//! field value to the owning primary key. All writes touching a document and its index
//! entries run in a single sled transaction, so a constraint violation never leaves a
//! half-written document behind.

use serde::{de::DeserializeOwned, Serialize};
use sled::transaction::{
    ConflictableTransactionError, TransactionError, TransactionResult, TransactionalTree,
};
use sled::Transactional;
use std::marker::PhantomData;
use std::path::Path;

pub const DEFAULT_STORE_PATH: &str = "./data/hr_onboard";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage: {0}")]
    Sled(#[from] sled::Error),

    #[error("document codec: {0}")]
    Codec(#[from] serde_json::Error),

    /// A primary key or unique index already holds `value`.
    #[error("unique constraint violated on {field} ({value})")]
    ConstraintViolation { field: &'static str, value: String },

    #[error("no unique index on field '{0}'")]
    UnknownIndex(String),
}

/// A type that can live in a [`Collection`].
///
/// `key()` must be stable for the lifetime of the document; update patches never change it.
pub trait Document: Serialize + DeserializeOwned + Clone {
    /// Tree name.
    const COLLECTION: &'static str;
    /// Name reported in violations of the primary key.
    const KEY_FIELD: &'static str;
    /// Fields backed by a unique index.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    fn key(&self) -> String;

    /// Index value for one of `UNIQUE_FIELDS`; `None` means "not indexed for this document".
    fn unique_value(&self, _field: &str) -> Option<String> {
        None
    }
}

/// Explicitly constructed store handle, injected into the services that need it.
pub struct DocumentStore {
    db: sled::Db,
}

impl DocumentStore {
    /// Open (or create) the store at `path`.
    pub fn connect(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        tracing::info!("Document store connected at {}", path.display());
        Ok(Self { db })
    }

    /// Store rooted at [`DEFAULT_STORE_PATH`].
    pub fn connect_default() -> Result<Self, StoreError> {
        Self::connect(DEFAULT_STORE_PATH)
    }

    /// Throwaway store removed on drop. Used by tests and dry runs.
    pub fn connect_temporary() -> Result<Self, StoreError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Open the collection for `T`, creating its trees on first use.
    pub fn collection<T: Document>(&self) -> Result<Collection<T>, StoreError> {
        Collection::open(&self.db)
    }

    /// Flush pending writes. The handle stays usable; sled closes files on drop.
    pub fn close(&self) -> Result<(), StoreError> {
        let flushed = self.db.flush()?;
        tracing::info!("Document store flushed ({} bytes)", flushed);
        Ok(())
    }
}

/// Typed view over one collection tree and its unique indexes.
pub struct Collection<T> {
    primary: sled::Tree,
    indexes: Vec<(&'static str, sled::Tree)>,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            primary: self.primary.clone(),
            indexes: self.indexes.clone(),
            _doc: PhantomData,
        }
    }
}

fn abort(err: impl Into<StoreError>) -> ConflictableTransactionError<StoreError> {
    ConflictableTransactionError::Abort(err.into())
}

fn flatten(err: TransactionError<StoreError>) -> StoreError {
    match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => StoreError::Sled(e),
    }
}

impl<T: Document> Collection<T> {
    fn open(db: &sled::Db) -> Result<Self, StoreError> {
        let primary = db.open_tree(T::COLLECTION)?;
        let mut indexes = Vec::with_capacity(T::UNIQUE_FIELDS.len());
        for field in T::UNIQUE_FIELDS {
            let tree = db.open_tree(format!("{}.unique.{}", T::COLLECTION, field))?;
            indexes.push((*field, tree));
        }
        Ok(Self {
            primary,
            indexes,
            _doc: PhantomData,
        })
    }

    fn trees(&self) -> Vec<sled::Tree> {
        let mut trees = Vec::with_capacity(1 + self.indexes.len());
        trees.push(self.primary.clone());
        trees.extend(self.indexes.iter().map(|(_, tree)| tree.clone()));
        trees
    }

    fn decode(raw: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Insert a new document. Fails with `ConstraintViolation` when the primary key or any
    /// unique value is already taken.
    pub fn insert_one(&self, doc: &T) -> Result<(), StoreError> {
        let key = doc.key();
        let bytes = serde_json::to_vec(doc)?;
        let unique: Vec<Option<String>> = self
            .indexes
            .iter()
            .map(|(field, _)| doc.unique_value(field))
            .collect();

        let trees = self.trees();
        let result: TransactionResult<(), StoreError> =
            trees.as_slice().transaction(|views: &Vec<TransactionalTree>| {
                let primary = &views[0];
                if primary.get(key.as_bytes())?.is_some() {
                    return Err(abort(StoreError::ConstraintViolation {
                        field: T::KEY_FIELD,
                        value: key.clone(),
                    }));
                }
                for ((field, _), (view, value)) in
                    self.indexes.iter().zip(views[1..].iter().zip(&unique))
                {
                    if let Some(value) = value {
                        if view.get(value.as_bytes())?.is_some() {
                            return Err(abort(StoreError::ConstraintViolation {
                                field: *field,
                                value: value.clone(),
                            }));
                        }
                        view.insert(value.as_bytes(), key.as_bytes())?;
                    }
                }
                primary.insert(key.as_bytes(), bytes.as_slice())?;
                Ok(())
            });
        result.map_err(flatten)
    }

    /// Fetch by primary key.
    pub fn find_one(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.primary.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::decode(&raw)?)),
            None => Ok(None),
        }
    }

    /// Fetch by the primary key field or any unique field.
    pub fn find_one_by(&self, field: &str, value: &str) -> Result<Option<T>, StoreError> {
        if field == T::KEY_FIELD {
            return self.find_one(value);
        }
        let (_, index) = self
            .indexes
            .iter()
            .find(|(name, _)| *name == field)
            .ok_or_else(|| StoreError::UnknownIndex(field.to_string()))?;
        match index.get(value.as_bytes())? {
            Some(owner) => {
                let key = String::from_utf8_lossy(&owner).into_owned();
                self.find_one(&key)
            }
            None => Ok(None),
        }
    }

    /// Every document matching `filter`, in primary key order.
    pub fn find(&self, filter: impl Fn(&T) -> bool) -> Result<Vec<T>, StoreError> {
        let mut out = Vec::new();
        for entry in self.primary.iter() {
            let (_, raw) = entry?;
            let doc = Self::decode(&raw)?;
            if filter(&doc) {
                out.push(doc);
            }
        }
        Ok(out)
    }

    /// `find` followed by an ascending sort on `sort_key`.
    pub fn find_sorted<K: Ord>(
        &self,
        filter: impl Fn(&T) -> bool,
        sort_key: impl Fn(&T) -> K,
    ) -> Result<Vec<T>, StoreError> {
        let mut docs = self.find(filter)?;
        docs.sort_by_key(|d| sort_key(d));
        Ok(docs)
    }

    /// Apply `patch` to the stored document. Unique indexes are re-checked only for fields
    /// whose value the patch actually changed. Returns `None` when `key` is absent.
    pub fn update_one(&self, key: &str, patch: impl Fn(&mut T)) -> Result<Option<T>, StoreError> {
        let trees = self.trees();
        let result: TransactionResult<Option<T>, StoreError> =
            trees.as_slice().transaction(|views: &Vec<TransactionalTree>| {
                let primary = &views[0];
                let Some(raw) = primary.get(key.as_bytes())? else {
                    return Ok(None);
                };
                let current = Self::decode(&raw).map_err(abort)?;
                let mut next = current.clone();
                patch(&mut next);

                for ((field, _), view) in self.indexes.iter().zip(views[1..].iter()) {
                    let old = current.unique_value(field);
                    let new = next.unique_value(field);
                    if old == new {
                        continue;
                    }
                    if let Some(value) = &new {
                        if let Some(owner) = view.get(value.as_bytes())? {
                            if owner.as_ref() != key.as_bytes() {
                                return Err(abort(StoreError::ConstraintViolation {
                                    field: *field,
                                    value: value.clone(),
                                }));
                            }
                        }
                    }
                    if let Some(value) = &old {
                        view.remove(value.as_bytes())?;
                    }
                    if let Some(value) = &new {
                        view.insert(value.as_bytes(), key.as_bytes())?;
                    }
                }

                let bytes = serde_json::to_vec(&next).map_err(abort)?;
                primary.insert(key.as_bytes(), bytes)?;
                Ok(Some(next))
            });
        result.map_err(flatten)
    }

    /// Remove by primary key, releasing its unique values. Returns the removed document.
    pub fn delete_one(&self, key: &str) -> Result<Option<T>, StoreError> {
        let trees = self.trees();
        let result: TransactionResult<Option<T>, StoreError> =
            trees.as_slice().transaction(|views: &Vec<TransactionalTree>| {
                let primary = &views[0];
                let Some(raw) = primary.remove(key.as_bytes())? else {
                    return Ok(None);
                };
                let doc = Self::decode(&raw).map_err(abort)?;
                for ((field, _), view) in self.indexes.iter().zip(views[1..].iter()) {
                    if let Some(value) = doc.unique_value(field) {
                        let owned = view
                            .get(value.as_bytes())?
                            .map(|owner| owner.as_ref() == key.as_bytes())
                            .unwrap_or(false);
                        if owned {
                            view.remove(value.as_bytes())?;
                        }
                    }
                }
                Ok(Some(doc))
            });
        result.map_err(flatten)
    }

    pub fn count(&self) -> usize {
        self.primary.len()
    }
}
