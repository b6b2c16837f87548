//! JSON-array collection codec bound to one storage key.

use crate::kv::{BackingError, KeyValueBacking};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for collection load/save operations.
#[derive(Debug)]
pub enum RepoError {
    Backing(BackingError),
    /// Stored value exists but is not a valid collection.
    Corrupt { key: &'static str, message: String },
    Encode(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backing(err) => write!(f, "{err}"),
            Self::Corrupt { key, message } => {
                write!(f, "corrupt collection under `{key}`: {message}")
            }
            Self::Encode(err) => write!(f, "failed to encode collection: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backing(err) => Some(err),
            Self::Corrupt { .. } => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<BackingError> for RepoError {
    fn from(value: BackingError) -> Self {
        Self::Backing(value)
    }
}

/// Whole-collection codec for records of type `T` under `key`.
#[derive(Debug, Clone, Copy)]
pub struct JsonCollection<T> {
    key: &'static str,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _records: PhantomData,
        }
    }

    /// Reads the collection.
    ///
    /// Returns `Ok(None)` when nothing (or an empty string) is stored.
    pub fn load(&self, backing: &impl KeyValueBacking) -> RepoResult<Option<Vec<T>>> {
        let Some(raw) = backing.get(self.key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let items = serde_json::from_str::<Vec<T>>(&raw).map_err(|err| RepoError::Corrupt {
            key: self.key,
            message: err.to_string(),
        })?;
        debug!(
            "event=collection_load module=repo status=ok key={} count={}",
            self.key,
            items.len()
        );
        Ok(Some(items))
    }

    /// Replaces the stored collection with `items`.
    pub fn save(&self, backing: &impl KeyValueBacking, items: &[T]) -> RepoResult<()> {
        let raw = serde_json::to_string(items).map_err(RepoError::Encode)?;
        backing.set(self.key, &raw)?;
        debug!(
            "event=collection_save module=repo status=ok key={} count={} bytes={}",
            self.key,
            items.len(),
            raw.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonCollection, RepoError};
    use crate::kv::{KeyValueBacking, SqliteKvBacking};

    const NUMBERS: JsonCollection<u32> = JsonCollection::new("@numbers");

    #[test]
    fn missing_and_empty_values_load_as_none() {
        let backing = SqliteKvBacking::open_in_memory().unwrap();
        assert!(NUMBERS.load(&backing).unwrap().is_none());

        backing.set("@numbers", "").unwrap();
        assert!(NUMBERS.load(&backing).unwrap().is_none());
    }

    #[test]
    fn unparseable_value_is_corrupt() {
        let backing = SqliteKvBacking::open_in_memory().unwrap();
        backing.set("@numbers", "{not json").unwrap();

        let err = NUMBERS.load(&backing).unwrap_err();
        assert!(matches!(err, RepoError::Corrupt { key: "@numbers", .. }));
    }

    #[test]
    fn save_writes_a_json_array() {
        let backing = SqliteKvBacking::open_in_memory().unwrap();
        NUMBERS.save(&backing, &[3, 1, 2]).unwrap();

        assert_eq!(backing.get("@numbers").unwrap().as_deref(), Some("[3,1,2]"));
        assert_eq!(NUMBERS.load(&backing).unwrap(), Some(vec![3, 1, 2]));
    }
}
