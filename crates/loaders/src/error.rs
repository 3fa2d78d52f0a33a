use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A key was part of a batch but the store had no row for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError<K> {
    pub key: K,
    /// Caller-supplied name of the value type, for messages only.
    pub expected_type: &'static str,
}

impl<K: fmt::Display> fmt::Display for NotFoundError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} not found: {}", self.expected_type, self.key)
    }
}

impl<K: fmt::Debug + fmt::Display> Error for NotFoundError<K> {}

/// Outcome of a failed [`BatchLoader::get`](crate::BatchLoader::get).
#[derive(Debug)]
pub enum LoadError<K, E> {
    /// The batch succeeded but had no value for this key.
    NotFound(NotFoundError<K>),

    /// The whole batch failed. Every caller coalesced into that batch
    /// receives the same shared error.
    Batch(Arc<E>),

    /// The batch was dropped before it answered, e.g. the runtime shut down.
    Abandoned,
}

impl<K: Clone, E> Clone for LoadError<K, E> {
    fn clone(&self) -> Self {
        match self {
            Self::NotFound(err) => Self::NotFound(err.clone()),
            Self::Batch(err) => Self::Batch(Arc::clone(err)),
            Self::Abandoned => Self::Abandoned,
        }
    }
}

impl<K: fmt::Display, E: fmt::Display> fmt::Display for LoadError<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(err) => fmt::Display::fmt(err, f),
            Self::Batch(err) => write!(f, "batch load failed: {err}"),
            Self::Abandoned => f.write_str("batch was dropped before it resolved"),
        }
    }
}

impl<K, E> Error for LoadError<K, E>
where
    K: fmt::Debug + fmt::Display + 'static,
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(err) => Some(err),
            Self::Batch(err) => Some(err.as_ref()),
            Self::Abandoned => None,
        }
    }
}

impl<K, E> LoadError<K, E> {
    /// The key when this is a not-found outcome.
    pub fn not_found_key(&self) -> Option<&K> {
        match self {
            Self::NotFound(err) => Some(&err.key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct StoreDown;

    impl fmt::Display for StoreDown {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("store down")
        }
    }

    impl Error for StoreDown {}

    #[test]
    fn not_found_message_names_type_and_key() {
        let err: LoadError<String, StoreDown> = LoadError::NotFound(NotFoundError {
            key: "Unknown".to_string(),
            expected_type: "Character",
        });
        assert_eq!(err.to_string(), "Character not found: Unknown");
        assert_eq!(err.not_found_key().map(String::as_str), Some("Unknown"));
    }

    #[test]
    fn batch_error_exposes_source_and_shares_it() {
        let err: LoadError<String, StoreDown> = LoadError::Batch(Arc::new(StoreDown));
        assert_eq!(err.to_string(), "batch load failed: store down");
        assert_eq!(err.source().map(|s| s.to_string()), Some("store down".to_string()));

        let (LoadError::Batch(a), LoadError::Batch(b)) = (&err, &err.clone()) else {
            panic!("clone changed the variant");
        };
        assert!(Arc::ptr_eq(a, b));
    }
}
