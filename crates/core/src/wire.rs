//! Serde helpers for request arguments.

use serde::{Deserialize, Deserializer};

/// Decode an optional wire name where `""` and `null` both mean "not given".
///
/// Any other string goes through `T::from`, so unrecognized names still
/// reach the enum's `Unknown` variant.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: for<'a> From<&'a str>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(|s| T::from(s.as_str())))
}
