//! Tri-state field value used by update payloads

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single field of a sparse update.
///
/// When deserialized inside a struct marked `#[serde(default)]`, an absent
/// key becomes [`Patch::Unchanged`], an explicit `null` becomes
/// [`Patch::Clear`] and any other value becomes [`Patch::Set`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Leave the column untouched
    #[default]
    Unchanged,
    /// Write the given value
    Set(T),
    /// Write NULL
    Clear,
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    pub fn is_clear(&self) -> bool {
        matches!(self, Patch::Clear)
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| value.map_or(Patch::Clear, Patch::Set))
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Set(value) => serializer.serialize_some(value),
            Patch::Unchanged | Patch::Clear => serializer.serialize_none(),
        }
    }
}

/// Reject [`Patch::Clear`] on a column that cannot hold NULL.
pub(crate) fn require_not_cleared<T>(field: &str, patch: &Patch<T>) -> Result<(), String> {
    if patch.is_clear() {
        return Err(format!("{} cannot be null", field));
    }
    Ok(())
}
