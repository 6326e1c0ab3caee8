//! LogId - Cheap-to-clone log identifier
//!
//! Uses Arc<str> internally for O(1) clone operations. Ordering is plain
//! lexicographic string order, which the matcher relies on as its final
//! tie-break.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// Log file identifier with cheap cloning.
///
/// Match results, skipped-log reports and metrics labels all carry the id,
/// so clones only bump a reference count.
///
/// # Examples
/// ```
/// use contracts::LogId;
///
/// let id: LogId = "2024-05-01-ride.fit".into();
/// let id2 = id.clone();
/// assert_eq!(id, id2);
/// assert!(id < LogId::from("2024-05-02-ride.fit"));
/// ```
#[derive(Clone, Default)]
pub struct LogId(Arc<str>);

impl LogId {
    #[inline]
    pub fn new(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Identifier for a file on disk (its displayed path)
    pub fn from_path(path: &Path) -> Self {
        Self::from(path.display().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for LogId {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for LogId {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for LogId {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LogId {
    #[inline]
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl From<String> for LogId {
    #[inline]
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogId({:?})", self.0)
    }
}

impl PartialEq for LogId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for LogId {}

impl PartialEq<str> for LogId {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for LogId {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl PartialOrd for LogId {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LogId {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_ref().cmp(other.0.as_ref())
    }
}

// Must agree with Borrow<str>
impl Hash for LogId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_ref().hash(state)
    }
}

impl Serialize for LogId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LogId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut ids: Vec<LogId> = vec!["b.fit".into(), "a.fit".into(), "a.FIT".into()];
        ids.sort();
        let names: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
        assert_eq!(names, vec!["a.FIT", "a.fit", "b.fit"]);
    }

    #[test]
    fn test_hashmap_lookup_by_str() {
        let mut map: HashMap<LogId, u32> = HashMap::new();
        map.insert("ride.fit".into(), 3);
        assert_eq!(map.get("ride.fit"), Some(&3));
    }

    #[test]
    fn test_from_path() {
        let id = LogId::from_path(Path::new("/logs/ride.fit"));
        assert_eq!(id, "/logs/ride.fit");
    }

    #[test]
    fn test_serde_as_plain_string() {
        let id = LogId::new("ride.fit");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"ride.fit\"");
        let parsed: LogId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
