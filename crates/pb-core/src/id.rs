use lasso::{Spur, ThreadedRodeo};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Process-wide interner backing every `NodeId`.
///
/// Every id string ever seen by the process lands here, including ids read
/// back from clipboard payloads or stored documents. `NodeId::generate`
/// consults it so a fresh id never repeats one already in circulation.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 5;

/// A lightweight, interned identifier for component nodes.
/// Internally a 4-byte `Spur`, so copies and comparisons are O(1).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Spur);

impl NodeId {
    /// Intern a string as a NodeId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a fresh node id of the form `el-<time>-<random>`.
    ///
    /// The time part is base-36 milliseconds, the suffix is five random
    /// base-36 characters. Candidates already known to the interner are
    /// skipped, so a generated id is never handed out twice and never
    /// matches an id that was loaded from outside.
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let prefix = to_base36(millis);
        let mut rng = rand::thread_rng();
        loop {
            let suffix: String = (0..SUFFIX_LEN)
                .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
                .collect();
            let candidate = format!("el-{prefix}-{suffix}");
            if !INTERNER.contains(&candidate) {
                return Self::intern(&candidate);
            }
            log::trace!("id candidate {candidate} already interned, retrying");
        }
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(SUFFIX_ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId::intern(s)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("hero_title");
        let b = NodeId::intern("hero_title");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hero_title");
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<NodeId> = (0..2_000).map(|_| NodeId::generate()).collect();
        assert_eq!(ids.len(), 2_000);
    }

    #[test]
    fn generated_id_shape() {
        let id = NodeId::generate();
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "el");
        assert_eq!(parts[2].len(), SUFFIX_LEN);
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
