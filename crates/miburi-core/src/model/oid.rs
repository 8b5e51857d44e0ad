//! Numeric OIDs.

use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::{self, Write};
use core::str::FromStr;

/// Error returned when a dotted OID string cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OidError {
    /// A component is empty (`1..3`, trailing dot).
    #[error("empty component at position {position}")]
    EmptyComponent {
        /// Zero-based component position.
        position: usize,
    },
    /// A component is not a non-negative integer that fits in 32 bits.
    #[error("invalid component {component:?} at position {position}")]
    InvalidComponent {
        /// The offending text.
        component: String,
        /// Zero-based component position.
        position: usize,
    },
}

/// An OID as a list of arcs, e.g. `[1, 3, 6, 1, 2, 1]`.
///
/// Ordering is lexicographic over arcs, which is also SNMP walk order.
/// Serialized as a plain array of arcs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Oid {
    arcs: Vec<u32>,
}

impl Oid {
    /// Wrap a list of arcs.
    #[must_use]
    pub fn new(arcs: Vec<u32>) -> Self {
        Self { arcs }
    }

    /// Copy arcs from a slice.
    #[must_use]
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self::new(arcs.to_vec())
    }

    /// Parse `1.3.6.1`-style text. `None` on any malformed component; use
    /// [`str::parse`] to learn which one.
    #[must_use]
    pub fn from_dotted(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    /// Dotted text, no leading dot.
    #[must_use]
    pub fn to_dotted(&self) -> String {
        join_arcs(&self.arcs)
    }

    /// The arcs.
    #[must_use]
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// True if `self` equals `other` or lies above it in the tree.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.arcs.starts_with(&self.arcs)
    }

    /// Split points from deepest to shallowest: `(prefix, suffix)` pairs
    /// starting with `(all, [])` and ending with a one-arc prefix.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors::new(&self.arcs)
    }
}

/// Iterator returned by [`Oid::ancestors`] and [`ancestors`].
#[derive(Clone, Debug)]
pub struct Ancestors<'a> {
    arcs: &'a [u32],
    len: usize,
}

impl<'a> Ancestors<'a> {
    fn new(arcs: &'a [u32]) -> Self {
        Self {
            arcs,
            len: arcs.len(),
        }
    }
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (&'a [u32], &'a [u32]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }
        let split = self.arcs.split_at(self.len);
        self.len -= 1;
        Some(split)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl ExactSizeIterator for Ancestors<'_> {}

/// [`Oid::ancestors`] over a bare slice.
pub fn ancestors(arcs: &[u32]) -> Ancestors<'_> {
    Ancestors::new(arcs)
}

/// Join arcs with dots. An empty slice yields an empty string.
#[must_use]
pub fn join_arcs(arcs: &[u32]) -> String {
    let mut out = String::with_capacity(arcs.len() * 4);
    for (i, arc) in arcs.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        // infallible for String
        let _ = write!(out, "{arc}");
    }
    out
}

fn parse_arc(position: usize, part: &str) -> Result<u32, OidError> {
    let invalid = || OidError::InvalidComponent {
        component: part.into(),
        position,
    };
    if part.is_empty() {
        return Err(OidError::EmptyComponent { position });
    }
    // u32::from_str accepts a leading '+' and leading zeros; neither is a
    // canonical arc
    if !part.bytes().all(|b| b.is_ascii_digit()) || (part.len() > 1 && part.starts_with('0')) {
        return Err(invalid());
    }
    part.parse().map_err(|_| invalid())
}

impl FromStr for Oid {
    type Err = OidError;

    /// The empty string parses as the empty OID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        s.split('.')
            .enumerate()
            .map(|(position, part)| parse_arc(position, part))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

impl From<Vec<u32>> for Oid {
    fn from(arcs: Vec<u32>) -> Self {
        Self::new(arcs)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

// Ord on Vec<u32> and [u32] agree, so slices can probe Oid-keyed maps.
impl Borrow<[u32]> for Oid {
    fn borrow(&self) -> &[u32] {
        &self.arcs
    }
}

impl AsRef<[u32]> for Oid {
    fn as_ref(&self) -> &[u32] {
        &self.arcs
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}
