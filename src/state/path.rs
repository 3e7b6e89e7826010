//! Key paths into a [`StateSnapshot`](super::StateSnapshot).

use crate::error::{ProvenanceError, Result};
use std::fmt;

use super::snapshot::StateField;

/// A segmented key path such as `selected` or `selected.people/A`.
///
/// The first segment names a snapshot field; later segments index into that
/// field's JSON form (object keys or array indices). The empty path watches
/// the whole snapshot.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StatePath {
    field: Option<StateField>,
    rest: Vec<String>,
}

impl StatePath {
    /// The path covering the entire snapshot.
    pub fn root() -> Self {
        Self {
            field: None,
            rest: Vec::new(),
        }
    }

    /// Path to a whole field.
    pub fn field(field: StateField) -> Self {
        Self {
            field: Some(field),
            rest: Vec::new(),
        }
    }

    /// Parse a dotted path. Use [`StatePath::from_segments`] for keys that
    /// themselves contain dots.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        Self::from_segments(path.split('.'))
    }

    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut iter = segments.into_iter();
        let Some(head) = iter.next() else {
            return Ok(Self::root());
        };

        let head = head.as_ref();
        let field = StateField::from_name(head)
            .ok_or_else(|| ProvenanceError::InvalidPath(head.to_string()))?;

        let mut rest = Vec::new();
        for segment in iter {
            let segment = segment.as_ref();
            if segment.is_empty() {
                return Err(ProvenanceError::InvalidPath(format!(
                    "empty segment after '{}'",
                    head
                )));
            }
            rest.push(segment.to_string());
        }

        Ok(Self {
            field: Some(field),
            rest,
        })
    }

    /// Append a segment.
    pub fn join(mut self, segment: impl Into<String>) -> Self {
        self.rest.push(segment.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.field.is_none()
    }

    /// The snapshot field this path starts at (`None` for the root path).
    pub fn head(&self) -> Option<StateField> {
        self.field
    }

    /// Segments below the field.
    pub fn tail(&self) -> &[String] {
        &self.rest
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(field) = self.field else {
            return Ok(());
        };
        write!(f, "{}", field.name())?;
        for segment in &self.rest {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StatePath({:?})", self.to_string())
    }
}

impl From<StateField> for StatePath {
    fn from(field: StateField) -> Self {
        Self::field(field)
    }
}

impl TryFrom<&str> for StatePath {
    type Error = ProvenanceError;

    fn try_from(path: &str) -> Result<Self> {
        Self::parse(path)
    }
}
