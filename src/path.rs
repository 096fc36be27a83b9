//! Locations inside an object graph.
//!
//! A [`FieldPath`] is attached to every [`ApiError`] (`order.items[2].sku`)
//! and is also what dependent constraints parse their target paths into
//! before walking the graph.
//!
//! [`ApiError`]: crate::ApiError

use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Field name or map key.
    Field(String),
    /// List position.
    Index(usize),
}

/// Where a value sits relative to the validated root.
///
/// Paths are immutable; `push_*` returns an extended copy.
///
/// # Example
///
/// ```rust
/// use warden::FieldPath;
///
/// let path = FieldPath::root()
///     .push_field("items")
///     .push_index(0)
///     .push_field("sku");
///
/// assert_eq!(path.to_string(), "items[0].sku");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The validated object itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_field(name: impl Into<String>) -> Self {
        Self::root().push_field(name)
    }

    /// Parses a dependent path such as `customer.address.city` or
    /// `items[1].sku`.
    ///
    /// A segment made only of digits (`items.1`) is an index. Empty segments
    /// and unbalanced or non-numeric brackets yield `None`.
    ///
    /// ```rust
    /// use warden::{FieldPath, PathSegment};
    ///
    /// let path = FieldPath::parse("items[1].sku").unwrap();
    /// let segments: Vec<_> = path.segments().cloned().collect();
    /// assert_eq!(
    ///     segments,
    ///     vec![
    ///         PathSegment::Field("items".into()),
    ///         PathSegment::Index(1),
    ///         PathSegment::Field("sku".into()),
    ///     ]
    /// );
    /// assert!(FieldPath::parse("items..sku").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (name, mut brackets) = part.split_at(part.find('[').unwrap_or(part.len()));
            if name.contains(']') || (name.is_empty() && brackets.is_empty()) {
                return None;
            }
            if !name.is_empty() {
                segments.push(match name.parse::<usize>() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Field(name.to_string()),
                });
            }
            while let Some(inner) = brackets.strip_prefix('[') {
                let close = inner.find(']')?;
                segments.push(PathSegment::Index(inner[..close].parse().ok()?));
                brackets = &inner[close + 1..];
            }
            if !brackets.is_empty() {
                return None;
            }
        }
        Some(Self { segments })
    }

    pub fn push_field(&self, name: impl Into<String>) -> Self {
        self.extended(PathSegment::Field(name.into()))
    }

    pub fn push_index(&self, index: usize) -> Self {
        self.extended(PathSegment::Index(index))
    }

    fn extended(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut separate = false;
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) if separate => write!(f, ".{name}")?,
                PathSegment::Field(name) => f.write_str(name)?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
            separate = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_renders_empty() {
        let path = FieldPath::root();
        assert!(path.is_empty());
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_index_after_root_has_no_separator() {
        let path = FieldPath::root().push_index(2).push_field("name");
        assert_eq!(path.to_string(), "[2].name");
    }

    #[test]
    fn test_push_leaves_original_untouched() {
        let base = FieldPath::from_field("items");
        let first = base.push_index(0);
        let second = base.push_index(1);

        assert_eq!(base.to_string(), "items");
        assert_eq!(first.to_string(), "items[0]");
        assert_eq!(second.to_string(), "items[1]");
    }

    #[test]
    fn test_parse_brackets_and_numeric_segments() {
        let bracketed = FieldPath::parse("items[2].sku").unwrap();
        let dotted = FieldPath::parse("items.2.sku").unwrap();
        assert_eq!(bracketed, dotted);

        let nested = FieldPath::parse("grid[1][4]").unwrap();
        let segments: Vec<_> = nested.segments().collect();
        assert_eq!(segments[1], &PathSegment::Index(1));
        assert_eq!(segments[2], &PathSegment::Index(4));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(FieldPath::parse("").is_none());
        assert!(FieldPath::parse("a..b").is_none());
        assert!(FieldPath::parse("a[x]").is_none());
        assert!(FieldPath::parse("a[1").is_none());
        assert!(FieldPath::parse("a[1]b").is_none());
        assert!(FieldPath::parse("a]").is_none());
    }
}
