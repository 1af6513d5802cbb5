use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// One step of the location inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// The document root.
    Root,
    /// A named field of an object.
    Property(Rc<str>),
    /// An element of an array.
    Index(usize),
    /// A map key that is not a plain identifier.
    Key(Rc<str>),
    /// A reference (`${...}`) that was followed to reach the node.
    Reference(Rc<str>),
}

impl PathSegment {
    pub fn property(name: impl AsRef<str>) -> Self {
        PathSegment::Property(Rc::from(name.as_ref()))
    }

    pub fn key(key: impl AsRef<str>) -> Self {
        PathSegment::Key(Rc::from(key.as_ref()))
    }

    pub fn reference(expression: impl AsRef<str>) -> Self {
        PathSegment::Reference(Rc::from(expression.as_ref()))
    }

    pub fn ty(&self) -> &'static str {
        match self {
            PathSegment::Root => "Root",
            PathSegment::Property(_) => "Property",
            PathSegment::Index(_) => "Index",
            PathSegment::Key(_) => "Key",
            PathSegment::Reference(_) => "Reference",
        }
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Root => write!(f, "$"),
            PathSegment::Property(name) => write!(f, "{name}"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
            PathSegment::Key(key) => write!(f, "'{key}'"),
            PathSegment::Reference(expression) => write!(f, "${{{expression}}}"),
        }
    }
}

impl From<usize> for PathSegment {
    fn from(value: usize) -> Self {
        PathSegment::Index(value)
    }
}

impl From<&str> for PathSegment {
    fn from(value: &str) -> Self {
        PathSegment::property(value)
    }
}

impl From<String> for PathSegment {
    fn from(value: String) -> Self {
        PathSegment::Property(Rc::from(value))
    }
}

/// Anything that can be shown as one step of a rendered path.
///
/// Segments stay opaque to [`crate::path_stack::PathStack`]; this trait is only needed to
/// turn a materialized path into text.
pub trait Segment: Display {
    /// Whether the segment is written without a separator in front of it, like `[0]`.
    fn is_attached(&self) -> bool {
        false
    }
}

impl Segment for PathSegment {
    fn is_attached(&self) -> bool {
        matches!(self, PathSegment::Index(_))
    }
}

impl Segment for &str {}

impl Segment for String {}

impl Segment for Rc<str> {}

/// Joins segments the way a document path is usually written: `$.servers[0].host`.
pub(crate) fn join_segments<'a, S, I>(
    segments: I,
    separator: &str,
    f: &mut Formatter<'_>,
) -> std::fmt::Result
where
    S: Segment + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let mut first = true;
    for segment in segments {
        if !first && !segment.is_attached() {
            f.write_str(separator)?;
        }
        write!(f, "{segment}")?;
        first = false;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::segment::{PathSegment, Segment};
    use rstest::rstest;

    #[rstest]
    #[case(PathSegment::Root, "$")]
    #[case(PathSegment::property("name"), "name")]
    #[case(PathSegment::Index(3), "[3]")]
    #[case(PathSegment::key("a b"), "'a b'")]
    #[case(PathSegment::reference("a.b"), "${a.b}")]
    fn test_display(#[case] segment: PathSegment, #[case] expected: &str) {
        assert_eq!(segment.to_string(), expected);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(PathSegment::from(2), PathSegment::Index(2));
        assert_eq!(PathSegment::from("x"), PathSegment::property("x"));
        assert_eq!(PathSegment::from("x".to_string()).ty(), "Property");
    }

    #[test]
    fn test_only_indices_attach() {
        assert!(PathSegment::Index(0).is_attached());
        assert!(!PathSegment::Root.is_attached());
        assert!(!"plain".is_attached());
    }
}
