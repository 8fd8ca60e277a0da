//! Response paths.
//!
//! During execution the current path is a parent-linked chain of borrowed
//! segments living on the resolver stack; nothing is allocated until an
//! error actually needs a flattened path.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// One step of a response path, as it appears in the `path` of an error.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryPathSegment {
    /// An index into a list value.
    Index(usize),
    /// A response key in an object value.
    Name(String),
}

impl Display for QueryPathSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            QueryPathSegment::Index(idx) => write!(f, "{idx}"),
            QueryPathSegment::Name(name) => f.write_str(name),
        }
    }
}

/// The borrowed path to the value currently being resolved.
#[derive(Clone, Copy, Debug)]
pub struct ResponsePath<'a> {
    segment: ResponsePathSegment<'a>,
    previous: Option<&'a ResponsePath<'a>>,
}

#[derive(Clone, Copy, Debug)]
pub enum ResponsePathSegment<'a> {
    Field(&'a str),
    Index(usize),
}

impl<'a> ResponsePath<'a> {
    /// A root-level path with a single segment.
    pub fn new(segment: ResponsePathSegment<'a>) -> Self {
        ResponsePath {
            segment,
            previous: None,
        }
    }

    /// Extend the path by one segment.
    pub fn child(&'a self, segment: ResponsePathSegment<'a>) -> ResponsePath<'a> {
        ResponsePath {
            segment,
            previous: Some(self),
        }
    }

    /// Flatten into root-first owned segments for error reporting.
    pub fn to_vec(&self) -> Vec<QueryPathSegment> {
        let mut segments = self
            .previous
            .map(ResponsePath::to_vec)
            .unwrap_or_default();
        segments.push(match self.segment {
            ResponsePathSegment::Field(name) => QueryPathSegment::Name(name.to_string()),
            ResponsePathSegment::Index(idx) => QueryPathSegment::Index(idx),
        });
        segments
    }
}

/// Flatten an optional path into owned segments, root first.
pub fn path_to_array(path: Option<&ResponsePath<'_>>) -> Vec<QueryPathSegment> {
    path.map(ResponsePath::to_vec).unwrap_or_default()
}

impl Display for ResponsePath<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(previous) = self.previous {
            write!(f, "{previous}.")?;
        }
        match self.segment {
            ResponsePathSegment::Field(name) => f.write_str(name),
            ResponsePathSegment::Index(idx) => write!(f, "{idx}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_flatten_root_first() {
        let root = ResponsePath::new(ResponsePathSegment::Field("pets"));
        let item = root.child(ResponsePathSegment::Index(3));
        let leaf = item.child(ResponsePathSegment::Field("name"));
        assert_eq!(
            leaf.to_vec(),
            vec![
                QueryPathSegment::Name("pets".into()),
                QueryPathSegment::Index(3),
                QueryPathSegment::Name("name".into()),
            ]
        );
        assert_eq!(leaf.to_string(), "pets.3.name");
    }

    #[test]
    fn segments_serialize_untagged() {
        let path = vec![
            QueryPathSegment::Name("a".into()),
            QueryPathSegment::Index(0),
        ];
        assert_eq!(
            serde_json::to_value(path).unwrap(),
            serde_json::json!(["a", 0])
        );
    }
}
