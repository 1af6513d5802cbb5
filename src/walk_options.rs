use serde::Deserialize;

use crate::path_stack::{DEFAULT_SEPARATOR, INITIAL_CAPACITY};

pub(crate) const MAX_DEPTH: usize = 64;

pub(crate) const MAX_NODES: usize = 1 << 20;

#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalkOptions {
    /// How many nodes deep a walk may go, counting followed references, before it fails
    /// with a recursion trail.
    pub max_depth: usize,
    /// How many nodes a walk may produce in total. References copy their targets, so a
    /// shallow document can still expand exponentially.
    pub max_nodes: usize,
    pub initial_capacity: usize,
    /// Written between segments when a path is rendered for a diagnostic.
    pub separator: String,
}

impl WalkOptions {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_nodes: MAX_NODES,
            initial_capacity: INITIAL_CAPACITY,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Result;
    use crate::error::Error;
    use crate::walk_options::{MAX_DEPTH, MAX_NODES, WalkOptions};
    use rstest::rstest;

    #[rstest]
    #[case("{}", WalkOptions::default())]
    #[case(r#"{"max_depth": 8}"#, WalkOptions::new(8))]
    #[case(
        r#"{"separator": "/", "initial_capacity": 4}"#,
        WalkOptions {
            max_depth: MAX_DEPTH,
            max_nodes: MAX_NODES,
            initial_capacity: 4,
            separator: "/".to_string()
        }
    )]
    #[case(
        r#"{"max_nodes": 100}"#,
        WalkOptions { max_nodes: 100, ..Default::default() }
    )]
    fn test_from_json(#[case] json: &str, #[case] expected: WalkOptions) -> Result<()> {
        assert_eq!(WalkOptions::from_json(json)?, expected);
        Ok(())
    }

    #[test]
    fn test_from_invalid_json() {
        assert!(matches!(
            WalkOptions::from_json(r#"{"max_depth": "deep"}"#),
            Err(Error::SerdeJsonError(_))
        ));
    }
}
