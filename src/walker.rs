use std::cell::Cell;

use serde_json::{Map, Value};
use tracing::{debug, instrument, trace};

use crate::Result;
use crate::error::Error;
use crate::path_stack::PathStack;
use crate::recursion::RecursionTrail;
use crate::reference::Reference;
use crate::segment::PathSegment;
use crate::walk_options::WalkOptions;

/// Resolves `${...}` references inside a JSON document.
///
/// Every string of the form `${a.b}` is replaced with a copy of the node it points at, with
/// references inside that node resolved too. Since references may point back at their own
/// ancestors, the walk is bounded by [`WalkOptions::max_depth`]. Going past it fails with
/// [`Error::InvalidRecursion`], whose trail lists the path at which the limit was hit and
/// then the path of every reference that led there, innermost first.
#[derive(Debug)]
pub struct Walker<'a> {
    document: &'a Value,
    options: WalkOptions,
    path: PathStack,
    nodes: Cell<usize>,
}

impl<'a> Walker<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self::with_options(document, WalkOptions::default())
    }

    pub fn with_options(document: &'a Value, options: WalkOptions) -> Self {
        let path = PathStack::with_capacity(options.initial_capacity);
        Walker {
            document,
            options,
            path,
            nodes: Cell::new(0),
        }
    }

    #[instrument(level = "debug", skip_all, fields(max_depth = self.options.max_depth))]
    pub fn resolve(&self) -> Result<Value> {
        self.nodes.set(0);
        let root = self.path.enter(PathSegment::Root);
        let resolved = self.resolve_node(self.document, 0)?;
        root.release()?;
        Ok(resolved)
    }

    fn resolve_node(&self, node: &'a Value, depth: usize) -> Result<Value> {
        if depth > self.options.max_depth {
            let label = self.current_label()?;
            debug!(%label, depth, "maximum nesting depth exceeded");
            let message = format!(
                "Maximum nesting depth of {} exceeded",
                self.options.max_depth
            );
            return Err(RecursionTrail::raise(message, label, None).into());
        }
        let nodes = self.nodes.get() + 1;
        if nodes > self.options.max_nodes {
            return Err(Error::NodeLimitExceeded {
                max_nodes: self.options.max_nodes,
                path: self.current_label()?,
            });
        }
        self.nodes.set(nodes);
        match node {
            Value::Object(object) => {
                let mut resolved = Map::new();
                for (key, value) in object {
                    let _guard = self.path.enter(Self::key_segment(key));
                    resolved.insert(key.clone(), self.resolve_node(value, depth + 1)?);
                }
                Ok(Value::Object(resolved))
            }
            Value::Array(array) => {
                let mut resolved = Vec::with_capacity(array.len());
                for (index, value) in array.iter().enumerate() {
                    let _guard = self.path.enter(PathSegment::Index(index));
                    resolved.push(self.resolve_node(value, depth + 1)?);
                }
                Ok(Value::Array(resolved))
            }
            Value::String(string) => match Reference::parse(string)? {
                Some(reference) => self.follow(&reference, depth),
                None => Ok(node.clone()),
            },
            other => Ok(other.clone()),
        }
    }

    fn follow(&self, reference: &Reference, depth: usize) -> Result<Value> {
        let _guard = self
            .path
            .enter(PathSegment::reference(reference.expression()));
        trace!(%reference, depth, "follow reference");
        let target = match reference.lookup(self.document) {
            Some(target) => target,
            None if reference.is_optional() => return Ok(Value::Null),
            None => return Err(Error::ReferenceNotFound(reference.to_string())),
        };
        match self.resolve_node(target, depth + 1) {
            Err(Error::InvalidRecursion(trail)) => {
                let label = self.current_label()?;
                // The limit may have been hit right at the target, with this frame's path.
                if trail.last_label() == Some(label.as_str()) {
                    Err(trail.into())
                } else {
                    Err(trail.augment(label).into())
                }
            }
            result => result,
        }
    }

    fn current_label(&self) -> Result<String> {
        self.path.render_with(&self.options.separator)
    }

    fn key_segment(key: &str) -> PathSegment {
        let plain = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if plain {
            PathSegment::property(key)
        } else {
            PathSegment::key(key)
        }
    }
}
