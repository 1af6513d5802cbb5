use std::cell::{Cell, RefCell};
use std::fmt::{Display, Formatter};

use derive_more::{Constructor, Deref, DerefMut};
use tracing::{error, trace};

use crate::Result;
use crate::error::Error;
use crate::segment::{PathSegment, Segment, join_segments};

pub(crate) const INITIAL_CAPACITY: usize = 50;

pub(crate) const DEFAULT_SEPARATOR: &str = ".";

/// The location a traversal is currently at, kept as a stack of segments.
///
/// A traversal pushes a segment when it enters a child node and releases it when it
/// leaves. Releases must happen in strict LIFO order, which is checked on every release.
/// Every successful release bumps a generation counter, so [`PathView`]s taken earlier
/// notice that the path they were reading is gone.
///
/// The stack works through `&self` so that nested [`PathGuard`]s and views can share it.
/// It is `!Sync` and belongs to exactly one traversal.
#[derive(Debug)]
pub struct PathStack<S = PathSegment> {
    // Slots at `count..` hold released segments until a later push overwrites them.
    segments: RefCell<Vec<S>>,
    count: Cell<usize>,
    generation: Cell<u64>,
}

/// Proof that a push happened at a given depth.
///
/// Only [`PathStack::push`] creates tokens and they cannot be copied, so each push can be
/// released at most once. A token released out of order is rejected with
/// [`Error::UnbalancedRelease`] and is used up either way.
///
/// ```compile_fail
/// use node_path::PathStack;
///
/// let stack = PathStack::new();
/// let token = stack.push("a");
/// stack.release(token).unwrap();
/// stack.release(token).unwrap();
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct ReleaseToken {
    depth: usize,
}

impl ReleaseToken {
    fn new(depth: usize) -> Self {
        ReleaseToken { depth }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<S> PathStack<S> {
    pub fn new() -> Self {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        PathStack {
            segments: RefCell::new(Vec::with_capacity(capacity)),
            count: Cell::new(0),
            generation: Cell::new(0),
        }
    }

    pub fn push(&self, segment: S) -> ReleaseToken {
        let count = self.count.get();
        let mut segments = self.segments.borrow_mut();
        if count < segments.len() {
            segments[count] = segment;
        } else {
            if segments.len() == segments.capacity() {
                let additional = segments.capacity().max(1);
                segments.reserve_exact(additional);
            }
            segments.push(segment);
        }
        self.count.set(count + 1);
        trace!(depth = count + 1, "push path segment");
        ReleaseToken::new(count + 1)
    }

    pub fn release(&self, token: ReleaseToken) -> Result<()> {
        let actual = self.count.get();
        if actual != token.depth {
            return Err(Error::UnbalancedRelease {
                expected: token.depth,
                actual,
            });
        }
        self.count.set(actual - 1);
        self.generation.set(self.generation.get().wrapping_add(1));
        trace!(depth = actual - 1, "release path segment");
        Ok(())
    }

    /// Pushes `segment` and returns a guard that releases it when dropped.
    pub fn enter(&self, segment: S) -> PathGuard<'_, S> {
        let token = self.push(segment);
        PathGuard {
            stack: self,
            token: Some(token),
        }
    }

    /// Runs `f` with `segment` pushed and releases it afterwards.
    ///
    /// An unbalanced release inside `f` takes precedence over the result of `f`.
    pub fn scope<T, F>(&self, segment: S, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let token = self.push(segment);
        let result = f(self);
        self.release(token)?;
        result
    }

    pub fn current_path(&self) -> PathView<'_, S> {
        PathView {
            stack: self,
            length: self.count.get(),
            generation: self.generation.get(),
            position: 0,
        }
    }

    pub fn depth(&self) -> usize {
        self.count.get()
    }

    pub fn is_empty(&self) -> bool {
        self.count.get() == 0
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn capacity(&self) -> usize {
        self.segments.borrow().capacity()
    }
}

impl<S: Clone + Segment> PathStack<S> {
    pub fn render(&self) -> Result<String> {
        self.render_with(DEFAULT_SEPARATOR)
    }

    pub fn render_with(&self, separator: &str) -> Result<String> {
        let snapshot = self.current_path().materialize()?;
        Ok(snapshot.join(separator))
    }
}

impl<S> Default for PathStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Releases its segment on drop.
///
/// Dropping a guard out of order breaks the stack for good, so it panics. If the thread is
/// already unwinding the error is logged instead.
#[derive(Debug)]
pub struct PathGuard<'a, S = PathSegment> {
    stack: &'a PathStack<S>,
    token: Option<ReleaseToken>,
}

impl<'a, S> PathGuard<'a, S> {
    pub fn stack(&self) -> &'a PathStack<S> {
        self.stack
    }

    /// Releases now and reports an unbalanced release as an error instead of panicking.
    pub fn release(mut self) -> Result<()> {
        match self.token.take() {
            Some(token) => self.stack.release(token),
            None => Ok(()),
        }
    }
}

impl<S> Drop for PathGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(token) = self.token.take()
            && let Err(error) = self.stack.release(token)
        {
            if std::thread::panicking() {
                error!(%error, "path stack left unbalanced while unwinding");
            } else {
                panic!("{error}");
            }
        }
    }
}

/// A lazy read of the path as it was when [`PathStack::current_path`] was called.
///
/// Nothing is copied up front. Each element is read from the stack on demand after checking
/// that no release happened since the view was taken; if one did, the view yields
/// [`Error::StaleView`] once and then ends.
#[derive(Debug)]
pub struct PathView<'a, S = PathSegment> {
    stack: &'a PathStack<S>,
    length: usize,
    generation: u64,
    position: usize,
}

impl<S: Clone> PathView<'_, S> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_stale(&self) -> bool {
        self.stack.generation.get() != self.generation
    }

    pub fn materialize(self) -> Result<PathSnapshot<S>> {
        let segments = self.collect::<Result<Vec<_>>>()?;
        Ok(PathSnapshot::new(segments))
    }
}

impl<S: Clone> Iterator for PathView<'_, S> {
    type Item = Result<S>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.length {
            return None;
        }
        let actual = self.stack.generation.get();
        if actual != self.generation {
            self.position = self.length;
            return Some(Err(Error::StaleView {
                expected: self.generation,
                actual,
            }));
        }
        let segment = self.stack.segments.borrow().get(self.position).cloned();
        self.position += 1;
        segment.map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.length - self.position))
    }
}

/// An owned copy of a path, for when a diagnostic has to outlive the traversal step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deref, DerefMut, Constructor)]
pub struct PathSnapshot<S = PathSegment>(pub Vec<S>);

impl<S> PathSnapshot<S> {
    #[inline]
    pub fn into_inner(self) -> Vec<S> {
        self.0
    }
}

impl<S: Segment> PathSnapshot<S> {
    pub fn join(&self, separator: &str) -> String {
        Joined {
            segments: &self.0,
            separator,
        }
        .to_string()
    }
}

impl<S: Segment> Display for PathSnapshot<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        join_segments(self.iter(), DEFAULT_SEPARATOR, f)
    }
}

struct Joined<'a, S> {
    segments: &'a [S],
    separator: &'a str,
}

impl<S: Segment> Display for Joined<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        join_segments(self.segments, self.separator, f)
    }
}
