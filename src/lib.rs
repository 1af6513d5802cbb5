pub mod error;
pub mod path_stack;
pub mod recursion;
pub mod reference;
pub mod segment;
pub mod walk_options;
pub mod walker;

pub use path_stack::{PathGuard, PathSnapshot, PathStack, PathView, ReleaseToken};
pub use recursion::RecursionTrail;
pub use segment::{PathSegment, Segment};
pub use walk_options::WalkOptions;
pub use walker::Walker;

pub type Result<T> = std::result::Result<T, error::Error>;
