use std::fmt::Write;

type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

const TRAIL_HEADER: &str = "\nRecursion path:";
const TRAIL_ITEM: &str = "\n - ";

/// An error that collects one path label per traversal frame it passes through.
///
/// The frame that detects the violation creates the trail with [`RecursionTrail::raise`],
/// every enclosing frame adds its own label with [`RecursionTrail::augment`] before handing
/// the error to its caller. [`RecursionTrail::render`] lists the labels in the order they
/// were recorded.
///
/// ```
/// use node_path::recursion::RecursionTrail;
///
/// let trail = RecursionTrail::raise("limit exceeded", "root", None)
///     .augment("child")
///     .augment("grandchild");
/// assert!(trail.render().ends_with("root\n - child\n - grandchild"));
/// ```
#[derive(Debug, thiserror::Error)]
#[error("{}", self.render())]
pub struct RecursionTrail {
    message: String,
    #[source]
    cause: Option<Cause>,
    labels: Vec<String>,
}

impl RecursionTrail {
    pub fn raise(message: impl Into<String>, label: impl Into<String>, cause: Option<Cause>) -> Self {
        RecursionTrail {
            message: message.into(),
            cause,
            labels: vec![label.into()],
        }
    }

    #[must_use = "augment returns the extended trail, propagate it"]
    pub fn augment(mut self, label: impl Into<String>) -> Self {
        self.add_label(label);
        self
    }

    pub fn add_label(&mut self, label: impl Into<String>) {
        self.labels.push(label.into());
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn last_label(&self) -> Option<&str> {
        self.labels.last().map(String::as_str)
    }

    pub fn render(&self) -> String {
        let capacity = self.message.len()
            + TRAIL_HEADER.len()
            + self.labels.iter().map(|l| l.len() + TRAIL_ITEM.len()).sum::<usize>();
        let mut rendered = String::with_capacity(capacity);
        rendered.push_str(&self.message);
        rendered.push_str(TRAIL_HEADER);
        for label in &self.labels {
            let _ = write!(rendered, "{TRAIL_ITEM}{label}");
        }
        rendered
    }
}
