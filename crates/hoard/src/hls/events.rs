use std::fmt;
use std::sync::Arc;

/// Called with `(completed, total)` after each segment finishes.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Lifecycle of one download session.
///
/// `Failed` is reachable from every non-terminal state; `Completed` is the only
/// state that yields a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Created,
    ResolvingVariant,
    Downloading { completed: usize, total: usize },
    Rewriting,
    Completed,
    Failed(String),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::ResolvingVariant => f.write_str("resolving variant"),
            Self::Downloading { completed, total } => write!(f, "downloading {completed}/{total}"),
            Self::Rewriting => f.write_str("rewriting"),
            Self::Completed => f.write_str("completed"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
