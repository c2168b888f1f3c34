use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("end of node without a matching start")]
    UnbalancedEnd,
    #[error("{child} is not allowed under {parent}")]
    ChildNotAllowed {
        parent: &'static str,
        child: &'static str,
    },
    #[error("duplicate child {0}")]
    DuplicateChild(String),
    #[error("a tree has exactly one root")]
    MultipleRoots,
    #[error("{0} node(s) still open")]
    Unclosed(usize),
    #[error("no node was written")]
    Empty,
}
