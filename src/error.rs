use std::io;

use thiserror::Error;

/// Everything that can go wrong while building a [`crate::Plan`] or driving a [`crate::Solver`],
/// other than a failure of the caller's own transform (see [`SolveError`]).
#[derive(Debug, Error)]
pub enum Error {
    /// A construction-time argument was unusable: a fixed segment of zero lines, or an empty
    /// file path.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The call is not legal right now: the solver has already been started once, or a plan was
    /// built without any segments.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Opening, clearing, writing or flushing one of the underlying files failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The declared test case structure does not match what the input stream actually contains:
    /// the count line is missing or not a number, or the stream ended in the middle of a segment.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A custom [`crate::Reader`] implementation failed while producing a line.
    #[error("failed to read a line from the input")]
    Read(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn read(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Read(Box::new(source))
    }
}

/// The result of [`crate::Solver::solve`]: either the loop itself failed, or the caller's
/// transform did.
///
/// Transform failures are passed through unchanged so that the caller can keep using their own
/// error type; jamloop never inspects them. Whichever way `solve` exits, output written for
/// already-completed cases has been flushed.
#[derive(Debug, Error)]
pub enum SolveError<E: std::error::Error> {
    /// The loop failed: malformed input, an I/O problem, or illegal reuse of the solver.
    #[error(transparent)]
    Jam(#[from] Error),

    /// The caller's transform returned an error for some test case.
    #[error(transparent)]
    Transform(E),
}
