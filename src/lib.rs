#![deny(missing_docs)]
// This crate only shuffles strings around, there is no excuse for unsafe.
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod error;
mod never;
mod plan;
mod reader;
mod solver;

pub use error::{Error, SolveError};
pub use never::Never;
pub use plan::{Plan, PlanBuilder};
pub use reader::{IoReader, Readable, Reader, StringReader};
pub use solver::Solver;
