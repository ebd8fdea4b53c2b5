//! The five steps of a refresh, in execution order.

pub mod extract;
pub mod fetch;
pub mod finalize;
pub mod reset;
pub mod rewrite;

pub use finalize::FinalizeReport;
pub use rewrite::RewriteReport;
