//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: the per-page state machine (unvisited, in progress, visited, failed)
//! - `VisitedSet`: the run-scoped set of claimed pages that breaks link cycles

mod page_state;
mod visited;

pub use page_state::PageState;
pub use visited::VisitedSet;
