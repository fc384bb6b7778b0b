// SPDX-License-Identifier: MIT

//! The multi-agent task-routing workflow: planner, collectors, summarizer,
//! and the graph executor that threads [`state::WorkflowState`] through them.

pub mod collector;
pub mod fallback;
pub mod graph;
pub mod planner;
pub mod state;
pub mod summarizer;
