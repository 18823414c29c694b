//! CLI commands for codejudge

pub mod batch;
pub mod compare;
pub mod dispatch;
pub mod judge;
pub mod report;
pub mod rubrics;
