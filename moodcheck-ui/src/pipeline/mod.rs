//! Core pipelines: submission persistence and dashboard aggregation

pub mod dashboard;
pub mod submit;

pub use dashboard::{build_dashboard, load_dashboard, Dashboard};
pub use submit::{submit_checkin, SubmitReceipt, SubmitRequest};
