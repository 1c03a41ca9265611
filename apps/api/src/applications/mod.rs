//! Job applications: seekers apply to published database jobs, employers move
//! them through review, applicants may withdraw.

pub mod handlers;
pub mod repo;
