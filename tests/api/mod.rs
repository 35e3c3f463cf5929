//! HTTP Endpoint Tests

mod admin_tests;
mod announcement_tests;
mod topic_tests;
