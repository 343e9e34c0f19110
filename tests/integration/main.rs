//! Integration tests for Bookmark-Audit
//!
//! These run the real HTTP prober against wiremock servers.

mod audit_tests;
mod probe_tests;
