//! Integration tests for site-mirror
//!
//! These tests run whole mirror jobs against wiremock servers (or fake
//! collaborators) and check what ends up on disk and in the report.

mod interrupt_tests;
mod mirror_tests;
mod sitemap_tests;
mod support;
