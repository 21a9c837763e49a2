//! Integration tests for Depthwalk
//!
//! `crawl_tests` drives full crawls against wiremock servers over HTTP;
//! `scenarios` exercises traversal behavior against an in-memory site.

mod crawl_tests;
mod scenarios;
