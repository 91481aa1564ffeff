//! Integration test harness
//!
//! All end-to-end tests run against wiremock servers; none touch the network.

mod crawl_tests;
