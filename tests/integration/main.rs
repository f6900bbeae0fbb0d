//! Integration tests for the crawler
//!
//! These tests use wiremock to serve listing pages, detail pages and
//! generated thumbnails, and run complete crawls against a temporary corpus.

mod container_tests;
mod corpus_tests;
mod link_tests;
mod support;
