//! Integration tests for tasklink-notion
//!
//! Uses wiremock to simulate the Notion API and verifies end-to-end
//! behavior of the NotionClient and the NotionTaskSource adapter.

mod common;

mod test_pages;
mod test_query;
mod test_users;
