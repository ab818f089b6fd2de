//! # Admission Pipeline Test Suite
//!
//! Cross-crate tests driving the wired pipeline the way callers do.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs           # Fixtures: pipeline builder, counting relay
//!     ├── submit_flows.rs  # Single-caller scenarios
//!     └── concurrency.rs   # Racing submitters and block connection
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p node-tests
//! cargo test -p node-tests integration::concurrency::
//! ```

#![allow(dead_code)]

pub mod integration;
