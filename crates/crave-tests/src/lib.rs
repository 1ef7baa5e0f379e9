// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Crave Integration Tests
//!
//! Integration tests for the Crave auth/session core. Test utilities live in
//! [`common`]; the suites live under `tests/`.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all integration tests
//! cargo test -p crave-tests
//!
//! # Run the auth suite
//! cargo test -p crave-tests --test integration_auth
//!
//! # Run with verbose output
//! cargo test -p crave-tests -- --nocapture
//! ```

pub mod common;
