// Copyright 2026 Smart Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

//! smart-scraper library: visible text from a URL, via a static fetch or a
//! headless render depending on what the page needs.
//!
//! This library crate exposes the core modules for integration testing.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod renderer;
pub mod rest;
pub mod service;
