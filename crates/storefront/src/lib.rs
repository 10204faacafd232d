//! FrazModern storefront library.
//!
//! The public JSON API lives here as a library so the back-office server and
//! the CLI can reuse its repositories and services, and so it can be tested.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
