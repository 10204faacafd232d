//! FrazModern back-office library.
//!
//! Exposes the admin API as a library so it can be tested and reused.
//!
//! # Security
//!
//! Every route except login requires an administrator session. The session
//! cookie is separate from the storefront's and marked `SameSite=Strict`.

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
