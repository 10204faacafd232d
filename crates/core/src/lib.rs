//! FrazModern Core - Shared domain types.
//!
//! This crate provides the types shared by every FrazModern component:
//! - `storefront` - Public JSON API for shoppers
//! - `admin` - Privileged back-office API
//! - `cli` - Migrations, seeding and admin user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure business rules - no I/O, no
//! database access, no HTTP clients. Database encoding for the newtypes is
//! available behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, order status, discount type, slugs
//! - [`pricing`] - Order totals and coupon evaluation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pricing;
pub mod types;

pub use pricing::{
    CouponRejection, CouponTerms, LineItem, MAX_MONEY, is_storable_money, round_money, subtotal,
};
pub use types::*;
