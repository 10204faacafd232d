//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration and login with Argon2id password hashes
//! - `email` - Transactional email and newsletter campaigns over SMTP
//! - `payments` - Payment intents with the payment processor
//! - `uploads` - Image uploads to the local upload directory
//!
//! The back-office server reuses these services.

pub mod auth;
pub mod email;
pub mod payments;
pub mod uploads;

pub use auth::{AuthError, AuthService};
pub use email::{Campaign, EmailError, EmailService};
pub use payments::{PaymentClient, PaymentError};
pub use uploads::{ImageUpload, UploadError, UploadService};
