//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `checkout` - Order placement with stock reservation
//! - `notifications` - Operator and customer order emails
//! - `email` - Transactional email API client
//! - `images` - Product image path to public URL binding

pub mod checkout;
pub mod email;
pub mod images;
pub mod notifications;

pub use checkout::{PlaceOrderError, PlaceOrderRequest, PlaceOrderResponse, place_order};
pub use email::{EmailClient, EmailError};
pub use images::ImageResolver;
pub use notifications::{DisabledNotifier, EmailNotifier, OrderNotifier};
