//! Filament Shop Core - Shared domain types and client-state rules.
//!
//! This crate is used by:
//! - `storefront` - The JSON API that owns the catalog, orders and profiles
//! - `cli` - Command-line tools for migrations and catalog management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Front ends can reuse the cart and address book
//! rules without pulling in the server stack.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, and statuses
//! - [`catalog`] - Products and admin product input
//! - [`order`] - Orders, order lines, and checkout line-item normalization
//! - [`address`] - Addresses and the address book
//! - [`profile`] - User profiles
//! - [`cart`] - Cart state manager

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod profile;
pub mod types;

pub use address::{Address, AddressBook, NewAddress, ShippingAddress};
pub use cart::{Cart, CartItem};
pub use catalog::{Product, ProductInput, ProductInputError};
pub use order::{LineItemError, NewOrder, Order, OrderLine, RequestedLine};
pub use profile::UserProfile;
pub use types::*;
