//! Storefront Cart Library
//!
//! This library provides the cart core of a small e-commerce backend:
//! cart identity resolution, line-item reconciliation and the guest-to-user
//! cart merge, exposed over a REST API.

// Domain modules
pub mod cart;
pub mod catalog;

// Infrastructure
pub mod router;
