//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers live under [`http`]; the admin CLI lives in
//! [`crate::admin`] because it drives the storage ports directly.

pub mod http;
