//! Card Gateway Client Library
//! # Overview
//!
//! This library provides an async client for a card-payment gateway, covering
//! the full payment lifecycle over stored-card tokens plus split settlement
//! and client identification.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Wire and domain types (Order, MerchantAccount, errors, etc.)
//! - [`config`] - Client configuration and endpoint resolution
//! - [`core`] - Business logic components:
//!   - [`core::signature`] - Canonical SHA-1 signing and verification
//!   - [`core::classifier`] - Gateway reply classification
//!   - [`core::split`] - Split-settlement share allocation
//!   - [`core::gateway`] - Operation orchestration
//! - [`transport`] - HTTP transport behind the pluggable `Sender` trait
//! - [`recorder`] - Best-effort traffic recording sinks
//!
//! # Operations
//!
//! The client supports the following operations:
//!
//! - **Verification link**: hosted checkout URL for card verification
//! - **Status**: order snapshot lookup
//! - **Payment / Hold**: straight or preauth charge of a stored card
//! - **Capture / Refund**: finalize or reverse a charge, fully or partially
//! - **Credit**: P2P withdrawal to a card, signed with the credit key
//! - **Split / Split refund**: settle a captured order across receivers
//! - **Identity status / limits**: client identification and limit lookup
//!
//! # Signing
//!
//! Every message is signed with SHA-1 over the secret key and the message's
//! signable field values, sorted by field identifier and joined with `|`.
//! Payment-class operations use the merchant key; withdrawals use the
//! credit key. The two are never interchangeable.

// Module declarations
pub mod config;
pub mod core;
pub mod recorder;
pub mod transport;
pub mod types;

pub use config::GatewayConfig;
pub use core::{Gateway, Signable};
pub use recorder::{LogRecorder, Recorder};
pub use transport::http::HttpSender;
pub use transport::Sender;
pub use types::{
    Balance, CaptureCompat, GatewayError, IdentityDocument, InvoiceRequest, MerchantAccount,
    Order, SettlementOrder, SplitAccount,
};
