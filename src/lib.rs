#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Orders Service
//!
//! > **An order lifecycle engine built on message-passing tasks.**
//!
//! This crate implements the order half of a small commerce system: it
//! creates orders against a product catalog, opens payment sessions for
//! them, and records payment confirmations. It talks to its two
//! collaborators (the catalog and the payment service) over typed
//! request/reply channels and owns no product or payment state itself.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### State lives in one task
//!
//! All persisted order state belongs to a single store task that answers
//! [`StoreRequest`](store::StoreRequest) messages one at a time. Handling
//! each request in full before taking the next is what makes multi-field
//! writes atomic with no locks anywhere in the crate.
//!
//! ### Requests are independent
//!
//! The router in front of the engine dispatches every inbound message on
//! its own task. A slow catalog lookup on one request never delays the
//! next; ordering guarantees exist only inside the store.
//!
//! ### Collaborators are black boxes
//!
//! The engine knows the catalog answers product lookups and the payment
//! service opens sessions. Everything else about them, including whether
//! they are real deployments or the in-process doubles from
//! [`clients::mock`], is invisible to it.
//!
//! ## 🗺️ Module Tour
//!
//! - **The state** ([`store`]): the store task, sole owner of order
//!   records, snapshots, and receipts.
//! - **The engine** ([`service`]): validation, totals, catalog joins, and
//!   the payment handshake.
//! - **The surface** ([`router`]): the inbound protocol enum, the
//!   dispatcher, and [`OrdersClient`](router::OrdersClient).
//! - **The collaborators** ([`clients`]): typed catalog and payment
//!   clients plus task-backed mocks.
//! - **The orchestrator** ([`runtime`]): [`OrderSystem`](runtime::OrderSystem)
//!   startup/shutdown and tracing setup.
//! - **The vocabulary** ([`domain`], [`error`], [`config`]): data types,
//!   the error taxonomy, and runtime knobs.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo flow with info logs
//! RUST_LOG=info cargo run
//! ```
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod router;
pub mod runtime;
pub mod service;
pub mod store;
