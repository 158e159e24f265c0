//! The HTTP client façade.
//!
//! [`HttpClient`] is the entry point applications call. It owns the default
//! headers, options, and body handlers, resolves base URL + path, consults
//! the mock registry, builds and runs a [`Transaction`](crate::Transaction),
//! attaches the response decode handler, invokes the compliance checker, and
//! caches the last transaction for introspection.
//!
//! Control flow of one call:
//!
//! ```text
//! request → resolve URL → mock lookup (short-circuit)
//!         → build HttpRequest → Transaction::run (transport I/O, timing)
//!         → attach decode handler → compliance check → HttpResponse
//! ```
//!
//! # State and concurrency
//!
//! Every non-mocked call overwrites the client's "last transaction" slot, so
//! a client instance is single-writer by contract. `request` takes
//! `&mut self`, which lets the borrow checker enforce that: concurrent
//! logical calls need one client per call context (or a clone of a shared
//! template client), not a shared `&HttpClient`.

mod builder;
mod request;


pub use builder::HttpClient;
