//! Integration test common infrastructure.
//!
//! Provides utilities for spawning test relays and creating test clients
//! that speak the chat frame codec.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
