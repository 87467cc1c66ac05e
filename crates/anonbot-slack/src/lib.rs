//! Slack adapter.
//!
//! Implements the `anonbot-core` ports over the Slack Web API and feeds
//! Socket Mode envelopes into the core dispatcher.

pub mod client;
pub mod socket;

pub use client::SlackWebClient;
pub use socket::SocketModeRunner;

/// Select `ring` as the process-wide rustls provider.
///
/// The Socket Mode `wss://` handshake builds its TLS config from the process
/// default, and rustls cannot pick one on its own. Safe to call repeatedly.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}
