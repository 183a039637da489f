//! Error type shared by configuration, server startup and the delivery sink.
//!
//! Queue-full and deadline misses are deliberately absent: both are normal
//! pipeline outcomes, reported as `bool` / `Status`, never as `Err`.

use std::{io, net::SocketAddr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to acquire listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("http server failed: {0}")]
    Serve(#[from] io::Error),

    #[error("transport write failed: {0}")]
    Transport(String),

    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
