//! Error types raised by the region map.

use thiserror::Error;

/// Errors surfaced by catalog lookups, the map surface lifecycle and the
/// script loader.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// The container is not attached to a renderable area.
    #[error("map container '{container}' is not attached to a renderable area ({width}x{height})")]
    Initialization {
        container: String,
        width: u32,
        height: u32,
    },

    #[error("unknown region '{0}'")]
    UnknownRegion(String),

    /// Layers were registered before the surface emitted `Ready`.
    #[error("map surface is not ready")]
    NotReady,

    #[error("region layers are already registered")]
    AlreadyRegistered,

    #[error("map surface has been torn down")]
    TornDown,

    #[error("unknown layer '{0}'")]
    UnknownLayer(String),

    #[error("invalid region '{id}': {reason}")]
    InvalidRegion { id: String, reason: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("script error: {0}")]
    Script(String),
}

pub type Result<T> = std::result::Result<T, MapError>;
