/// Convenience result type used across dmak.
pub type DmakResult<T> = Result<T, DmakError>;

/// Fatal error taxonomy.
///
/// Steady-state playback conditions (busy engine, nothing to erase, ...) are not errors; they are
/// reported as [`Rejected`] values.
#[derive(thiserror::Error, Debug)]
pub enum DmakError {
    /// Invalid options or an unreadable configuration document.
    #[error("config error: {0}")]
    Config(String),

    /// Stroke data could not be fetched or parsed.
    #[error("load error: {0}")]
    Load(String),

    /// Surface or raster output failures.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped error from a lower layer.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DmakError {
    /// Build a [`DmakError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`DmakError::Load`].
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`DmakError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`DmakError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Non-fatal refusal of a playback request. Engine state is unchanged when one is returned.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    /// A forward playback run is already active.
    #[error("a playback run is already active")]
    Busy,
    /// The engine was destroyed.
    #[error("engine has been destroyed")]
    Destroyed,
    /// Stroke data has not been delivered yet.
    #[error("stroke data is not loaded")]
    NotLoaded,
    /// Requested stroke position lies past the last stroke.
    #[error("stroke position {target} is out of range (stroke count {count})")]
    OutOfRange {
        /// Requested position.
        target: usize,
        /// Number of loaded strokes.
        count: usize,
    },
    /// Pointer is already at or below the requested erase target.
    #[error("nothing to erase")]
    NothingToErase,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
