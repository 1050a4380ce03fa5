//! Error types for flyby.
//!
//! Failures split into two classes: asset errors (a screensaver without its
//! core models cannot run, so hosts treat these as fatal at startup) and
//! session errors (the host declined to open or dismiss the immersive space,
//! which reverts the session flag and is retried by normal user action).

use std::fmt;

/// Errors raised while loading renderable templates.
#[derive(Debug)]
pub enum AssetError {
    /// The named template is not present in the content bundle.
    MissingTemplate {
        /// Template name requested from the asset provider.
        name: String,
        /// Scene the template was expected in.
        scene: String,
    },
    /// A template loaded but carries none of the animation clips the engine
    /// needs (e.g. the toaster's wing-flap clip).
    MissingClip {
        /// Template that came back without clips.
        template: String,
    },
    /// The asset provider itself failed (I/O, decode, bundle corruption).
    Provider(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::MissingTemplate { name, scene } => {
                write!(f, "Template '{}' not found in scene '{}'", name, scene)
            }
            AssetError::MissingClip { template } => {
                write!(f, "Template '{}' has no animation clips", template)
            }
            AssetError::Provider(msg) => write!(f, "Asset provider failed: {}", msg),
        }
    }
}

impl std::error::Error for AssetError {}

/// Errors raised while starting or stopping a screensaver session.
#[derive(Debug)]
pub enum SessionError {
    /// The host rejected the request to open the immersive/volumetric space.
    OpenRejected(String),
    /// The host rejected the request to dismiss the space.
    DismissRejected(String),
    /// No host is wired up for the requested display mode.
    HostUnavailable,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::OpenRejected(msg) => {
                write!(f, "Host declined to open the space: {}", msg)
            }
            SessionError::DismissRejected(msg) => {
                write!(f, "Host declined to dismiss the space: {}", msg)
            }
            SessionError::HostUnavailable => write!(f, "No immersive host available"),
        }
    }
}

impl std::error::Error for SessionError {}
