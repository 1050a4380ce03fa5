//! Session control: opening the immersive space and the idle countdown.
//!
//! The host presents a timeout picker ("start after five minutes of idle
//! time"); [`SessionState`] owns the countdown and asks an [`ImmersiveHost`]
//! to open or dismiss the space when it elapses or the user bails out.
//! Host failures are recoverable: the running flag reverts and the next
//! user action retries.

use log::{info, warn};

use crate::error::SessionError;
use crate::params::DisplayMode;

/// Idle timeout choices, as shown in the host's picker.
///
/// Minutes of `0` means never start automatically; `-1` marks the custom
/// entry whose duration comes from [`SessionState::set_custom_timeout`].
pub const TIMEOUT_CHOICES: [(&str, i32); 8] = [
    ("For 1 Minute", 1),
    ("For 5 Minutes", 5),
    ("For 15 Minutes", 15),
    ("For 30 Minutes", 30),
    ("For 1 Hour", 60),
    ("For 2 Hours", 120),
    ("Never", 0),
    ("Custom", -1),
];

/// Default picker selection: one hour.
pub const DEFAULT_TIMEOUT_INDEX: usize = 4;

/// Host-side immersive space control.
pub trait ImmersiveHost {
    /// Open the immersive space in the given display mode.
    fn open(&mut self, mode: DisplayMode) -> Result<(), SessionError>;

    /// Dismiss the immersive space.
    fn dismiss(&mut self) -> Result<(), SessionError>;
}

/// Stand-in host for platforms without an immersive space.
///
/// Every request fails with [`SessionError::HostUnavailable`], so the
/// session flag reverts and the countdown keeps retrying, the same
/// recoverable path as any other host rejection.
pub struct UnsupportedHost;

impl ImmersiveHost for UnsupportedHost {
    fn open(&mut self, _mode: DisplayMode) -> Result<(), SessionError> {
        Err(SessionError::HostUnavailable)
    }

    fn dismiss(&mut self) -> Result<(), SessionError> {
        Err(SessionError::HostUnavailable)
    }
}

/// Countdown and running flag for one screensaver session.
pub struct SessionState {
    running: bool,
    mode: DisplayMode,
    selected: usize,
    custom_secs: u64,
    counting: bool,
    idle_secs: u64,
}

impl SessionState {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            running: false,
            mode,
            selected: DEFAULT_TIMEOUT_INDEX,
            custom_secs: 0,
            counting: true,
            idle_secs: 0,
        }
    }

    /// Whether the immersive space is open.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Display mode used when the space opens.
    pub fn display_mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
    }

    /// Pick a timeout from [`TIMEOUT_CHOICES`]. Resets the countdown.
    pub fn select_timeout(&mut self, index: usize) {
        self.selected = index.min(TIMEOUT_CHOICES.len() - 1);
        self.idle_secs = 0;
        self.counting = !self.running;
    }

    /// Set the custom timeout duration. Only used while the "Custom"
    /// choice is selected.
    pub fn set_custom_timeout(&mut self, hours: u64, minutes: u64, seconds: u64) {
        self.custom_secs = hours * 3600 + minutes * 60 + seconds;
        self.idle_secs = 0;
    }

    /// The selected timeout in seconds, or `None` for "Never".
    pub fn timeout_secs(&self) -> Option<u64> {
        match TIMEOUT_CHOICES[self.selected].1 {
            0 => None,
            -1 => (self.custom_secs > 0).then_some(self.custom_secs),
            minutes => Some(minutes as u64 * 60),
        }
    }

    /// Advance the idle countdown by one second.
    ///
    /// Returns `true` when the timeout elapses on this call; the host then
    /// calls [`SessionState::start`].
    pub fn tick_second(&mut self) -> bool {
        if !self.counting || self.running {
            return false;
        }
        let Some(timeout) = self.timeout_secs() else {
            return false;
        };
        self.idle_secs += 1;
        if self.idle_secs >= timeout {
            self.counting = false;
            self.idle_secs = 0;
            return true;
        }
        false
    }

    /// Seconds of idle time accumulated so far.
    pub fn idle_secs(&self) -> u64 {
        self.idle_secs
    }

    /// Open the immersive space and stop the countdown.
    ///
    /// On rejection the running flag stays false and the countdown
    /// restarts, so a transient host failure self-heals.
    pub fn start(&mut self, host: &mut dyn ImmersiveHost) -> Result<(), SessionError> {
        match host.open(self.mode) {
            Ok(()) => {
                self.running = true;
                self.counting = false;
                self.idle_secs = 0;
                info!("immersive space opened ({:?})", self.mode);
                Ok(())
            }
            Err(err) => {
                self.running = false;
                self.counting = true;
                self.idle_secs = 0;
                warn!("immersive space failed to open: {}", err);
                Err(err)
            }
        }
    }

    /// Dismiss the immersive space and restart the countdown, unless the
    /// timeout is "Never".
    pub fn stop(&mut self, host: &mut dyn ImmersiveHost) -> Result<(), SessionError> {
        let result = host.dismiss();
        if let Err(ref err) = result {
            warn!("immersive space failed to dismiss: {}", err);
        }
        self.running = false;
        self.idle_secs = 0;
        self.counting = self.timeout_secs().is_some();
        result
    }
}
