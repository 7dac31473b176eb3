//! Boundary to the truck simulator's telemetry host.
//!
//! The host drives everything through callbacks. [`HostAdapter`] turns each
//! callback into a [`HostEvent`] and forwards it to the [`ControlLoop`] it
//! owns; there is no global instance.

use std::fmt;

use tracing::{info, warn};
use truckffb_errors::TruckFfbError;
use truckffb_hid_common::HidPort;
use truckffb_telemetry::{FrameStart, TelemetryValue};

use crate::control_loop::{ControlLoop, TickReport};

/// Newest major game version the channel layout is known to match.
pub const SUPPORTED_MAJOR_VERSION: u16 = 1;

/// Game version in the host's packed `(major << 16) | minor` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GameVersion(u32);

impl GameVersion {
    pub const V1_00: GameVersion = GameVersion::new(1, 0);

    pub const fn new(major: u16, minor: u16) -> Self {
        Self(((major as u32) << 16) | minor as u32)
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn major(self) -> u16 {
        (self.0 >> 16) as u16
    }

    #[allow(clippy::cast_possible_truncation)]
    pub const fn minor(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.major(), self.minor())
    }
}

/// Truck games sharing the telemetry SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TruckGame {
    Ets2,
    Ats,
}

impl TruckGame {
    pub fn from_game_id(game_id: &str) -> Option<Self> {
        match game_id {
            "eut2" => Some(Self::Ets2),
            "ats" => Some(Self::Ats),
            _ => None,
        }
    }

    pub fn game_id(self) -> &'static str {
        match self {
            Self::Ets2 => "eut2",
            Self::Ats => "ats",
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Self::Ets2 => "ETS2",
            Self::Ats => "ATS",
        }
    }
}

/// Identity the host reports at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInfo {
    pub game_id: String,
    pub version: GameVersion,
}

impl GameInfo {
    pub fn new(game_id: impl Into<String>, version: GameVersion) -> Self {
        Self {
            game_id: game_id.into(),
            version,
        }
    }

    /// Classify the game and log a warning for anything but a supported
    /// version. Never fatal.
    pub fn check(&self) -> GameCompatibility {
        let Some(game) = TruckGame::from_game_id(&self.game_id) else {
            warn!(game_id = %self.game_id, "Unknown game, some features might not work");
            return GameCompatibility::Unknown;
        };

        if self.version < GameVersion::V1_00 {
            warn!(game = game.short_name(), version = %self.version, "Game version too old, some features might not work");
            GameCompatibility::TooOld(game)
        } else if self.version.major() > SUPPORTED_MAJOR_VERSION {
            warn!(game = game.short_name(), version = %self.version, "Game version too new, some features might not work");
            GameCompatibility::TooNew(game)
        } else {
            GameCompatibility::Supported(game)
        }
    }
}

/// Result of [`GameInfo::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCompatibility {
    Supported(TruckGame),
    TooOld(TruckGame),
    TooNew(TruckGame),
    Unknown,
}

impl GameCompatibility {
    pub fn game(self) -> Option<TruckGame> {
        match self {
            Self::Supported(g) | Self::TooOld(g) | Self::TooNew(g) => Some(g),
            Self::Unknown => None,
        }
    }
}

/// One host callback.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent<'a> {
    FrameStart(FrameStart),
    FrameEnd,
    Paused,
    Started,
    Channel {
        name: &'a str,
        value: TelemetryValue,
    },
}

/// Translates host callbacks into [`ControlLoop`] calls.
#[derive(Debug)]
pub struct HostAdapter {
    control: ControlLoop,
    game: Option<TruckGame>,
}

impl HostAdapter {
    /// Check the game, then initialize `control` against `port`.
    ///
    /// # Errors
    ///
    /// Any wheel discovery or initialization failure from
    /// [`ControlLoop::initialize`].
    pub fn init(
        game: &GameInfo,
        mut control: ControlLoop,
        port: &dyn HidPort,
    ) -> Result<Self, TruckFfbError> {
        info!(version = env!("CARGO_PKG_VERSION"), "Starting initialization");
        let compatibility = game.check();
        control.initialize(port)?;
        info!("Initialization successful");
        Ok(Self {
            control,
            game: compatibility.game(),
        })
    }

    pub fn game(&self) -> Option<TruckGame> {
        self.game
    }

    pub fn control(&self) -> &ControlLoop {
        &self.control
    }

    pub fn control_mut(&mut self) -> &mut ControlLoop {
        &mut self.control
    }

    /// Forward one event. Frame ends return the tick report.
    pub fn handle(&mut self, event: HostEvent<'_>) -> Option<TickReport> {
        match event {
            HostEvent::FrameStart(frame) => {
                self.control.on_frame_start(&frame);
                None
            }
            HostEvent::FrameEnd => Some(self.control.advance()),
            HostEvent::Paused => {
                self.control.set_paused(true);
                None
            }
            HostEvent::Started => {
                self.control.set_paused(false);
                None
            }
            HostEvent::Channel { name, value } => {
                self.control.store_named(name, value);
                None
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.control.shutdown();
    }
}
