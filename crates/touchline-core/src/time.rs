//! The packed game-time word.

use std::fmt;

/// Game clock value as recorded in a replay frame.
///
/// The on-wire encoding packs the minute count as decimal digits:
/// bits 0–7 hold the ones digit, bits 8–15 the tens digit, and bits
/// 16 and up any minutes beyond 99 (extra time in long matches). The
/// value `-1` means the clock was not available, which is the case for
/// every frame recovered from a legacy file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GameTime(i32);

/// Longest match the clock can represent, in minutes.
pub const MAX_MINUTES: u32 = 120;

impl GameTime {
    /// The clock was not recorded.
    pub const UNKNOWN: GameTime = GameTime(-1);

    /// Pack a minute count.
    ///
    /// # Panics
    ///
    /// Panics if `minutes` exceeds [`MAX_MINUTES`].
    pub fn from_minutes(minutes: u32) -> Self {
        assert!(minutes <= MAX_MINUTES, "game time out of range: {minutes}");
        let hundreds = minutes / 100;
        let tens = minutes % 100 / 10;
        let ones = minutes % 10;
        Self((hundreds << 16 | tens << 8 | ones) as i32)
    }

    /// Reinterpret a raw packed word, as read from a replay.
    pub fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw packed word, as written into a replay.
    pub fn raw(self) -> i32 {
        self.0
    }

    /// Unpack the minute count, or `None` for [`GameTime::UNKNOWN`].
    pub fn minutes(self) -> Option<u32> {
        if self.0 == -1 {
            return None;
        }
        let raw = self.0 as u32;
        Some((raw & 0xff) + 10 * (raw >> 8 & 0xff) + (raw >> 16))
    }

    /// Whether the packed digits describe a representable clock value.
    pub fn is_valid(self) -> bool {
        match self.minutes() {
            None => true,
            Some(m) => m <= MAX_MINUTES,
        }
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minutes() {
            Some(m) => write!(f, "{m}'"),
            None => write!(f, "--'"),
        }
    }
}
