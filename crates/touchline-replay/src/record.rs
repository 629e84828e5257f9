//! Record layouts and the stateless encode/decode of the four record
//! kinds.
//!
//! Four record kinds share the buffer: Frame, Sprite, Stats and Sfx.
//! A record's leading word carries the kind in its top three bits —
//! except for frames, which are never tag-dispatched: the caller
//! always reaches a frame through its link offsets, so a frame's
//! leading word is free to hold the next-frame link. Within a frame,
//! the leading word of each object record disambiguates: the stats
//! bit implies 8 words, the sfx bit 1 word, anything else is a sprite
//! index followed by two coordinates.
//!
//! The packed-bit tricks live entirely in this module; callers see
//! [`FrameData`] and the [`ReplayObject`] variants.

use touchline_core::{GameTime, MatchStats, TeamStats};

use crate::buffer::{RecordBuffer, Word};

/// Words in a Frame record.
pub const FRAME_WORDS: u32 = 6;
/// Words in a Sprite record.
pub const SPRITE_WORDS: u32 = 3;
/// Words in a Stats record (two 4-word team groups).
pub const STATS_WORDS: u32 = 8;
/// Words in an Sfx record.
pub const SFX_WORDS: u32 = 1;

/// Offset of the next-frame link within a Frame record.
pub const NEXT_LINK: u32 = 0;
/// Offset of the previous-frame link within a Frame record.
pub const PREV_LINK: u32 = 1;

/// Link value meaning "no such frame".
pub const NO_FRAME: i32 = -1;

/// Top three bits of an object record's leading word.
pub const OBJECT_TAG_MASK: u32 = 0b111 << 29;
/// Tag bit marking a Stats record.
pub const STATS_TAG: u32 = 1 << 31;
/// Tag bit marking an Sfx record.
pub const SFX_TAG: u32 = 1 << 30;

/// One simulated tick's camera position, score and clock.
///
/// Anchors the object records that follow it in the buffer, up to the
/// offset named by its next-frame link.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameData {
    /// Camera x position.
    pub camera_x: f32,
    /// Camera y position.
    pub camera_y: f32,
    /// Home team goals at this tick.
    pub team1_goals: u16,
    /// Away team goals at this tick.
    pub team2_goals: u16,
    /// Game clock, [`GameTime::UNKNOWN`] when unavailable.
    pub time: GameTime,
}

/// A decoded object record: everything within a frame that is not the
/// frame itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReplayObject {
    /// A visible object at this tick.
    Sprite {
        /// Sprite sheet index. Must leave the tag bits clear.
        picture_index: u32,
        /// On-pitch x position.
        x: f32,
        /// On-pitch y position.
        y: f32,
    },
    /// Match statistics for both teams.
    Stats(MatchStats),
    /// A sound cue.
    Sfx {
        /// Sample index.
        sample_index: u8,
        /// Playback volume.
        volume: u16,
    },
}

/// Object record kind, read off a leading word's tag bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    /// Sprite record (no tag bit set).
    Sprite,
    /// Stats record.
    Stats,
    /// Sfx record.
    Sfx,
}

impl ObjectKind {
    /// Classify the leading word of an object record.
    pub fn classify(leading: Word) -> Self {
        match leading.bits() & OBJECT_TAG_MASK {
            bits if bits & STATS_TAG != 0 => Self::Stats,
            bits if bits & SFX_TAG != 0 => Self::Sfx,
            _ => Self::Sprite,
        }
    }

    /// Total words in a record of this kind.
    pub fn words(self) -> u32 {
        match self {
            Self::Sprite => SPRITE_WORDS,
            Self::Stats => STATS_WORDS,
            Self::Sfx => SFX_WORDS,
        }
    }
}

// ── Encoding ────────────────────────────────────────────────────

/// Append a Frame record with the given link offsets.
///
/// # Panics
///
/// Panics if the frame's clock value is not representable.
pub fn encode_frame(buf: &mut RecordBuffer, frame: &FrameData, next: u32, prev: i32) {
    assert!(frame.time.is_valid(), "unrepresentable game time");

    buf.push(Word::from_i32(next as i32));
    buf.push(Word::from_i32(prev));
    buf.push(Word::from_f32(frame.camera_x));
    buf.push(Word::from_f32(frame.camera_y));
    buf.push(Word::from_bits(
        frame.team1_goals as u32 | (frame.team2_goals as u32) << 16,
    ));
    buf.push(Word::from_i32(frame.time.raw()));
}

/// Append a Sprite record.
///
/// # Panics
///
/// Panics if `picture_index` collides with the tag bits.
pub fn encode_sprite(buf: &mut RecordBuffer, picture_index: u32, x: f32, y: f32) {
    assert_eq!(
        picture_index & OBJECT_TAG_MASK,
        0,
        "sprite index {picture_index:#x} collides with record tags"
    );

    buf.push(Word::from_bits(picture_index));
    buf.push(Word::from_f32(x));
    buf.push(Word::from_f32(y));
}

/// Append a Stats record: two 4-word groups, counters packed two per
/// word, tag bit only on the very first word.
///
/// # Panics
///
/// Panics if a team's `goal_attempts` counter collides with the tag
/// bits of the group's leading word.
pub fn encode_stats(buf: &mut RecordBuffer, stats: &MatchStats) {
    let mut tag = STATS_TAG;
    for team in [&stats.team1, &stats.team2] {
        assert_eq!(
            (team.goal_attempts as u32) << 16 & OBJECT_TAG_MASK,
            0,
            "goal attempts counter {} collides with record tags",
            team.goal_attempts
        );

        buf.push(Word::from_bits(
            tag | team.ball_possession as u32 | (team.goal_attempts as u32) << 16,
        ));
        buf.push(Word::from_bits(
            team.on_target as u32 | (team.corners_won as u32) << 16,
        ));
        buf.push(Word::from_bits(
            team.fouls_conceded as u32 | (team.bookings as u32) << 16,
        ));
        buf.push(Word::from_bits(team.sendings_off as u32));
        tag = 0;
    }
}

/// Append an Sfx record: sample index and volume packed into one word.
///
/// # Panics
///
/// Panics if the packed volume collides with the tag bits.
pub fn encode_sfx(buf: &mut RecordBuffer, sample_index: u8, volume: u16) {
    let packed = sample_index as u32 | (volume as u32) << 8;
    assert_eq!(
        packed & OBJECT_TAG_MASK,
        0,
        "sfx volume {volume} collides with record tags"
    );

    buf.push(Word::from_bits(SFX_TAG | packed));
}

// ── Decoding ────────────────────────────────────────────────────

/// Read the next-frame link of the Frame record at `offset`.
pub fn next_link(buf: &RecordBuffer, offset: u32) -> i32 {
    buf.get(offset + NEXT_LINK).as_i32()
}

/// Read the previous-frame link of the Frame record at `offset`.
pub fn prev_link(buf: &RecordBuffer, offset: u32) -> i32 {
    buf.get(offset + PREV_LINK).as_i32()
}

/// Decode the Frame record at `offset`, links excluded.
///
/// The caller has already consumed the links and checked that all
/// [`FRAME_WORDS`] words are in range.
pub fn decode_frame(buf: &RecordBuffer, offset: u32) -> FrameData {
    let goals = buf.get(offset + 4).bits();
    FrameData {
        camera_x: buf.get(offset + 2).as_f32(),
        camera_y: buf.get(offset + 3).as_f32(),
        team1_goals: (goals & 0xffff) as u16,
        team2_goals: (goals >> 16) as u16,
        time: GameTime::from_raw(buf.get(offset + 5).as_i32()),
    }
}

/// Decode the object record at `offset`.
///
/// The caller has classified the record and checked that all of its
/// words are in range.
pub fn decode_object(buf: &RecordBuffer, offset: u32) -> ReplayObject {
    match ObjectKind::classify(buf.get(offset)) {
        ObjectKind::Stats => {
            let mut teams = [TeamStats::default(); 2];
            for (i, team) in teams.iter_mut().enumerate() {
                let base = offset + 4 * i as u32;
                let w0 = buf.get(base).bits();
                let w1 = buf.get(base + 1).bits();
                let w2 = buf.get(base + 2).bits();
                team.ball_possession = (w0 & 0xffff) as u16;
                team.goal_attempts = ((w0 & !OBJECT_TAG_MASK) >> 16) as u16;
                team.on_target = (w1 & 0xffff) as u16;
                team.corners_won = (w1 >> 16) as u16;
                team.fouls_conceded = (w2 & 0xffff) as u16;
                team.bookings = (w2 >> 16) as u16;
                team.sendings_off = (buf.get(base + 3).bits() & 0xffff) as u16;
            }
            ReplayObject::Stats(MatchStats {
                team1: teams[0],
                team2: teams[1],
            })
        }
        ObjectKind::Sfx => {
            let packed = buf.get(offset).bits() & !OBJECT_TAG_MASK;
            ReplayObject::Sfx {
                sample_index: (packed & 0xff) as u8,
                volume: (packed >> 8) as u16,
            }
        }
        ObjectKind::Sprite => ReplayObject::Sprite {
            picture_index: buf.get(offset).bits() & !OBJECT_TAG_MASK,
            x: buf.get(offset + 1).as_f32(),
            y: buf.get(offset + 2).as_f32(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_team_stats() -> impl Strategy<Value = TeamStats> {
        (
            0u16..=100,
            0u16..0x2000,
            0u16..200,
            0u16..100,
            0u16..100,
            0u16..12,
            0u16..6,
        )
            .prop_map(
                |(
                    ball_possession,
                    goal_attempts,
                    on_target,
                    corners_won,
                    fouls_conceded,
                    bookings,
                    sendings_off,
                )| TeamStats {
                    ball_possession,
                    goal_attempts,
                    on_target,
                    corners_won,
                    fouls_conceded,
                    bookings,
                    sendings_off,
                },
            )
    }

    #[test]
    fn frame_layout_is_six_words() {
        let mut buf = RecordBuffer::new();
        let frame = FrameData {
            camera_x: 176.0,
            camera_y: 349.0,
            team1_goals: 2,
            team2_goals: 1,
            time: GameTime::from_minutes(89),
        };
        encode_frame(&mut buf, &frame, 6, NO_FRAME);

        assert_eq!(buf.len(), FRAME_WORDS);
        assert_eq!(next_link(&buf, 0), 6);
        assert_eq!(prev_link(&buf, 0), NO_FRAME);
        assert_eq!(decode_frame(&buf, 0), frame);
    }

    #[test]
    fn tag_bits_distinguish_object_kinds() {
        let mut buf = RecordBuffer::new();
        encode_sprite(&mut buf, 1375, -3.0, 41.5);
        encode_stats(&mut buf, &MatchStats::default());
        encode_sfx(&mut buf, 12, 96);

        assert_eq!(ObjectKind::classify(buf.get(0)), ObjectKind::Sprite);
        assert_eq!(ObjectKind::classify(buf.get(3)), ObjectKind::Stats);
        // The second team group of a stats record carries no tag;
        // only frame-scoped scanning ever lands on word 7.
        assert_eq!(ObjectKind::classify(buf.get(11)), ObjectKind::Sfx);
    }

    #[test]
    fn sfx_packs_sample_and_volume() {
        let mut buf = RecordBuffer::new();
        encode_sfx(&mut buf, 0xAB, 0x1234);
        assert_eq!(
            decode_object(&buf, 0),
            ReplayObject::Sfx {
                sample_index: 0xAB,
                volume: 0x1234,
            }
        );
    }

    #[test]
    #[should_panic]
    fn tagged_sprite_index_rejected() {
        let mut buf = RecordBuffer::new();
        encode_sprite(&mut buf, SFX_TAG, 0.0, 0.0);
    }

    proptest! {
        #[test]
        fn roundtrip_sprite(index in 0u32..(1 << 29), x in -2000.0f32..2000.0, y in -2000.0f32..2000.0) {
            let mut buf = RecordBuffer::new();
            encode_sprite(&mut buf, index, x, y);
            prop_assert_eq!(
                decode_object(&buf, 0),
                ReplayObject::Sprite { picture_index: index, x, y }
            );
        }

        #[test]
        fn roundtrip_stats(team1 in arb_team_stats(), team2 in arb_team_stats()) {
            let stats = MatchStats { team1, team2 };
            let mut buf = RecordBuffer::new();
            encode_stats(&mut buf, &stats);
            prop_assert_eq!(buf.len(), STATS_WORDS);
            prop_assert_eq!(decode_object(&buf, 0), ReplayObject::Stats(stats));
        }
    }
}
