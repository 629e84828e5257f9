//! Conversion of legacy (version 1) payloads into the current record
//! layout.
//!
//! The legacy payload has no frame links and no scene table. It is a
//! sequence of fixed ring-buffer windows; within a window, a word with
//! the sign bit set opens a three-word frame group, a non-negative
//! word is one packed sprite, and `-1` marks the end of the recorded
//! data. Reading wraps at the window edge, because the original
//! recorder wrote each window as a ring and saved it without
//! straightening it out first.
//!
//! Conversion replays the legacy records through the normal recorder,
//! so the converted log is indistinguishable from a fresh recording:
//! linked frames, and for a highlights file one saved scene per legacy
//! window.

use crate::buffer::Word;
use crate::file::FileKind;
use crate::record::FrameData;
use crate::storage::ReplayLog;
use touchline_core::GameTime;

/// Words per legacy window (19000 bytes).
pub const LEGACY_WINDOW_WORDS: usize = 19_000 / 4;

/// Convert a legacy payload into `log`, which must already be in a
/// fresh legacy-marked recording session.
///
/// Windows in which no frame group can be found are logged and
/// skipped; everything recoverable is kept.
pub fn convert_payload(words: &[Word], kind: FileKind, log: &mut ReplayLog) {
    let mut window_start = 0usize;
    let mut window_no = 0u32;

    while window_start < words.len() {
        let window_end = match kind {
            FileKind::Replay => words.len(),
            FileKind::Highlights => words.len().min(window_start + LEGACY_WINDOW_WORDS),
        };

        let mut current = window_start;
        match find_frame_start(words, &mut current, window_end) {
            None => {
                log::warn!("no frame group in legacy window {window_no}, skipping");
            }
            Some(scanned) => {
                let mut processed = scanned;
                let window_len = window_end - window_start;
                let mut rec = log.recorder();
                while processed < window_len && words[current].as_i32() != -1 {
                    processed += if words[current].as_i32() < 0 {
                        convert_frame(words, &mut current, window_start, window_end, &mut rec)
                    } else {
                        convert_sprite(words, &mut current, window_start, window_end, &mut rec)
                    };
                }
                if kind == FileKind::Replay {
                    break;
                }
                rec.save_scene();
            }
        }

        window_start += LEGACY_WINDOW_WORDS;
        window_no += 1;
    }

    log::info!(
        "converted legacy payload: {} words in, {} words out, {} scenes",
        words.len(),
        log.total_words(),
        log.num_scenes()
    );
}

/// Advance `current` to the first frame group word (sign bit set,
/// not the `-1` end marker) before `window_end`.
///
/// Returns the number of words scanned past, or `None` if the window
/// holds no frame group.
fn find_frame_start(words: &[Word], current: &mut usize, window_end: usize) -> Option<usize> {
    let start = *current;
    while *current < window_end {
        let v = words[*current].as_i32();
        if v < 0 && v != -1 {
            return Some(*current - start);
        }
        *current += 1;
    }
    None
}

/// Convert one three-word legacy frame group. Returns the number of
/// legacy words consumed.
fn convert_frame(
    words: &[Word],
    current: &mut usize,
    window_start: usize,
    window_end: usize,
    rec: &mut crate::storage::Recorder<'_>,
) -> usize {
    // Word 1: packed camera, sign bit doubling as the group marker.
    let w = words[*current].as_i32();
    let camera_x = (w & 0xffff) as f32;
    let camera_y = (w >> 16 & 0x7fff) as f32;
    wrapped_inc(current, window_start, window_end);

    // Word 2: goals.
    let goals = words[*current].bits();
    wrapped_inc(current, window_start, window_end);

    // Word 3: animated pitch patterns, which the current renderer
    // derives from the clock instead. The legacy format never stored
    // the clock itself.
    wrapped_inc(current, window_start, window_end);

    rec.record_frame(&FrameData {
        camera_x,
        camera_y,
        team1_goals: (goals & 0xffff) as u16,
        team2_goals: (goals >> 16) as u16,
        time: GameTime::UNKNOWN,
    });
    3
}

/// Convert one packed legacy sprite word. Returns the number of
/// legacy words consumed.
fn convert_sprite(
    words: &[Word],
    current: &mut usize,
    window_start: usize,
    window_end: usize,
    rec: &mut crate::storage::Recorder<'_>,
) -> usize {
    let packed = words[*current].bits();
    let picture_index = packed >> 20;
    let x = sign_extend_10(packed >> 10 & 0x3ff);
    let y = sign_extend_10(packed & 0x3ff);
    rec.record_sprite(picture_index, x as f32, y as f32);

    wrapped_inc(current, window_start, window_end);
    1
}

/// Step one word forward, wrapping to the window start at the end —
/// legacy windows are rings.
fn wrapped_inc(current: &mut usize, window_start: usize, window_end: usize) {
    *current += 1;
    if *current >= window_end {
        *current = window_start;
    }
}

/// Sign-extend a 10-bit field.
fn sign_extend_10(v: u32) -> i32 {
    (v as i32) << 22 >> 22
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ReplayObject;

    fn legacy_frame_word(camera_x: u16, camera_y: u16) -> Word {
        // Sign bit marks the frame group.
        Word::from_bits(1 << 31 | (camera_y as u32 & 0x7fff) << 16 | camera_x as u32)
    }

    fn legacy_sprite_word(index: u32, x: i32, y: i32) -> Word {
        Word::from_bits(index << 20 | (x as u32 & 0x3ff) << 10 | (y as u32 & 0x3ff))
    }

    fn end_marker() -> Word {
        Word::from_i32(-1)
    }

    #[test]
    fn sign_extension_of_sprite_coordinates() {
        assert_eq!(sign_extend_10(0x3ff), -1);
        assert_eq!(sign_extend_10(0x200), -512);
        assert_eq!(sign_extend_10(0x1ff), 511);
        assert_eq!(sign_extend_10(0), 0);
    }

    #[test]
    fn converts_frames_and_sprites_in_order() {
        let words = vec![
            legacy_frame_word(320, 200),
            Word::from_bits(2 | 1 << 16), // 2-1
            Word::from_bits(0),           // pitch patterns
            legacy_sprite_word(113, -20, 431),
            legacy_sprite_word(7, 511, -512),
            end_marker(),
        ];

        let mut log = ReplayLog::new();
        log.start_recording(true);
        convert_payload(&words, FileKind::Replay, &mut log);

        assert!(log.is_legacy_format());
        assert_eq!(log.num_scenes(), 0);

        let mut player = log.play_all();
        let frame = player.fetch_frame().expect("converted frame");
        assert_eq!(frame.camera_x, 320.0);
        assert_eq!(frame.camera_y, 200.0);
        assert_eq!(frame.team1_goals, 2);
        assert_eq!(frame.team2_goals, 1);
        assert_eq!(frame.time, GameTime::UNKNOWN);

        assert_eq!(
            player.fetch_object(),
            Some(ReplayObject::Sprite {
                picture_index: 113,
                x: -20.0,
                y: 431.0,
            })
        );
        assert_eq!(
            player.fetch_object(),
            Some(ReplayObject::Sprite {
                picture_index: 7,
                x: 511.0,
                y: -512.0,
            })
        );
        assert_eq!(player.fetch_object(), None);
        assert_eq!(player.fetch_frame(), None);
    }

    #[test]
    fn highlights_windows_become_scenes() {
        // Two windows, one frame plus one sprite each, rest of the
        // window filled with end markers.
        let mut words = Vec::new();
        for _ in 0..2 {
            let base = words.len();
            words.push(legacy_frame_word(10, 20));
            words.push(Word::from_bits(0));
            words.push(Word::from_bits(0));
            words.push(legacy_sprite_word(5, 1, 2));
            words.push(end_marker());
            words.resize(base + LEGACY_WINDOW_WORDS, end_marker());
        }

        let mut log = ReplayLog::new();
        log.start_recording(true);
        convert_payload(&words, FileKind::Highlights, &mut log);

        assert_eq!(log.num_scenes(), 2);
        for i in 0..2 {
            let mut player = log.play_scene(i);
            assert!(player.fetch_frame().is_some());
            assert!(matches!(
                player.fetch_object(),
                Some(ReplayObject::Sprite { picture_index: 5, .. })
            ));
            assert_eq!(player.fetch_frame(), None);
        }
    }

    #[test]
    fn frame_group_wraps_at_window_edge() {
        // The ring rolled over mid-frame: the frame's camera word is
        // the last word of the window, goals and patterns wrapped to
        // the front.
        let mut words = vec![end_marker(); LEGACY_WINDOW_WORDS];
        words[0] = Word::from_bits(3); // goals 3-0, wrapped
        words[1] = Word::from_bits(0); // patterns, wrapped
        words[LEGACY_WINDOW_WORDS - 1] = legacy_frame_word(64, 48);

        let mut log = ReplayLog::new();
        log.start_recording(true);
        convert_payload(&words, FileKind::Highlights, &mut log);

        assert_eq!(log.num_scenes(), 1);
        let mut player = log.play_scene(0);
        let frame = player.fetch_frame().expect("wrapped frame");
        assert_eq!(frame.camera_x, 64.0);
        assert_eq!(frame.team1_goals, 3);
    }

    #[test]
    fn wrapped_frame_does_not_disturb_next_window() {
        // A frame group split across the edge of window one wraps
        // within that window; window two converts independently and
        // keeps its own records intact.
        let mut words = vec![end_marker(); 2 * LEGACY_WINDOW_WORDS];
        words[0] = Word::from_bits(1 | 2 << 16); // wrapped goals, 1-2
        words[1] = Word::from_bits(0); // wrapped patterns
        words[LEGACY_WINDOW_WORDS - 1] = legacy_frame_word(90, 60);

        let base = LEGACY_WINDOW_WORDS;
        words[base] = legacy_frame_word(400, 300);
        words[base + 1] = Word::from_bits(0);
        words[base + 2] = Word::from_bits(0);
        words[base + 3] = legacy_sprite_word(42, 8, -8);

        let mut log = ReplayLog::new();
        log.start_recording(true);
        convert_payload(&words, FileKind::Highlights, &mut log);
        assert_eq!(log.num_scenes(), 2);

        let mut player = log.play_scene(0);
        let frame = player.fetch_frame().expect("wrapped frame");
        assert_eq!(frame.camera_x, 90.0);
        assert_eq!(frame.team1_goals, 1);
        assert_eq!(frame.team2_goals, 2);

        let mut player = log.play_scene(1);
        let frame = player.fetch_frame().expect("second window frame");
        assert_eq!(frame.camera_x, 400.0);
        assert_eq!(frame.camera_y, 300.0);
        assert_eq!(
            player.fetch_object(),
            Some(ReplayObject::Sprite {
                picture_index: 42,
                x: 8.0,
                y: -8.0,
            })
        );
    }

    #[test]
    fn window_without_frames_is_skipped() {
        // First window is all end markers, second has a real frame.
        let mut words = vec![end_marker(); LEGACY_WINDOW_WORDS];
        words.push(legacy_frame_word(1, 1));
        words.push(Word::from_bits(0));
        words.push(Word::from_bits(0));
        words.push(end_marker());

        let mut log = ReplayLog::new();
        log.start_recording(true);
        convert_payload(&words, FileKind::Highlights, &mut log);

        assert_eq!(log.num_scenes(), 1);
    }
}
