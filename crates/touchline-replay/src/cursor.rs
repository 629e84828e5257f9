//! Playback cursor over a bounded window of a replay log.
//!
//! A [`Player`] is transient state: a read offset, the `[start,
//! limit)` window it may move in, and the cached link offsets of the
//! frame being consumed. It borrows the log immutably, so a player
//! can never coexist with the recording handle.
//!
//! Seeking follows the frame links embedded in the payload, so moving
//! `n` frames costs `n` hops. Playback is sequential or short-hop
//! scrubbing in practice, never random-addressed, which keeps that
//! trade acceptable in exchange for a single flat buffer.

use crate::record::{
    decode_frame, decode_object, next_link, prev_link, FrameData, ObjectKind, ReplayObject,
    FRAME_WORDS, NO_FRAME,
};
use crate::storage::ReplayLog;

/// Read cursor for one playback window of a [`ReplayLog`].
///
/// Obtained from [`ReplayLog::play_all`], [`ReplayLog::play_scene`] or
/// [`ReplayLog::play_current_scene`]. The intended rhythm per
/// displayed frame is: [`Player::fetch_frame`], then
/// [`Player::fetch_object`] until it returns `None`, then optionally
/// [`Player::skip_frames`] to scrub.
pub struct Player<'a> {
    log: &'a ReplayLog,
    scene_index: Option<usize>,
    start: u32,
    offset: u32,
    limit: u32,
    /// Offset of the frame following the one last fetched. Equals
    /// `offset` while the cursor sits on an unfetched frame boundary.
    next_frame: u32,
    /// Offset of the frame last fetched, [`NO_FRAME`] before the
    /// first fetch.
    prev_frame: i32,
}

impl<'a> Player<'a> {
    pub(crate) fn new(log: &'a ReplayLog, scene_index: Option<usize>, start: u32, limit: u32) -> Self {
        assert!(start <= limit, "inverted playback window [{start}, {limit})");
        Self {
            log,
            scene_index,
            start,
            offset: start,
            limit,
            next_frame: start,
            prev_frame: NO_FRAME,
        }
    }

    /// Which stored scene this player was set up for, if any.
    ///
    /// `None` for whole-log playback and for the in-progress scene.
    pub fn scene_index(&self) -> Option<usize> {
        self.scene_index
    }

    /// Clamp of the window end to the recorded data.
    fn end(&self) -> u32 {
        self.limit.min(self.log.total_words())
    }

    /// Decode the frame at the cursor and advance past its header.
    ///
    /// Returns `None` when the window is exhausted or the frame would
    /// overrun it — "no more data", the normal end of playback.
    ///
    /// Frames are entered through the link chain: object words the
    /// caller left unconsumed are skipped over.
    pub fn fetch_frame(&mut self) -> Option<FrameData> {
        self.offset = self.offset.max(self.next_frame.min(self.limit));
        let end = self.end();
        if self.offset >= end || self.offset + FRAME_WORDS > end {
            return None;
        }

        let next = next_link(self.log.buffer(), self.offset);
        assert!(
            next >= (self.offset + FRAME_WORDS) as i32,
            "frame at {} declares next link {next} inside itself",
            self.offset
        );

        self.prev_frame = self.offset as i32;
        self.next_frame = next as u32;

        let frame = decode_frame(self.log.buffer(), self.offset);
        self.offset += FRAME_WORDS;
        Some(frame)
    }

    /// Decode the next object record of the current frame.
    ///
    /// Returns `None` once the cursor reaches the next frame's offset
    /// — "no more objects this frame" — or when a record would read
    /// past the window.
    pub fn fetch_object(&mut self) -> Option<ReplayObject> {
        let end = self.end().min(self.next_frame);
        if self.offset >= end {
            return None;
        }

        let kind = ObjectKind::classify(self.log.buffer().get(self.offset));
        let words = kind.words();
        if self.offset + words > self.next_frame || self.offset + words > self.end() {
            return None;
        }

        let object = decode_object(self.log.buffer(), self.offset);
        self.offset += words;
        Some(object)
    }

    /// Whether a complete frame (header and all) still fits between
    /// the cursor's next frame and the window end. Playback loops use
    /// this to decide when to stop before a truncated tail.
    pub fn has_another_full_frame(&self) -> bool {
        let end = self.end();
        if self.next_frame >= end || self.next_frame + FRAME_WORDS > end {
            return false;
        }
        let next = next_link(self.log.buffer(), self.next_frame);
        next >= 0 && next as u32 <= end
    }

    /// Move the cursor `n` frames: forward along next links for
    /// `n > 0`, backward along prev links for `n < 0`; `0` is a no-op.
    ///
    /// Both directions clamp at the window bounds: a forward seek
    /// stops on the last frame that starts below `limit`, a backward
    /// seek on the first frame at or after `start`. Clamping is
    /// idempotent — repeated unbounded backward seeks stay on the
    /// first frame.
    ///
    /// Seeking starts from a frame boundary: any object words left
    /// unconsumed in the current frame are skipped over first. The
    /// frame seeked to is left unfetched.
    pub fn skip_frames(&mut self, n: i32) {
        self.offset = self.offset.max(self.next_frame.min(self.limit));
        let end = self.end();

        if n > 0 {
            // The frame at the cursor has not been drawn yet, so it
            // already counts as the first of the n.
            let mut remaining = n - 1;
            while remaining > 0 && self.offset < end {
                let next = next_link(self.log.buffer(), self.offset);
                if next < 0 || next as u32 >= self.limit {
                    break;
                }
                self.offset = next as u32;
                remaining -= 1;
            }
        } else if n < 0 {
            let mut remaining = -n + 1;
            if self.offset >= end {
                // Past the last frame: snap back onto it first.
                if self.prev_frame < 0 {
                    return;
                }
                self.offset = self.prev_frame as u32;
                remaining -= 1;
            }
            while remaining > 0 {
                let prev = prev_link(self.log.buffer(), self.offset);
                if prev < self.start as i32 {
                    break;
                }
                self.offset = prev as u32;
                remaining -= 1;
            }
        }

        self.next_frame = self.offset;
    }

    /// How far through the window the cursor is, in percent. Consumed
    /// by the progress display during scrubbing.
    pub fn percentage(&self) -> f32 {
        assert!(
            self.offset >= self.start && self.offset <= self.limit,
            "cursor {} outside window [{}, {})",
            self.offset,
            self.start,
            self.limit
        );

        if self.offset >= self.limit {
            return 100.0;
        }
        (self.offset - self.start) as f32 / (self.limit - self.start) as f32 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ReplayLog;
    use touchline_core::GameTime;

    fn frame(minute: u32) -> FrameData {
        FrameData {
            camera_x: minute as f32,
            camera_y: 0.0,
            team1_goals: 0,
            team2_goals: 0,
            time: GameTime::from_minutes(minute),
        }
    }

    /// Record `n` frames, each with `sprites` sprite records.
    fn sample_log(n: u32, sprites: u32) -> ReplayLog {
        let mut log = ReplayLog::new();
        log.start_recording(false);
        let mut rec = log.recorder();
        for i in 0..n {
            rec.record_frame(&frame(i));
            for s in 0..sprites {
                rec.record_sprite(100 + s, s as f32, i as f32);
            }
        }
        log
    }

    #[test]
    fn sequential_fetch_walks_all_frames() {
        let log = sample_log(4, 2);
        let mut player = log.play_all();

        for i in 0..4 {
            let f = player.fetch_frame().expect("frame present");
            assert_eq!(f.time, GameTime::from_minutes(i));
            assert!(matches!(
                player.fetch_object(),
                Some(ReplayObject::Sprite { picture_index: 100, .. })
            ));
            assert!(matches!(
                player.fetch_object(),
                Some(ReplayObject::Sprite { picture_index: 101, .. })
            ));
            assert_eq!(player.fetch_object(), None);
        }
        assert_eq!(player.fetch_frame(), None);
        assert_eq!(player.percentage(), 100.0);
    }

    #[test]
    fn object_fetch_stops_at_next_frame() {
        let log = sample_log(2, 3);
        let mut player = log.play_all();

        player.fetch_frame().unwrap();
        let mut objects = 0;
        while player.fetch_object().is_some() {
            objects += 1;
        }
        assert_eq!(objects, 3);

        // The stop is the frame boundary, not the end of data.
        assert!(player.fetch_frame().is_some());
    }

    #[test]
    fn forward_skip_clamps_at_last_frame() {
        // Scenario: five-frame seek with only two frames left.
        let log = sample_log(2, 0);
        let mut player = log.play_all();

        player.skip_frames(5);
        let f = player.fetch_frame().expect("clamped to a real frame");
        assert_eq!(f.time, GameTime::from_minutes(1));
        assert_eq!(player.fetch_frame(), None);
    }

    #[test]
    fn seek_symmetry_over_fetch() {
        let log = sample_log(6, 1);
        let mut player = log.play_all();

        // Display frames 0 and 1.
        for _ in 0..2 {
            player.fetch_frame().unwrap();
            while player.fetch_object().is_some() {}
        }

        // Jump two frames ahead of the last displayed frame...
        player.skip_frames(2);
        let ahead = player.fetch_frame().unwrap();
        assert_eq!(ahead.time, GameTime::from_minutes(3));
        while player.fetch_object().is_some() {}

        // ...and two back lands on the originally displayed content.
        player.skip_frames(-2);
        let back = player.fetch_frame().unwrap();
        assert_eq!(back.time, GameTime::from_minutes(1));
    }

    #[test]
    fn fetch_frame_skips_unconsumed_objects() {
        let log = sample_log(3, 2);
        let mut player = log.play_all();
        player.fetch_frame().unwrap();

        // Both sprites left unread: the next fetch still lands on the
        // second frame, not on a sprite word.
        let f = player.fetch_frame().expect("second frame");
        assert_eq!(f.time, GameTime::from_minutes(1));

        player.fetch_frame().unwrap();
        assert!(player.fetch_object().is_some());
        // One object still pending; seeking moves whole frames.
        player.skip_frames(-2);
        let back = player.fetch_frame().expect("first frame");
        assert_eq!(back.time, GameTime::from_minutes(0));
    }

    #[test]
    fn backward_clamp_is_idempotent() {
        let log = sample_log(3, 1);
        let mut player = log.play_all();
        player.fetch_frame().unwrap();
        while player.fetch_object().is_some() {}

        for _ in 0..4 {
            player.skip_frames(-100);
            let f = player.fetch_frame().expect("first frame");
            assert_eq!(f.time, GameTime::from_minutes(0));
            while player.fetch_object().is_some() {}
        }
    }

    #[test]
    fn backward_skip_past_end_snaps_to_last_frame() {
        let log = sample_log(3, 0);
        let mut player = log.play_all();
        while player.fetch_frame().is_some() {}
        assert_eq!(player.percentage(), 100.0);

        player.skip_frames(-1);
        let f = player.fetch_frame().expect("snapped back");
        assert_eq!(f.time, GameTime::from_minutes(1));
    }

    #[test]
    fn skip_on_empty_window_is_inert() {
        let log = ReplayLog::new();
        let mut player = log.play_current_scene();
        player.skip_frames(-3);
        player.skip_frames(2);
        assert_eq!(player.fetch_frame(), None);
    }

    #[test]
    fn percentage_tracks_window() {
        let log = sample_log(4, 0);
        let mut player = log.play_all();
        assert_eq!(player.percentage(), 0.0);

        player.fetch_frame().unwrap();
        let quarter = player.percentage();
        assert!((quarter - 25.0).abs() < 1e-3, "got {quarter}");
    }

    #[test]
    fn has_another_full_frame_lookahead() {
        let log = sample_log(2, 0);
        let mut player = log.play_all();
        assert!(player.has_another_full_frame());

        player.fetch_frame().unwrap();
        // Next frame is the last; its own next link points to the end.
        assert!(player.has_another_full_frame());
        player.fetch_frame().unwrap();
        assert!(!player.has_another_full_frame());
    }
}
