//! The replay log facade: owns the record buffer and scene table and
//! hands out the recording and playback handles.
//!
//! A log is either being recorded or being played, never both. That
//! rule is enforced by the borrow checker rather than a runtime flag:
//! [`ReplayLog::recorder`] borrows the log mutably and exposes only
//! append operations, the `play_*` methods borrow it immutably and
//! expose only cursor operations. Dropping the handle is the mode
//! switch.

use crate::buffer::{RecordBuffer, Word};
use crate::cursor::Player;
use crate::record::{
    encode_frame, encode_sfx, encode_sprite, encode_stats, next_link, FrameData, FRAME_WORDS,
    NEXT_LINK, NO_FRAME, PREV_LINK, SFX_WORDS, SPRITE_WORDS, STATS_WORDS,
};
use crate::scene::{SceneSpan, SceneTable};
use touchline_core::MatchStats;

/// Words reserved up front for a full match, so steady-state
/// recording never reallocates.
pub const INITIAL_CAPACITY: usize = 4_500_000;

/// Word budget for the in-progress scene. Once a scene grows past
/// this, its start is advanced frame by frame, bounding the memory a
/// single unsaved highlight can retain while the log as a whole keeps
/// growing.
pub const SCENE_WORD_BUDGET: u32 = 39_000;

/// The recorded replay: record buffer, scene table and format origin.
///
/// # Examples
///
/// ```
/// use touchline_replay::{FrameData, ReplayLog};
/// use touchline_core::GameTime;
///
/// let mut log = ReplayLog::new();
/// log.start_recording(false);
///
/// let mut rec = log.recorder();
/// rec.record_frame(&FrameData {
///     camera_x: 176.0,
///     camera_y: 349.0,
///     team1_goals: 0,
///     team2_goals: 0,
///     time: GameTime::from_minutes(12),
/// });
/// rec.record_sprite(1375, 80.0, -4.0);
/// rec.save_scene();
/// drop(rec);
///
/// assert_eq!(log.num_scenes(), 1);
/// let mut player = log.play_scene(0);
/// assert!(player.fetch_frame().is_some());
/// ```
#[derive(Clone, Debug)]
pub struct ReplayLog {
    data: RecordBuffer,
    scenes: SceneTable,
    legacy_format: bool,
    /// Offset of the frame currently being extended, [`NO_FRAME`]
    /// before the first frame of a session.
    current_frame: i32,
    /// Offset of the previous completed frame.
    previous_frame: i32,
    /// Start of the in-progress scene.
    scene_start: u32,
    /// End of the in-progress scene; always the end of recorded data
    /// while recording.
    scene_end: u32,
}

impl Default for ReplayLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayLog {
    /// An empty log with a full match's worth of reserved capacity.
    pub fn new() -> Self {
        Self {
            data: RecordBuffer::with_capacity(INITIAL_CAPACITY),
            scenes: SceneTable::new(),
            legacy_format: false,
            current_frame: NO_FRAME,
            previous_frame: NO_FRAME,
            scene_start: 0,
            scene_end: 0,
        }
    }

    /// Number of saved scenes.
    pub fn num_scenes(&self) -> usize {
        self.scenes.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether this log was loaded from a legacy-format file.
    pub fn is_legacy_format(&self) -> bool {
        self.legacy_format
    }

    /// Total words recorded.
    pub fn total_words(&self) -> u32 {
        self.data.len()
    }

    pub(crate) fn buffer(&self) -> &RecordBuffer {
        &self.data
    }

    pub(crate) fn scene_table(&self) -> &SceneTable {
        &self.scenes
    }

    /// Discard everything and begin a fresh recording session.
    ///
    /// `legacy_format` marks a session that re-encodes a legacy file,
    /// so callers can tell converted data from natively recorded data.
    pub fn start_recording(&mut self, legacy_format: bool) {
        self.data.clear();
        self.scenes.clear();
        self.legacy_format = legacy_format;
        self.current_frame = NO_FRAME;
        self.previous_frame = NO_FRAME;
        self.scene_start = 0;
        self.scene_end = 0;
    }

    /// The append handle. Exclusive: no player can exist while the
    /// recorder is alive.
    pub fn recorder(&mut self) -> Recorder<'_> {
        Recorder { log: self }
    }

    /// Player over the whole log.
    pub fn play_all(&self) -> Player<'_> {
        Player::new(self, None, 0, self.data.len())
    }

    /// Player over the stored scene at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn play_scene(&self, index: usize) -> Player<'_> {
        let span = self.scenes.get(index);
        Player::new(self, Some(index), span.start, span.end)
    }

    /// Player over the in-progress scene (the most recent passage of
    /// play, not yet saved).
    pub fn play_current_scene(&self) -> Player<'_> {
        assert!(
            self.scene_start <= self.scene_end && self.scene_end <= self.data.len(),
            "live scene [{}, {}) escapes the buffer of {} words",
            self.scene_start,
            self.scene_end,
            self.data.len()
        );
        Player::new(self, None, self.scene_start, self.scene_end)
    }

    /// Rebuild a log directly from loaded parts. Playback-ready;
    /// recording state is reset as if a session just ended.
    pub(crate) fn from_parts(data: RecordBuffer, scenes: SceneTable, legacy_format: bool) -> Self {
        let len = data.len();
        Self {
            data,
            scenes,
            legacy_format,
            current_frame: NO_FRAME,
            previous_frame: NO_FRAME,
            scene_start: len,
            scene_end: len,
        }
    }

    /// Whether a highlights save must run the fixup pass: the saved
    /// scene ranges are not already one contiguous block from offset
    /// zero (a consequence of the bounded-retention rule trimming the
    /// live scene between saves).
    pub(crate) fn highlights_need_fixup(&self) -> bool {
        !self.scenes.is_contiguous()
    }

    /// The compacted highlights payload: only the saved scene ranges,
    /// back to back, with every frame link re-derived so the written
    /// file is self-consistent even though memory was not.
    ///
    /// Scenes come out self-contained: the first frame of every scene
    /// gets a `prev` of "none" rather than a link into the previous
    /// scene, so each on-disk scene is independently valid.
    pub(crate) fn highlights_payload(&self) -> Vec<Word> {
        let total = self.scenes.total_len() as usize;
        let mut out = Vec::with_capacity(total);

        for span in self.scenes.iter() {
            let dst_base = out.len() as u32;
            out.extend_from_slice(
                &self.data.as_slice()[span.start as usize..span.end as usize],
            );

            // Scene ranges always begin on a frame boundary; walk the
            // frames via the original links and rebase both links of
            // each one.
            let diff = span.start as i64 - dst_base as i64;
            let mut prev = NO_FRAME;
            let mut at = span.start;
            while at < span.end {
                let old_next = next_link(&self.data, at);
                assert!(
                    old_next > at as i32 && old_next as u32 <= span.end,
                    "frame at {at} declares next link {old_next} outside scene [{}, {})",
                    span.start,
                    span.end
                );

                let rebased = at as u32 - span.start + dst_base;
                out[(rebased + NEXT_LINK) as usize] =
                    Word::from_i32((old_next as i64 - diff) as i32);
                out[(rebased + PREV_LINK) as usize] = Word::from_i32(prev);

                prev = rebased as i32;
                at = old_next as u32;
            }
        }

        assert_eq!(out.len(), total);
        out
    }
}

/// Append handle for a recording session.
///
/// One record per call; a Frame record opens a tick, and every
/// following object record extends that frame until the next
/// [`Recorder::record_frame`].
pub struct Recorder<'a> {
    log: &'a mut ReplayLog,
}

impl Recorder<'_> {
    /// Record one simulated tick's frame.
    ///
    /// The new frame's next link starts just past its own header and
    /// is extended by every object recorded after it; the previous
    /// frame's link fields are never touched again.
    pub fn record_frame(&mut self, frame: &FrameData) {
        self.begin_frame();

        let log = &mut *self.log;
        let next = log.data.len() + FRAME_WORDS;
        encode_frame(&mut log.data, frame, next, log.previous_frame);
    }

    /// Record a visible object for the current frame.
    pub fn record_sprite(&mut self, picture_index: u32, x: f32, y: f32) {
        self.extend_frame(SPRITE_WORDS);
        encode_sprite(&mut self.log.data, picture_index, x, y);
    }

    /// Record both teams' statistics for the current frame.
    pub fn record_stats(&mut self, stats: &MatchStats) {
        self.extend_frame(STATS_WORDS);
        encode_stats(&mut self.log.data, stats);
    }

    /// Record a sound cue for the current frame.
    pub fn record_sfx(&mut self, sample_index: u8, volume: u16) {
        self.extend_frame(SFX_WORDS);
        encode_sfx(&mut self.log.data, sample_index, volume);
    }

    /// Save the in-progress scene as a stored highlight and start the
    /// next scene where it ended.
    ///
    /// # Panics
    ///
    /// Panics if the scene is empty or would break the table's
    /// ordering invariant.
    pub fn save_scene(&mut self) {
        let log = &mut *self.log;
        log.scenes.push(SceneSpan {
            start: log.scene_start,
            end: log.scene_end,
        });
        log.scene_start = log.scene_end;
    }

    /// Frame-boundary bookkeeping: apply the scene word budget, then
    /// make the frame about to be appended the current one.
    fn begin_frame(&mut self) {
        let log = &mut *self.log;

        while log.scene_end - log.scene_start > SCENE_WORD_BUDGET {
            let next = next_link(&log.data, log.scene_start);
            assert!(
                next > log.scene_start as i32,
                "frame at {} has non-advancing next link {next}",
                log.scene_start
            );
            log.scene_start = next as u32;
            assert!(
                log.scene_start < log.data.len() && log.scene_end > log.scene_start,
                "scene trim ran past the recorded data"
            );
        }

        log.previous_frame = log.current_frame;
        log.current_frame = log.data.len() as i32;
        log.scene_end += FRAME_WORDS;
    }

    /// Object bookkeeping: bump the current frame's declared length
    /// and the live scene end.
    fn extend_frame(&mut self, words: u32) {
        let log = &mut *self.log;
        assert!(
            log.current_frame >= 0,
            "object recorded before any frame in this session"
        );
        log.data.add_to(log.current_frame as u32, words as i32);
        log.scene_end += words;
    }
}
