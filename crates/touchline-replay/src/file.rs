//! Whole-file load and save for replay and highlights files.
//!
//! Both file kinds share one layout: header, scene table, word
//! payload. Loading builds a complete scratch log first and installs
//! it only on success, so a failed load never disturbs the log the
//! caller already holds. Everything read from the stream is untrusted
//! and validated before use; only [`ReplayError::Corrupted`] or
//! [`ReplayError::Io`] come back for bad files, with
//! [`ReplayError::UnsupportedVersion`] reserved for files from a
//! newer release.

use std::io::{Read, Write};

use crate::buffer::{RecordBuffer, Word};
use crate::error::ReplayError;
use crate::header::{FileHeader, HEADER_LEN, LEGACY_HEADER_LEN, VERSION_MAJOR, VERSION_MINOR};
use crate::legacy;
use crate::record::{next_link, prev_link, FRAME_WORDS, NO_FRAME};
use crate::scene::{SceneSpan, SceneTable};
use crate::storage::ReplayLog;
use touchline_core::MatchInfo;

/// What a file holds: a full-match replay or a set of highlight
/// scenes. The two kinds differ in how scenes are written and in how
/// legacy payloads are segmented, not in their record layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// One continuous recording, scene table written as recorded.
    Replay,
    /// Saved scenes only; the payload is compacted to just those
    /// ranges.
    Highlights,
}

/// Bytes of one serialized scene table entry (start and end offsets).
const SCENE_ENTRY_LEN: usize = 8;

impl ReplayLog {
    /// Load a replay file, replacing the contents of `self`.
    ///
    /// Legacy files are converted to the current record layout on the
    /// way in. Header, scene table and the payload's frame links are
    /// all validated before anything is installed; on error `self` is
    /// left exactly as it was.
    ///
    /// Returns the decoded header; its `scene_count` reflects the log
    /// after any legacy conversion.
    pub fn load(&mut self, r: &mut impl Read, kind: FileKind) -> Result<FileHeader, ReplayError> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;

        let (header, scratch) = load_from_bytes(&bytes, kind)?;
        log::info!(
            "loaded {kind:?} file: format {}.{}, {} scenes, {} words",
            header.major,
            header.minor,
            scratch.num_scenes(),
            scratch.total_words()
        );
        *self = scratch;
        Ok(header)
    }

    /// Save the log as a current-format file.
    ///
    /// A `Replay` save writes the scene table and payload exactly as
    /// recorded. A `Highlights` save writes only the saved scenes:
    /// the table is rebased contiguous from zero and, when the
    /// in-memory ranges have gaps, the payload goes through the link
    /// fixup pass so the file is self-consistent.
    ///
    /// # Panics
    ///
    /// Panics if more scenes have been saved than the header's count
    /// field can carry.
    pub fn save(
        &self,
        w: &mut impl Write,
        info: &MatchInfo,
        kind: FileKind,
    ) -> Result<(), ReplayError> {
        let scene_count = self.num_scenes();
        assert!(
            scene_count <= u16::MAX as usize,
            "scene table of {scene_count} entries does not fit the header's count field"
        );
        let header = FileHeader {
            major: VERSION_MAJOR,
            minor: VERSION_MINOR,
            scene_count: scene_count as u16,
            payload_offset: (HEADER_LEN + scene_count * SCENE_ENTRY_LEN) as u32,
            info: info.clone(),
        };

        let mut out = Vec::new();
        header.encode(&mut out);

        match kind {
            FileKind::Replay => {
                encode_scene_table(self.scene_table(), &mut out);
                encode_words(self.buffer().as_slice(), &mut out);
            }
            FileKind::Highlights => {
                encode_scene_table(&self.scene_table().compacted(), &mut out);
                if self.highlights_need_fixup() {
                    encode_words(&self.highlights_payload(), &mut out);
                } else if let Some(last) = self.scene_table().last() {
                    encode_words(&self.buffer().as_slice()[..last.end as usize], &mut out);
                }
            }
        }

        w.write_all(&out)?;
        log::info!(
            "saved {kind:?} file: {} scenes, {} bytes",
            scene_count,
            out.len()
        );
        Ok(())
    }
}

fn load_from_bytes(bytes: &[u8], kind: FileKind) -> Result<(FileHeader, ReplayLog), ReplayError> {
    // Both header shapes must fit before anything is believed.
    if bytes.len() < HEADER_LEN.max(LEGACY_HEADER_LEN) {
        return Err(ReplayError::corrupted(format!(
            "file too short for a replay header: {} bytes",
            bytes.len()
        )));
    }

    let mut first8 = [0u8; 8];
    first8.copy_from_slice(&bytes[..8]);

    if FileHeader::probe_legacy(&first8) {
        let mut rest = &bytes[8..];
        let mut header = FileHeader::read_legacy(&mut rest)?;

        let words = words_from_bytes(&bytes[LEGACY_HEADER_LEN..])?;
        let mut scratch = ReplayLog::new();
        scratch.start_recording(true);
        legacy::convert_payload(&words, kind, &mut scratch);
        header.scene_count = scratch.num_scenes() as u16;
        return Ok((header, scratch));
    }

    let mut rest = &bytes[8..];
    let header =
        FileHeader::read_current(&first8, &mut rest).map_err(|e| truncated(e, "header"))?;

    let mut scenes = Vec::with_capacity(header.scene_count as usize);
    for _ in 0..header.scene_count {
        let start = crate::header::read_u32(&mut rest).map_err(|e| truncated(e, "scene table"))?;
        let end = crate::header::read_u32(&mut rest).map_err(|e| truncated(e, "scene table"))?;
        scenes.push((start, end));
    }

    let table_end = HEADER_LEN + header.scene_count as usize * SCENE_ENTRY_LEN;
    let payload_offset = header.payload_offset as usize;
    // Minor version bumps may grow the header; anything between the
    // scene table and the declared payload offset is skipped, but the
    // offset itself must be sane.
    if payload_offset < table_end || payload_offset > bytes.len() {
        return Err(ReplayError::corrupted(format!(
            "payload offset {payload_offset} outside file of {} bytes",
            bytes.len()
        )));
    }

    let payload = &bytes[payload_offset..];
    if payload.is_empty() {
        // A header with no payload is an empty recording, whatever
        // the scene count claims.
        return Ok((header, ReplayLog::new()));
    }

    let words = words_from_bytes(payload)?;
    let table = validate_scene_table(&scenes, words.len() as u32)?;

    let mut data = RecordBuffer::with_capacity(words.len());
    data.replace(words);
    validate_payload(&data, &table)?;
    Ok((header, ReplayLog::from_parts(data, table, false)))
}

/// Check a loaded scene table against the payload: in-order,
/// non-overlapping, non-empty, in range.
fn validate_scene_table(scenes: &[(u32, u32)], words: u32) -> Result<SceneTable, ReplayError> {
    let mut table = SceneTable::new();
    let mut previous_end = 0u32;
    for &(start, end) in scenes {
        if start >= end || start < previous_end || end > words {
            return Err(ReplayError::corrupted(format!(
                "scene [{start}, {end}) invalid in payload of {words} words"
            )));
        }
        table.push(SceneSpan { start, end });
        previous_end = end;
    }
    Ok(table)
}

/// Screen the loaded payload's frame links before any of them are
/// followed. The in-memory invariants are enforced with assertions,
/// so a file whose links would trip them must be rejected here.
///
/// The chain of next links must step monotonically through the whole
/// payload; every prev link must be "none" or an earlier frame
/// boundary of that chain; every scene range must begin on a boundary
/// and end on one (or at the payload end).
fn validate_payload(data: &RecordBuffer, table: &SceneTable) -> Result<(), ReplayError> {
    let len = data.len();
    // Boundaries come out ascending, so prev links can be checked
    // with a binary search.
    let mut boundaries = Vec::new();

    let mut at = 0u32;
    while at < len {
        if at + FRAME_WORDS > len {
            return Err(ReplayError::corrupted(format!(
                "frame at {at} truncated by payload end {len}"
            )));
        }
        let next = next_link(data, at);
        if next < (at + FRAME_WORDS) as i32 || next as u32 > len {
            return Err(ReplayError::corrupted(format!(
                "frame at {at} declares next link {next}"
            )));
        }
        let prev = prev_link(data, at);
        if prev != NO_FRAME && (prev < 0 || boundaries.binary_search(&(prev as u32)).is_err()) {
            return Err(ReplayError::corrupted(format!(
                "frame at {at} declares prev link {prev} off the frame chain"
            )));
        }
        boundaries.push(at);
        at = next as u32;
    }

    for span in table.iter() {
        if boundaries.binary_search(&span.start).is_err() {
            return Err(ReplayError::corrupted(format!(
                "scene start {} is not a frame boundary",
                span.start
            )));
        }
        if span.end != len && boundaries.binary_search(&span.end).is_err() {
            return Err(ReplayError::corrupted(format!(
                "scene end {} is not a frame boundary",
                span.end
            )));
        }
    }
    Ok(())
}

fn words_from_bytes(bytes: &[u8]) -> Result<Vec<Word>, ReplayError> {
    if bytes.len() % 4 != 0 {
        return Err(ReplayError::corrupted(format!(
            "payload of {} bytes is not a whole number of words",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| Word::from_bits(u32::from_le_bytes([c[0], c[1], c[2], c[3]])))
        .collect())
}

fn encode_words(words: &[Word], out: &mut Vec<u8>) {
    out.reserve(words.len() * 4);
    for w in words {
        out.extend_from_slice(&w.bits().to_le_bytes());
    }
}

fn encode_scene_table(table: &SceneTable, out: &mut Vec<u8>) {
    for span in table.iter() {
        out.extend_from_slice(&span.start.to_le_bytes());
        out.extend_from_slice(&span.end.to_le_bytes());
    }
}

/// In-memory parsing reads only fail by running out of bytes; report
/// that as corruption of the named part rather than as an I/O error.
fn truncated(e: ReplayError, what: &str) -> ReplayError {
    match e {
        ReplayError::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            ReplayError::corrupted(format!("truncated {what}"))
        }
        other => other,
    }
}
