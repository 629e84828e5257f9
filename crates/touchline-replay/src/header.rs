//! File header encoding and decoding.
//!
//! Two header shapes exist on disk. The current format opens with a
//! six-byte magic, a major/minor version pair, the scene count and the
//! byte offset where the word payload begins; the legacy format opens
//! with a pair of 32-bit magics and carries no version or offset
//! fields at all. Both embed the same [`MatchInfo`] block. The first
//! eight bytes are enough to tell them apart.

use std::io::Read;

use crate::error::ReplayError;
use touchline_core::{MatchInfo, LABEL_LEN, TEAM_BLOCK_LEN};

/// Magic opening the current file format.
pub const MAGIC: [u8; 6] = *b"HILV2\0";

/// First legacy magic word (little-endian `u32` on disk).
pub const LEGACY_MAGIC_1: u32 = u32::from_le_bytes(*b"HILF");
/// Second legacy magic word.
pub const LEGACY_MAGIC_2: u32 = u32::from_le_bytes(*b"V1\0\0");

/// Major format version this build writes. A file with a higher major
/// is refused; a lower major goes through the legacy converter.
pub const VERSION_MAJOR: u8 = 2;
/// Minor format version this build writes. Minor bumps may grow the
/// header; readers honor `payload_offset` instead of assuming a size.
pub const VERSION_MINOR: u8 = 0;

/// Serialized size of the [`MatchInfo`] block, padded to a word
/// multiple.
pub const MATCH_INFO_LEN: usize = 2 * TEAM_BLOCK_LEN + 2 * LABEL_LEN + 5 + 3;

/// Byte length of a current-format header (before the scene table).
pub const HEADER_LEN: usize = MAGIC.len() + 2 + 2 + 4 + MATCH_INFO_LEN;

/// Byte length of a legacy header.
pub const LEGACY_HEADER_LEN: usize = 8 + MATCH_INFO_LEN;

/// Decoded file header, normalized across both on-disk shapes.
///
/// For a legacy file `major` is 1, `scene_count` is 0 (the legacy
/// format stores no scene table) and `payload_offset` is where the
/// legacy payload begins.
#[derive(Clone, Debug)]
pub struct FileHeader {
    /// Major format version found in the file.
    pub major: u8,
    /// Minor format version found in the file.
    pub minor: u8,
    /// Number of scene table entries following the header.
    pub scene_count: u16,
    /// Byte offset of the word payload from the start of the file.
    pub payload_offset: u32,
    /// The embedded match description.
    pub info: MatchInfo,
}

impl FileHeader {
    /// Whether the first eight bytes are the legacy magic pair.
    pub(crate) fn probe_legacy(first8: &[u8; 8]) -> bool {
        let m1 = u32::from_le_bytes([first8[0], first8[1], first8[2], first8[3]]);
        let m2 = u32::from_le_bytes([first8[4], first8[5], first8[6], first8[7]]);
        m1 == LEGACY_MAGIC_1 && m2 == LEGACY_MAGIC_2
    }

    /// Read a current-format header, `first8` being the already
    /// consumed probe bytes.
    pub(crate) fn read_current(
        first8: &[u8; 8],
        r: &mut impl Read,
    ) -> Result<Self, ReplayError> {
        if first8[..6] != MAGIC {
            return Err(ReplayError::corrupted("bad magic"));
        }
        let major = first8[6];
        let minor = first8[7];
        // Refuse before touching the rest of the header: a future
        // major may lay it out differently.
        if major > VERSION_MAJOR {
            return Err(ReplayError::UnsupportedVersion { major, minor });
        }
        if major < VERSION_MAJOR {
            return Err(ReplayError::corrupted(format!(
                "version {major}.{minor} header behind current magic"
            )));
        }

        let scene_count = read_u16(r)?;
        let payload_offset = read_u32(r)?;
        let info = read_match_info(r)?;
        Ok(Self {
            major,
            minor,
            scene_count,
            payload_offset,
            info,
        })
    }

    /// Read the remainder of a legacy header after the magic pair.
    pub(crate) fn read_legacy(r: &mut impl Read) -> Result<Self, ReplayError> {
        let info = read_match_info(r)?;
        Ok(Self {
            major: 1,
            minor: 0,
            scene_count: 0,
            payload_offset: LEGACY_HEADER_LEN as u32,
            info,
        })
    }

    /// Serialize a current-format header.
    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&MAGIC);
        out.push(self.major);
        out.push(self.minor);
        out.extend_from_slice(&self.scene_count.to_le_bytes());
        out.extend_from_slice(&self.payload_offset.to_le_bytes());
        encode_match_info(&self.info, out);
    }
}

pub(crate) fn read_u16(r: &mut impl Read) -> Result<u16, ReplayError> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

pub(crate) fn read_u32(r: &mut impl Read) -> Result<u32, ReplayError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_match_info(r: &mut impl Read) -> Result<MatchInfo, ReplayError> {
    let mut info = MatchInfo::default();
    r.read_exact(&mut info.team1)?;
    r.read_exact(&mut info.team2)?;
    r.read_exact(&mut info.game_name)?;
    r.read_exact(&mut info.game_round)?;

    let mut tail = [0u8; 8];
    r.read_exact(&mut tail)?;
    info.team1_goals = tail[0];
    info.team2_goals = tail[1];
    info.pitch_type = tail[2];
    info.pitch_number = tail[3];
    info.max_substitutes = tail[4];
    // tail[5..8] is padding.
    Ok(info)
}

fn encode_match_info(info: &MatchInfo, out: &mut Vec<u8>) {
    out.extend_from_slice(&info.team1);
    out.extend_from_slice(&info.team2);
    out.extend_from_slice(&info.game_name);
    out.extend_from_slice(&info.game_round);
    out.extend_from_slice(&[
        info.team1_goals,
        info.team2_goals,
        info.pitch_type,
        info.pitch_number,
        info.max_substitutes,
        0,
        0,
        0,
    ]);
}
