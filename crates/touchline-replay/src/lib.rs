//! Replay and highlights recording for touchline matches.
//!
//! Records a match as an append-only buffer of 32-bit words and plays
//! it back with O(1) sequential fetches and O(n) n-frame seeks, both
//! directions. Highlight scenes are ranges over the same buffer,
//! bounded in size while recording and compacted on save.
//!
//! # Architecture
//!
//! - [`ReplayLog`] owns the recorded words and the scene table
//! - [`Recorder`] is the append handle; [`Player`] the read cursor —
//!   the borrow checker keeps them exclusive
//! - [`ReplayLog::load`] and [`ReplayLog::save`] move whole files
//!   through any `Read`/`Write`, converting legacy (v1) files on load
//!
//! # Format
//!
//! ```text
//! [MAGIC "HILV2\0"] [major u8] [minor u8] [scenes u16] [payload offset u32]
//! [MatchInfo] [scene table] [Frame [objects...]] [Frame [objects...]] ...
//! ```
//!
//! Frames carry embedded next/prev offsets forming a doubly-linked
//! list through the payload; all multi-byte fields are little-endian.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod cursor;
pub mod error;
pub mod file;
pub mod header;
pub mod legacy;
pub mod record;
pub mod scene;
pub mod storage;

pub use buffer::{RecordBuffer, Word};
pub use cursor::Player;
pub use error::ReplayError;
pub use file::FileKind;
pub use header::{FileHeader, VERSION_MAJOR, VERSION_MINOR};
pub use record::{FrameData, ObjectKind, ReplayObject};
pub use scene::{SceneSpan, SceneTable};
pub use storage::{Recorder, ReplayLog, INITIAL_CAPACITY, SCENE_WORD_BUDGET};
