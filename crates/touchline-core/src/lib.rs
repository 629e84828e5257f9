//! Match-domain types shared across the touchline workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the values the simulation hands to the replay subsystem: per-team
//! match statistics, the packed game-time word, and the match
//! description block embedded in replay file headers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod matchinfo;
pub mod stats;
pub mod time;

pub use matchinfo::{MatchInfo, LABEL_LEN, TEAM_BLOCK_LEN};
pub use stats::{MatchStats, TeamStats};
pub use time::{GameTime, MAX_MINUTES};
