//! The append-only word buffer backing a replay.
//!
//! A replay is a flat sequence of 32-bit [`Word`]s. Each word holds
//! either a signed integer or an IEEE float; which one is never stored
//! per word — record layouts decide how a slot is read. Frame records
//! embed next/prev links as plain word offsets into the same buffer,
//! so the buffer doubles as an arena: "pointers" are indices, with
//! `-1` standing for "no such link".

use std::fmt;

/// One 32-bit storage slot.
///
/// Stores raw bits; the integer and float views reinterpret the same
/// bits, mirroring the on-disk representation exactly.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Word(u32);

impl Word {
    /// A word holding the raw bit pattern `bits`.
    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// A word holding a signed integer.
    pub fn from_i32(v: i32) -> Self {
        Self(v as u32)
    }

    /// A word holding a float.
    pub fn from_f32(v: f32) -> Self {
        Self(v.to_bits())
    }

    /// The raw bit pattern.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// The word read as a signed integer.
    pub fn as_i32(self) -> i32 {
        self.0 as i32
    }

    /// The word read as a float.
    pub fn as_f32(self) -> f32 {
        f32::from_bits(self.0)
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#010x})", self.0)
    }
}

/// Growable, append-only sequence of [`Word`]s.
///
/// The single highest-frequency operation in the subsystem is
/// [`RecordBuffer::push`], called several times per simulated tick for
/// the length of a match; growth is geometrically amortized by the
/// backing `Vec`, and [`RecordBuffer::with_capacity`] lets the owner
/// reserve a full match up front so the steady state never
/// reallocates.
///
/// The buffer itself does no interpretation and no range policing
/// beyond index validity; the record codec and the playback cursor own
/// those checks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordBuffer {
    words: Vec<Word>,
}

impl RecordBuffer {
    /// An empty buffer with no reserved capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty buffer with room for `capacity` words.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: Vec::with_capacity(capacity),
        }
    }

    /// Number of words recorded.
    pub fn len(&self) -> u32 {
        self.words.len() as u32
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Remove all words, keeping the allocation.
    pub fn clear(&mut self) {
        self.words.clear();
    }

    /// Append one word.
    pub fn push(&mut self, word: Word) {
        self.words.push(word);
    }

    /// The word at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is out of range; recorded offsets are an
    /// internal invariant, so an out-of-range read is a writer bug.
    pub fn get(&self, offset: u32) -> Word {
        self.words[offset as usize]
    }

    /// Add `delta` to the integer word at `offset`.
    ///
    /// Used by the recorder to extend the current frame's declared
    /// length as object records are appended behind it.
    pub fn add_to(&mut self, offset: u32, delta: i32) {
        let w = &mut self.words[offset as usize];
        *w = Word::from_i32(w.as_i32() + delta);
    }

    /// All recorded words.
    pub fn as_slice(&self) -> &[Word] {
        &self.words
    }

    /// Replace the contents with `words`.
    pub fn replace(&mut self, words: Vec<Word>) {
        self.words = words;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_float_views_share_bits() {
        let w = Word::from_f32(1.5);
        assert_eq!(w.bits(), 1.5f32.to_bits());
        assert_eq!(Word::from_i32(-1).bits(), 0xffff_ffff);
        assert_eq!(Word::from_i32(-1).as_i32(), -1);
    }

    #[test]
    fn push_and_read_back() {
        let mut buf = RecordBuffer::new();
        buf.push(Word::from_i32(7));
        buf.push(Word::from_f32(2.5));
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.get(0).as_i32(), 7);
        assert_eq!(buf.get(1).as_f32(), 2.5);
    }

    #[test]
    fn add_to_adjusts_in_place() {
        let mut buf = RecordBuffer::new();
        buf.push(Word::from_i32(6));
        buf.add_to(0, 3);
        assert_eq!(buf.get(0).as_i32(), 9);
    }

    #[test]
    #[should_panic]
    fn out_of_range_read_panics() {
        let buf = RecordBuffer::new();
        let _ = buf.get(0);
    }
}
