//! The scene table: `[start, end)` word ranges delimiting recorded
//! highlights.

/// One highlight scene: a contiguous `[start, end)` range of words in
/// the record buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneSpan {
    /// First word of the scene.
    pub start: u32,
    /// One past the last word of the scene.
    pub end: u32,
}

impl SceneSpan {
    /// Number of words in the scene.
    pub fn len(self) -> u32 {
        self.end - self.start
    }

    /// Whether the scene covers no words.
    pub fn is_empty(self) -> bool {
        self.start == self.end
    }
}

/// Ordered list of saved scenes.
///
/// Scenes append in increasing, non-overlapping order: each new span
/// starts at or after the previous span's end. Violating that is a
/// writer bug and panics — the table never holds an impossible
/// structure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SceneTable {
    spans: Vec<SceneSpan>,
}

impl SceneTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saved scenes.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether no scene has been saved.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Drop all scenes.
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    /// The scene at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> SceneSpan {
        self.spans[index]
    }

    /// The most recently saved scene, if any.
    pub fn last(&self) -> Option<SceneSpan> {
        self.spans.last().copied()
    }

    /// Iterate over the saved scenes in order.
    pub fn iter(&self) -> impl Iterator<Item = SceneSpan> + '_ {
        self.spans.iter().copied()
    }

    /// Append a scene.
    ///
    /// # Panics
    ///
    /// Panics if the span is empty or starts before the previous
    /// scene's end.
    pub fn push(&mut self, span: SceneSpan) {
        assert!(
            span.start < span.end,
            "empty scene span [{}, {})",
            span.start,
            span.end
        );
        if let Some(last) = self.last() {
            assert!(
                span.start >= last.end,
                "scene [{}, {}) overlaps previous scene ending at {}",
                span.start,
                span.end,
                last.end
            );
        }
        self.spans.push(span);
    }

    /// Total words covered by all scenes.
    pub fn total_len(&self) -> u32 {
        self.spans.iter().map(|s| s.len()).sum()
    }

    /// Whether the scenes already tile the buffer contiguously from
    /// offset zero; when they do, a highlights save needs no fixup
    /// pass.
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 0;
        for span in &self.spans {
            if span.start != expected {
                return false;
            }
            expected = span.end;
        }
        true
    }

    /// The same scenes re-based contiguous from offset zero, in order.
    ///
    /// This is the table written into a highlights file, whose payload
    /// holds only the scene ranges back to back.
    pub fn compacted(&self) -> SceneTable {
        let mut offset = 0;
        let spans = self
            .spans
            .iter()
            .map(|span| {
                let start = offset;
                offset += span.len();
                SceneSpan { start, end: offset }
            })
            .collect();
        SceneTable { spans }
    }
}
