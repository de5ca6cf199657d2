/// A text edit against the original bytes of one file
///
/// Offsets always refer to the original text, never to a partially
/// rewritten copy, so registering one edit cannot move another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte offset where the edit starts (inclusive)
    pub byte_start: usize,
    /// Byte offset where the edit ends (exclusive); equal to `byte_start`
    /// for a pure insertion
    pub byte_end: usize,
    /// Bytes emitted in place of `byte_start..byte_end`
    pub payload: Vec<u8>,
}

impl Edit {
    /// Create an insertion edit (insert before position)
    pub fn insert(offset: usize, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            byte_start: offset,
            byte_end: offset,
            payload: payload.into(),
        }
    }

    /// Create a replacement edit
    pub fn replace(byte_start: usize, byte_end: usize, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            byte_start,
            byte_end,
            payload: payload.into(),
        }
    }
}

/// Accumulates edits against one immutable original text
///
/// Edits are data: they are recorded in registration order and only
/// applied when [`RewriteSession::materialize`] walks the original once.
/// Edits sharing an offset are emitted in the order they were registered;
/// pure insertions at an offset come before a replacement starting there.
#[derive(Debug, Clone)]
pub struct RewriteSession {
    original: Box<[u8]>,
    edits: Vec<Edit>,
}

impl RewriteSession {
    pub fn new(original: impl Into<Vec<u8>>) -> Self {
        Self {
            original: original.into().into_boxed_slice(),
            edits: Vec::new(),
        }
    }

    /// The original text this session rewrites
    pub fn original(&self) -> &[u8] {
        &self.original
    }

    /// Record an insertion of `payload` before the original byte at `offset`
    ///
    /// # Panics
    /// Panics if `offset` is past the end of the original text. Offsets come
    /// from the analysis pass, so a bad one is a defect upstream.
    pub fn insert(&mut self, offset: usize, payload: impl Into<Vec<u8>>) {
        self.push(Edit::insert(offset, payload));
    }

    /// Record a replacement of `byte_start..byte_end` by `payload`
    ///
    /// # Panics
    /// Panics if the range is inverted or extends past the original text.
    pub fn replace(&mut self, byte_start: usize, byte_end: usize, payload: impl Into<Vec<u8>>) {
        self.push(Edit::replace(byte_start, byte_end, payload));
    }

    /// Record a deletion of `byte_start..byte_end`
    ///
    /// # Panics
    /// Panics if the range is inverted or extends past the original text.
    pub fn delete(&mut self, byte_start: usize, byte_end: usize) {
        self.push(Edit::replace(byte_start, byte_end, Vec::new()));
    }

    /// Record an already built edit
    pub fn push(&mut self, edit: Edit) {
        assert!(
            edit.byte_start <= edit.byte_end,
            "invalid edit span: end ({}) < start ({})",
            edit.byte_end,
            edit.byte_start
        );
        assert!(
            edit.byte_end <= self.original.len(),
            "edit span {}..{} out of bounds (original length: {})",
            edit.byte_start,
            edit.byte_end,
            self.original.len()
        );
        tracing::trace!(
            start = edit.byte_start,
            end = edit.byte_end,
            payload_len = edit.payload.len(),
            "registered edit"
        );
        self.edits.push(edit);
    }

    /// Number of edits registered so far
    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    /// Produce the rewritten text
    ///
    /// Walks the original once, emitting at each edit offset the edit
    /// payloads followed by the untouched original bytes up to the next
    /// edit. The original is never modified, so calling this again yields
    /// the same bytes.
    ///
    /// # Panics
    /// Panics if a replaced range overlaps another replaced range or
    /// strictly contains an insertion point.
    pub fn materialize(&self) -> Vec<u8> {
        let mut order: Vec<&Edit> = self.edits.iter().collect();
        // Stable: registration order survives among edits with equal spans
        order.sort_by_key(|edit| (edit.byte_start, edit.byte_end));

        let inserted: usize = order.iter().map(|edit| edit.payload.len()).sum();
        let mut out = Vec::with_capacity(self.original.len() + inserted);
        let mut cursor = 0;

        for edit in order {
            assert!(
                edit.byte_start >= cursor,
                "edit at {}..{} overlaps a replaced range ending at {}",
                edit.byte_start,
                edit.byte_end,
                cursor
            );
            out.extend_from_slice(&self.original[cursor..edit.byte_start]);
            out.extend_from_slice(&edit.payload);
            cursor = edit.byte_end;
        }
        out.extend_from_slice(&self.original[cursor..]);

        out
    }
}
