//! In-memory host collaborators: source text and style stream.

/// Random-access view of the source text with a pre-computed line index.
///
/// All positions are byte offsets. Out-of-range reads return a caller-chosen
/// sentinel instead of failing, which is what lets the lexer degrade rather
/// than fault on truncated directives.
#[derive(Debug)]
pub struct SourceBuffer {
    bytes: Vec<u8>,
    /// Byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<usize>,
}

impl SourceBuffer {
    /// Build a source buffer and its line index in one scan.
    ///
    /// Only LF terminators are indexed, so LF and CRLF line endings both
    /// map correctly; a lone CR is not a line boundary here.
    pub fn new(text: &str) -> SourceBuffer {
        let bytes = text.as_bytes().to_vec();
        let mut line_starts = vec![0usize];
        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        SourceBuffer { bytes, line_starts }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The byte at `pos`, or `default` when `pos` is out of range.
    pub fn byte_at(&self, pos: usize, default: u8) -> u8 {
        self.bytes.get(pos).copied().unwrap_or(default)
    }

    /// The 0-based line containing byte offset `pos`.
    ///
    /// Offsets at or past the end of the buffer report the last line.
    pub fn line_of(&self, pos: usize) -> usize {
        self.line_starts.partition_point(|&start| start <= pos) - 1
    }

    /// Byte offset of the start of `line`, clamped to the buffer length for
    /// lines past the end.
    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts
            .get(line)
            .copied()
            .unwrap_or(self.bytes.len())
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Whether the source bytes at `pos` start with `s`.
    pub fn matches_at(&self, pos: usize, s: &str) -> bool {
        let pat = s.as_bytes();
        match self.bytes.get(pos..pos + pat.len()) {
            Some(slice) => slice == pat,
            None => false,
        }
    }

    /// The bytes in `start..end`, clamped to the buffer.
    pub fn slice(&self, start: usize, end: usize) -> &[u8] {
        let end = end.min(self.bytes.len());
        let start = start.min(end);
        &self.bytes[start..end]
    }
}

/// One style byte per source byte, zero-initialized.
#[derive(Debug)]
pub struct StyleBuffer {
    styles: Vec<u8>,
}

impl StyleBuffer {
    /// A style stream sized for `len` source bytes, all `Default`.
    pub fn new(len: usize) -> StyleBuffer {
        StyleBuffer {
            styles: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// The style byte at `pos`, or 0 past the end.
    pub fn at(&self, pos: usize) -> u8 {
        self.styles.get(pos).copied().unwrap_or(0)
    }

    /// Overwrite `start..end` with `byte`, clamped to the stream.
    pub fn fill(&mut self, start: usize, end: usize, byte: u8) {
        let end = end.min(self.styles.len());
        let start = start.min(end);
        for slot in &mut self.styles[start..end] {
            *slot = byte;
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.styles
    }
}
