//! Scanning cursor over a byte range that buffers style runs.
//!
//! The context tracks the current byte, one byte of lookahead and
//! look-behind, and line boundary flags. Styles are written run-at-a-time:
//! the open segment keeps the current state until `set_state` flushes it,
//! so `change_state` can retroactively retag a span that turned out to be
//! something else (a keyword, a string cut off by the line end).

use pawn_common::{SourceBuffer, Style, StyleBuffer};

pub struct StyleContext<'a> {
    doc: &'a SourceBuffer,
    styles: &'a mut StyleBuffer,
    end: usize,
    pos: usize,
    seg_start: usize,
    cur_line: usize,
    line_start_next: usize,
    pub state: Style,
    pub ch: u8,
    pub ch_prev: u8,
    pub ch_next: u8,
    pub at_line_start: bool,
    pub at_line_end: bool,
}

impl<'a> StyleContext<'a> {
    pub fn new(
        doc: &'a SourceBuffer,
        styles: &'a mut StyleBuffer,
        start: usize,
        length: usize,
        initial: Style,
    ) -> StyleContext<'a> {
        let end = (start + length).min(doc.len());
        let cur_line = doc.line_of(start);
        let line_start_next = doc.line_start(cur_line + 1);
        StyleContext {
            ch: doc.byte_at(start, 0),
            ch_prev: if start > 0 { doc.byte_at(start - 1, 0) } else { 0 },
            ch_next: doc.byte_at(start + 1, 0),
            at_line_start: doc.line_start(cur_line) == start,
            at_line_end: start + 1 >= line_start_next,
            doc,
            styles,
            end,
            pos: start,
            seg_start: start,
            cur_line,
            line_start_next,
            state: initial,
        }
    }

    pub fn more(&self) -> bool {
        self.pos < self.end
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Step to the next byte, updating lookahead and line flags.
    pub fn forward(&mut self) {
        self.ch_prev = self.ch;
        self.pos += 1;
        self.at_line_start = self.pos == self.line_start_next;
        if self.at_line_start {
            self.cur_line += 1;
            self.line_start_next = self.doc.line_start(self.cur_line + 1);
        }
        self.ch = self.doc.byte_at(self.pos, 0);
        self.ch_next = self.doc.byte_at(self.pos + 1, 0);
        self.at_line_end = self.pos + 1 >= self.line_start_next;
    }

    /// Whether the source at the current position starts with `s`.
    pub fn match_str(&self, s: &str) -> bool {
        self.doc.matches_at(self.pos, s)
    }

    /// Whether the current and next bytes are `a` then `b`.
    pub fn match2(&self, a: u8, b: u8) -> bool {
        self.ch == a && self.ch_next == b
    }

    /// Flush the open segment with the current state, then start a new
    /// segment in `state`.
    pub fn set_state(&mut self, state: Style) {
        self.styles
            .fill(self.seg_start, self.pos, self.state.to_byte());
        self.seg_start = self.pos;
        self.state = state;
    }

    /// Retag the open segment: replaces the state it will flush with.
    pub fn change_state(&mut self, state: Style) {
        self.state = state;
    }

    /// Include the current byte in the open segment, then flush and start a
    /// new segment in `state`.
    pub fn forward_set_state(&mut self, state: Style) {
        self.forward();
        self.set_state(state);
    }

    /// Flush whatever segment remains open.
    pub fn complete(&mut self) {
        self.styles
            .fill(self.seg_start, self.pos, self.state.to_byte());
        self.seg_start = self.pos;
    }

    /// Text of the open segment, optionally ASCII-lowered for
    /// case-insensitive keyword lookup.
    pub fn current_text(&self, lowered: bool) -> String {
        let text = String::from_utf8_lossy(self.doc.slice(self.seg_start, self.pos));
        if lowered {
            text.to_ascii_lowercase()
        } else {
            text.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawn_common::StyleClass;

    #[test]
    fn forward_tracks_line_boundaries() {
        let doc = SourceBuffer::new("ab\ncd");
        let mut styles = StyleBuffer::new(doc.len());
        let mut sc = StyleContext::new(&doc, &mut styles, 0, 5, Style::active(StyleClass::Default));

        assert!(sc.at_line_start);
        assert!(!sc.at_line_end);
        sc.forward(); // 'b'
        assert!(!sc.at_line_start);
        sc.forward(); // '\n'
        assert!(sc.at_line_end);
        sc.forward(); // 'c'
        assert!(sc.at_line_start);
        assert!(!sc.at_line_end);
        sc.forward(); // 'd', last byte of the document
        assert!(sc.at_line_end);
    }

    #[test]
    fn set_state_flushes_the_open_segment() {
        let doc = SourceBuffer::new("abc!");
        let mut styles = StyleBuffer::new(doc.len());
        let mut sc =
            StyleContext::new(&doc, &mut styles, 0, 4, Style::active(StyleClass::Identifier));
        sc.forward();
        sc.forward();
        sc.forward(); // at '!'
        sc.set_state(Style::active(StyleClass::Operator));
        sc.forward();
        sc.complete();
        assert_eq!(styles.as_slice(), &[11, 11, 11, 10]);
    }

    #[test]
    fn change_state_retags_retroactively() {
        let doc = SourceBuffer::new("word");
        let mut styles = StyleBuffer::new(doc.len());
        let mut sc =
            StyleContext::new(&doc, &mut styles, 0, 4, Style::active(StyleClass::Identifier));
        for _ in 0..4 {
            sc.forward();
        }
        assert_eq!(sc.current_text(false), "word");
        assert_eq!(sc.current_text(true), "word");
        sc.change_state(Style::active(StyleClass::Native));
        sc.complete();
        assert_eq!(styles.as_slice(), &[19, 19, 19, 19]);
    }

    #[test]
    fn current_text_can_lower_ascii() {
        let doc = SourceBuffer::new("PrintToServer");
        let mut styles = StyleBuffer::new(doc.len());
        let mut sc =
            StyleContext::new(&doc, &mut styles, 0, 13, Style::active(StyleClass::Identifier));
        for _ in 0..13 {
            sc.forward();
        }
        assert_eq!(sc.current_text(true), "printtoserver");
    }

    #[test]
    fn crlf_line_end_flags_only_the_linefeed() {
        let doc = SourceBuffer::new("a\r\nb");
        let mut styles = StyleBuffer::new(doc.len());
        let mut sc = StyleContext::new(&doc, &mut styles, 0, 4, Style::active(StyleClass::Default));
        assert!(!sc.at_line_end); // 'a'
        sc.forward();
        assert!(!sc.at_line_end); // '\r' of a CRLF pair
        sc.forward();
        assert!(sc.at_line_end); // '\n'
        sc.forward();
        assert!(sc.at_line_start);
    }
}
