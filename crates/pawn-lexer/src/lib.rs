//! Incremental styling lexer for Pawn-style source.
//!
//! The lexer assigns one style byte per source byte and can restart from any
//! line boundary: everything it needs to resume is the initial style byte
//! plus the per-line conditional-compilation snapshots it keeps internally.
//! Alongside styling it tracks `#if`/`#else`/`#endif` nesting to gray out
//! inactive branches, records `#define`s into a line-ordered history, and
//! provides a separate fold pass over the finished style stream.

pub mod condition;
pub mod context;
pub mod eval;
pub mod preproc;

use pawn_common::{
    ConfigError, FoldBuffer, LexerOptions, SourceBuffer, Style, StyleBuffer, StyleClass, WordList,
    FOLD_LEVEL_BASE, FOLD_LEVEL_HEADER_FLAG, FOLD_LEVEL_WHITE_FLAG,
};
use rustc_hash::FxHashMap;

use crate::condition::ConditionalStateLog;
use crate::context::StyleContext;
use crate::preproc::MacroHistory;
pub use crate::preproc::MacroDefinition;

/// Names of the word list slots accepted by [`Lexer::set_word_list`].
pub const WORD_LIST_NAMES: [&str; 7] = [
    "Native keywords",
    "Forward keywords",
    "Statements keywords",
    "Constants keywords",
    "user1",
    "Documentation comment keywords",
    "Preprocessor definitions",
];

// ── Character classes ──

/// Space per the styling rules: ' ' or any of 0x09..=0x0d.
fn is_space(b: u8) -> bool {
    b == b' ' || (0x09..=0x0d).contains(&b)
}

fn is_space_or_tab(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn is_word_start(b: u8, allow_dollar: bool) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80 || (allow_dollar && b == b'$')
}

fn is_word_char(b: u8, allow_dollar: bool) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b >= 0x80 || (allow_dollar && b == b'$')
}

/// Characters allowed inside a `@keyword`/`\keyword` in a doc comment.
fn is_doxygen_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'$' | b'@' | b'\\' | b'&' | b'<' | b'>' | b'#' | b'{' | b'}' | b'[' | b']')
}

fn is_operator_char(b: u8) -> bool {
    matches!(
        b,
        b'%' | b'^' | b'&' | b'*' | b'(' | b')' | b'-' | b'+' | b'=' | b'|' | b'{' | b'}'
            | b'[' | b']' | b':' | b';' | b'<' | b'>' | b',' | b'/' | b'?' | b'!' | b'.' | b'~'
    )
}

/// Whether a style tag reads as whitespace when counting a line's visible
/// characters. Inactive tags never do, whatever their class.
fn is_space_equiv(style: Style) -> bool {
    !style.inactive
        && matches!(
            style.class,
            StyleClass::Default
                | StyleClass::Comment
                | StyleClass::CommentLine
                | StyleClass::CommentDoc
                | StyleClass::CommentLineDoc
                | StyleClass::CommentDocKeyword
                | StyleClass::CommentDocKeywordError
        )
}

/// The text from `start` to the end of its line. With `allow_space` false
/// every space is stripped, concatenating what surrounds them.
fn get_rest_of_line(doc: &SourceBuffer, start: usize, allow_space: bool) -> String {
    let mut rest = Vec::new();
    let mut i = 0;
    let mut ch = doc.byte_at(start + i, b'\n');
    while ch != b'\r' && ch != b'\n' {
        if allow_space || ch != b' ' {
            rest.push(ch);
        }
        i += 1;
        ch = doc.byte_at(start + i, b'\n');
    }
    String::from_utf8_lossy(&rest).into_owned()
}

fn byte_before(doc: &SourceBuffer, pos: usize, back: usize) -> u8 {
    if pos >= back {
        doc.byte_at(pos - back, 0)
    } else {
        0
    }
}

fn is_stream_comment_style(style: u8) -> bool {
    style == StyleClass::Comment as u8
        || style == StyleClass::CommentDoc as u8
        || style == StyleClass::CommentDocKeyword as u8
        || style == StyleClass::CommentDocKeywordError as u8
}

// ── Lexer ──

/// The stateful lexer: options, keyword lists, and the preprocessor state
/// that survives between scans.
pub struct Lexer {
    case_sensitive: bool,
    options: LexerOptions,
    native: WordList,
    forward: WordList,
    statement: WordList,
    constant: WordList,
    user: WordList,
    doc_keywords: WordList,
    pp_definitions: WordList,
    /// Definitions parsed from the preprocessor-definitions word list.
    static_definitions: FxHashMap<String, String>,
    line_states: ConditionalStateLog,
    history: MacroHistory,
}

impl Lexer {
    pub fn new(case_sensitive: bool) -> Lexer {
        Lexer {
            case_sensitive,
            options: LexerOptions::default(),
            native: WordList::new(),
            forward: WordList::new(),
            statement: WordList::new(),
            constant: WordList::new(),
            user: WordList::new(),
            doc_keywords: WordList::new(),
            pp_definitions: WordList::new(),
            static_definitions: FxHashMap::default(),
            line_states: ConditionalStateLog::new(),
            history: MacroHistory::new(),
        }
    }

    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    /// Set an option by its property name.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.options.set_property(key, value)
    }

    /// Replace a keyword list. Slots follow [`WORD_LIST_NAMES`]; slot 6 also
    /// rebuilds the static macro definition table. Returns whether the list
    /// actually changed, so the host knows a restyle is needed.
    pub fn set_word_list(&mut self, slot: usize, text: &str) -> Result<bool, ConfigError> {
        let list = match slot {
            0 => &mut self.native,
            1 => &mut self.forward,
            2 => &mut self.statement,
            3 => &mut self.constant,
            4 => &mut self.user,
            5 => &mut self.doc_keywords,
            6 => &mut self.pp_definitions,
            _ => return Err(ConfigError::InvalidWordListSlot(slot)),
        };
        let changed = list.set(text);
        if changed && slot == 6 {
            self.static_definitions = preproc::parse_definitions(self.pp_definitions.entries());
        }
        Ok(changed)
    }

    /// The `#define` events recorded by previous scans, in line order.
    pub fn macro_history(&self) -> &[MacroDefinition] {
        self.history.events()
    }

    fn classify_identifier(&self, word: &str) -> Option<StyleClass> {
        if self.native.contains(word) {
            Some(StyleClass::Native)
        } else if self.forward.contains(word) {
            Some(StyleClass::Forward)
        } else if self.statement.contains(word) {
            Some(StyleClass::Statement)
        } else if self.constant.contains(word) {
            Some(StyleClass::Constant)
        } else if self.user.contains(word) {
            Some(StyleClass::Word)
        } else if self.doc_keywords.contains(word) {
            Some(StyleClass::Word2)
        } else {
            None
        }
    }

    /// Style `length` bytes starting at `start`, which must be a position
    /// whose preceding byte carries style `init_style` (0 at the document
    /// start). Returns whether the scan changed the macro definition table,
    /// in which case styling from `start` onward may be stale and the host
    /// should request a wider restyle.
    pub fn lex(
        &mut self,
        start: usize,
        length: usize,
        init_style: u8,
        doc: &SourceBuffer,
        styles: &mut StyleBuffer,
    ) -> bool {
        let allow_dollars = self.options.identifiers_allow_dollars;

        let mut visible_chars = 0usize;
        let mut style_before_dc_keyword = StyleClass::Default;
        let mut continuation_line = false;
        let mut is_include_preprocessor = false;

        let mut line_current = doc.line_of(start);
        if init_style == StyleClass::Preprocessor as u8 && line_current > 0 {
            // Resuming inside a directive: check whether the previous line
            // ended with a backslash continuation.
            let ch_back = byte_before(doc, start, 1);
            let ch_back2 = byte_before(doc, start, 2);
            let line_end_char = if ch_back2 == b'\r' && ch_back == b'\n' {
                byte_before(doc, start, 3)
            } else if ch_back == b'\n' || ch_back == b'\r' {
                ch_back2
            } else {
                b'!'
            };
            continuation_line = line_end_char == b'\\';
        }

        let mut preproc = self.line_states.state_at(line_current);

        if !self.options.update_preprocessor {
            self.history.clear();
        }
        let mut definitions_changed = self.history.truncate_from(line_current);
        let mut definitions = preproc::active_definitions(&self.static_definitions, &self.history);

        let mut inactive = preproc.is_inactive();
        let mut sc = StyleContext::new(doc, styles, start, length, Style::from_byte(init_style));

        while sc.more() {
            if sc.at_line_start {
                if sc.state == Style::active(StyleClass::String) {
                    // Flush the string up to here so a stale end-of-line
                    // retag cannot leak back into the previous line.
                    sc.set_state(Style::active(StyleClass::String));
                }
                visible_chars = 0;
                is_include_preprocessor = false;
                if preproc.is_inactive() {
                    inactive = true;
                    sc.set_state(Style::new(sc.state.class, true));
                }
            }

            if sc.at_line_end {
                line_current += 1;
                self.line_states.record(line_current, preproc);
            }

            // Backslash line continuation, in any state.
            if sc.ch == b'\\' && (sc.ch_next == b'\n' || sc.ch_next == b'\r') {
                sc.forward();
                if sc.ch == b'\r' && sc.ch_next == b'\n' {
                    sc.forward();
                }
                continuation_line = true;
                sc.forward();
                continue;
            }

            let at_line_end_before_switch = sc.at_line_end;

            // Does the current state terminate here?
            match sc.state.class {
                StyleClass::Operator => {
                    sc.set_state(Style::new(StyleClass::Default, inactive));
                }
                StyleClass::Number => {
                    // Permissive: hex digits and suffixes are word chars.
                    if !is_word_char(sc.ch, allow_dollars) {
                        sc.set_state(Style::new(StyleClass::Default, inactive));
                    }
                }
                StyleClass::Identifier => {
                    if !is_word_char(sc.ch, allow_dollars) || sc.ch == b'.' {
                        let word = sc.current_text(!self.case_sensitive);
                        if let Some(class) = self.classify_identifier(&word) {
                            sc.change_state(Style::new(class, inactive));
                        }
                        sc.set_state(Style::new(StyleClass::Default, inactive));
                    }
                }
                StyleClass::Preprocessor => {
                    if sc.at_line_start && !continuation_line {
                        sc.set_state(Style::new(StyleClass::Default, inactive));
                    } else if self.options.styling_within_preprocessor {
                        if is_space(sc.ch) {
                            sc.set_state(Style::new(StyleClass::Default, inactive));
                        }
                    } else if sc.match2(b'/', b'*') || sc.match2(b'/', b'/') {
                        sc.set_state(Style::new(StyleClass::Default, inactive));
                    }
                }
                StyleClass::Comment => {
                    if sc.match2(b'*', b'/') {
                        sc.forward();
                        sc.forward_set_state(Style::new(StyleClass::Default, inactive));
                    }
                }
                StyleClass::CommentDoc => {
                    if sc.match2(b'*', b'/') {
                        sc.forward();
                        sc.forward_set_state(Style::new(StyleClass::Default, inactive));
                    } else if sc.ch == b'@' || sc.ch == b'\\' {
                        // A doc keyword needs a space or '*' before and a
                        // non-space after.
                        if (is_space(sc.ch_prev) || sc.ch_prev == b'*') && !is_space(sc.ch_next) {
                            style_before_dc_keyword = StyleClass::CommentDoc;
                            sc.set_state(Style::new(StyleClass::CommentDocKeyword, inactive));
                        }
                    }
                }
                StyleClass::CommentLine => {
                    if sc.at_line_start {
                        sc.set_state(Style::new(StyleClass::Default, inactive));
                    }
                }
                StyleClass::CommentLineDoc => {
                    if sc.at_line_start {
                        sc.set_state(Style::new(StyleClass::Default, inactive));
                    } else if sc.ch == b'@' || sc.ch == b'\\' {
                        if (is_space(sc.ch_prev) || sc.ch_prev == b'/' || sc.ch_prev == b'!')
                            && !is_space(sc.ch_next)
                        {
                            style_before_dc_keyword = StyleClass::CommentLineDoc;
                            sc.set_state(Style::new(StyleClass::CommentDocKeyword, inactive));
                        }
                    }
                }
                StyleClass::CommentDocKeyword => {
                    if style_before_dc_keyword == StyleClass::CommentDoc && sc.match2(b'*', b'/') {
                        sc.change_state(Style::active(StyleClass::CommentDocKeywordError));
                        sc.forward();
                        sc.forward_set_state(Style::new(StyleClass::Default, inactive));
                    } else if !is_doxygen_char(sc.ch) {
                        let text = sc.current_text(!self.case_sensitive);
                        let keyword = text.get(1..).unwrap_or("");
                        if !is_space(sc.ch) || !self.doc_keywords.contains(keyword) {
                            sc.change_state(Style::new(
                                StyleClass::CommentDocKeywordError,
                                inactive,
                            ));
                        }
                        sc.set_state(Style::active(style_before_dc_keyword));
                    }
                }
                StyleClass::String => {
                    if sc.at_line_end {
                        sc.change_state(Style::new(StyleClass::StringEol, inactive));
                    } else if is_include_preprocessor {
                        if sc.ch == b'>' {
                            sc.forward_set_state(Style::new(StyleClass::Default, inactive));
                            is_include_preprocessor = false;
                        }
                    } else if sc.ch == b'\\' || sc.ch == b'^' {
                        if sc.ch_next == b'"' || sc.ch_next == b'\'' || sc.ch_next == b'\\' {
                            sc.forward();
                        }
                    } else if sc.ch == b'"' {
                        sc.forward_set_state(Style::new(StyleClass::Default, inactive));
                    }
                }
                StyleClass::Character => {
                    if sc.at_line_end {
                        sc.change_state(Style::new(StyleClass::StringEol, inactive));
                    } else if sc.ch == b'\\' {
                        if sc.ch_next == b'"' || sc.ch_next == b'\'' || sc.ch_next == b'\\' {
                            sc.forward();
                        }
                    } else if sc.ch == b'\'' {
                        sc.forward_set_state(Style::new(StyleClass::Default, inactive));
                    }
                }
                StyleClass::StringEol => {
                    if sc.at_line_start {
                        sc.set_state(Style::new(StyleClass::Default, inactive));
                    }
                }
                StyleClass::Verbatim => {
                    if sc.ch == b'"' {
                        if sc.ch_next == b'"' {
                            sc.forward();
                        } else {
                            sc.forward_set_state(Style::new(StyleClass::Default, inactive));
                        }
                    }
                }
                _ => {}
            }

            if sc.at_line_end && !at_line_end_before_switch {
                // State exit consumed bytes up to the end of the line.
                line_current += 1;
                self.line_states.record(line_current, preproc);
            }

            // Does a new state start here?
            if sc.state.class == StyleClass::Default {
                if sc.match2(b'@', b'"') {
                    sc.set_state(Style::new(StyleClass::Verbatim, inactive));
                    sc.forward();
                } else if sc.ch.is_ascii_digit() || (sc.ch == b'.' && sc.ch_next.is_ascii_digit())
                {
                    sc.set_state(Style::new(StyleClass::Number, inactive));
                } else if is_word_start(sc.ch, allow_dollars) || sc.ch == b'@' {
                    sc.set_state(Style::new(StyleClass::Identifier, inactive));
                } else if sc.match2(b'/', b'*') {
                    if sc.match_str("/**") || sc.match_str("/*!") {
                        sc.set_state(Style::new(StyleClass::CommentDoc, inactive));
                    } else {
                        sc.set_state(Style::new(StyleClass::Comment, inactive));
                    }
                    // Eat the '*' so it cannot also close the comment.
                    sc.forward();
                } else if sc.match2(b'/', b'/') {
                    if (sc.match_str("///") && !sc.match_str("////")) || sc.match_str("//!") {
                        sc.set_state(Style::new(StyleClass::CommentLineDoc, inactive));
                    } else {
                        sc.set_state(Style::new(StyleClass::CommentLine, inactive));
                    }
                } else if sc.ch == b'"' {
                    sc.set_state(Style::new(StyleClass::String, inactive));
                    // Make sure '>' will not end this string.
                    is_include_preprocessor = false;
                } else if is_include_preprocessor && sc.ch == b'<' {
                    sc.set_state(Style::new(StyleClass::String, inactive));
                } else if sc.ch == b'\'' {
                    sc.set_state(Style::new(StyleClass::Character, inactive));
                } else if sc.ch == b'#' && visible_chars == 0 {
                    // Directives stand alone on their line.
                    sc.set_state(Style::new(StyleClass::Preprocessor, inactive));
                    loop {
                        sc.forward();
                        if !(is_space_or_tab(sc.ch) && sc.more()) {
                            break;
                        }
                    }
                    if sc.at_line_end {
                        sc.set_state(Style::new(StyleClass::Default, inactive));
                    } else if sc.match_str("include") {
                        is_include_preprocessor = true;
                    } else if self.options.track_preprocessor {
                        if sc.match_str("ifdef") || sc.match_str("ifndef") {
                            let is_ifdef = sc.match_str("ifdef");
                            let skip = if is_ifdef { 5 } else { 6 };
                            let name = get_rest_of_line(doc, sc.pos() + skip + 1, false);
                            let found = definitions.contains_key(&name);
                            preproc.start_section(is_ifdef == found);
                        } else if sc.match_str("if") {
                            let rest = get_rest_of_line(doc, sc.pos() + 2, true);
                            let good = eval::evaluate(&rest, &definitions);
                            preproc.start_section(good);
                        } else if sc.match_str("else") {
                            if !preproc.current_if_taken() {
                                preproc.invert_current_level();
                                inactive = preproc.is_inactive();
                                if !inactive {
                                    sc.change_state(Style::active(StyleClass::Preprocessor));
                                }
                            } else if !preproc.is_inactive() {
                                preproc.invert_current_level();
                                inactive = preproc.is_inactive();
                                if !inactive {
                                    sc.change_state(Style::active(StyleClass::Preprocessor));
                                }
                            }
                        } else if sc.match_str("elif") {
                            // Only one branch of #if..#elif..#else is taken.
                            if !preproc.current_if_taken() {
                                let rest = get_rest_of_line(doc, sc.pos() + 2, true);
                                if eval::evaluate(&rest, &definitions) {
                                    preproc.invert_current_level();
                                    inactive = preproc.is_inactive();
                                    if !inactive {
                                        sc.change_state(Style::active(StyleClass::Preprocessor));
                                    }
                                }
                            } else if !preproc.is_inactive() {
                                preproc.invert_current_level();
                                inactive = preproc.is_inactive();
                                if !inactive {
                                    sc.change_state(Style::active(StyleClass::Preprocessor));
                                }
                            }
                        } else if sc.match_str("endif") {
                            preproc.end_section();
                            inactive = preproc.is_inactive();
                            sc.change_state(Style::new(StyleClass::Preprocessor, inactive));
                        } else if sc.match_str("define")
                            && self.options.update_preprocessor
                            && !preproc.is_inactive()
                        {
                            let rest = get_rest_of_line(doc, sc.pos() + 6, true);
                            // Macros with arguments are not handled.
                            if !rest.contains(')') {
                                let mut parts =
                                    rest.split([' ', '\t']).filter(|w| !w.is_empty());
                                if let Some(key) = parts.next() {
                                    let value = parts.next().unwrap_or("1");
                                    definitions.insert(key.to_owned(), value.to_owned());
                                    self.history.record(line_current, key, value);
                                    definitions_changed = true;
                                }
                            }
                        }
                    }
                } else if is_operator_char(sc.ch) {
                    sc.set_state(Style::new(StyleClass::Operator, inactive));
                }
            }

            if !is_space(sc.ch) && !is_space_equiv(sc.state) {
                visible_chars += 1;
            }
            continuation_line = false;
            sc.forward();
        }
        sc.complete();
        definitions_changed
    }

    /// Compute fold levels over already-styled text. Levels for the current
    /// and next line are stored together so an incremental run can resume
    /// from the previous line's packed value.
    pub fn fold(
        &self,
        start: usize,
        length: usize,
        init_style: u8,
        doc: &SourceBuffer,
        styles: &StyleBuffer,
        folds: &mut FoldBuffer,
    ) {
        if !self.options.fold {
            return;
        }

        let end_pos = start + length;
        let mut visible_chars = 0usize;
        let mut line_current = doc.line_of(start);
        let mut level_current = FOLD_LEVEL_BASE as i32;
        if line_current > 0 {
            level_current = (folds.level_at(line_current - 1) >> 16) as i32;
        }
        let mut level_min_current = level_current;
        let mut level_next = level_current;
        let mut ch_next = doc.byte_at(start, b' ');
        let mut style_next = styles.at(start);
        let mut style = init_style;

        for i in start..end_pos {
            let ch = ch_next;
            ch_next = doc.byte_at(i + 1, b' ');
            let style_prev = style;
            style = style_next;
            style_next = styles.at(i + 1);
            let at_eol = (ch == b'\r' && ch_next != b'\n') || ch == b'\n';

            if self.options.fold_comment && is_stream_comment_style(style) {
                if !is_stream_comment_style(style_prev)
                    && style_prev != StyleClass::CommentLineDoc as u8
                {
                    level_next += 1;
                } else if !is_stream_comment_style(style_next)
                    && style_next != StyleClass::CommentLineDoc as u8
                    && !at_eol
                {
                    // Comments do not end at line ends and the next byte may
                    // still be unstyled.
                    level_next -= 1;
                }
            }
            if self.options.fold_comment
                && self.options.fold_comment_explicit
                && style == StyleClass::CommentLine as u8
                && ch == b'/'
                && ch_next == b'/'
            {
                match doc.byte_at(i + 2, b' ') {
                    b'{' => level_next += 1,
                    b'}' => level_next -= 1,
                    _ => {}
                }
            }
            if self.options.fold_preprocessor
                && style == StyleClass::Preprocessor as u8
                && ch == b'#'
            {
                let mut j = i + 1;
                while j < end_pos && is_space_or_tab(doc.byte_at(j, b' ')) {
                    j += 1;
                }
                if doc.matches_at(j, "region") || doc.matches_at(j, "if") {
                    level_next += 1;
                } else if doc.matches_at(j, "end") {
                    level_next -= 1;
                }
            }
            if style == StyleClass::Operator as u8 {
                if ch == b'{' {
                    // Track the minimum before a '{' so "} else {" can fold
                    // at the outer level.
                    if level_min_current > level_next {
                        level_min_current = level_next;
                    }
                    level_next += 1;
                } else if ch == b'}' {
                    level_next -= 1;
                }
            }
            if !is_space(ch) {
                visible_chars += 1;
            }
            if at_eol || i == end_pos - 1 {
                let level_use = if self.options.fold_at_else {
                    level_min_current
                } else {
                    level_current
                };
                let mut lev = (level_use | (level_next << 16)) as u32;
                if visible_chars == 0 && self.options.fold_compact {
                    lev |= FOLD_LEVEL_WHITE_FLAG;
                }
                if level_use < level_next {
                    lev |= FOLD_LEVEL_HEADER_FLAG;
                }
                if lev != folds.level_at(line_current) {
                    folds.set_level(line_current, lev);
                }
                line_current += 1;
                level_current = level_next;
                level_min_current = level_current;
                if at_eol && doc.len() > 0 && i == doc.len() - 1 {
                    // The file ends in a newline: give the trailing empty
                    // line the same level, marked blank.
                    folds.set_level(
                        line_current,
                        (level_current | (level_current << 16)) as u32 | FOLD_LEVEL_WHITE_FLAG,
                    );
                }
                visible_chars = 0;
            }
        }
    }
}
