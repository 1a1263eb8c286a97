//! Fold levels computed over styled text.

use pawn_common::{FoldBuffer, SourceBuffer, StyleBuffer, FOLD_LEVEL_BASE};
use pawn_lexer::Lexer;

fn folded(text: &str, props: &[(&str, &str)]) -> FoldBuffer {
    let mut lexer = Lexer::new(true);
    lexer.set_property("fold", "1").unwrap();
    for (key, value) in props {
        lexer.set_property(key, value).unwrap();
    }
    let doc = SourceBuffer::new(text);
    let mut styles = StyleBuffer::new(doc.len());
    lexer.lex(0, doc.len(), 0, &doc, &mut styles);
    let mut folds = FoldBuffer::new();
    lexer.fold(0, doc.len(), 0, &doc, &styles, &mut folds);
    folds
}

const BASE: u32 = FOLD_LEVEL_BASE;

#[test]
fn braces_open_a_fold() {
    let folds = folded("void f()\n{\nx();\n}\ny\n", &[]);
    assert_eq!(folds.fold_level(0).number(), BASE);
    assert!(!folds.fold_level(0).is_header());

    assert!(folds.fold_level(1).is_header());
    assert_eq!(folds.fold_level(1).number(), BASE);
    assert_eq!(folds.fold_level(1).next(), BASE + 1);

    assert_eq!(folds.fold_level(2).number(), BASE + 1);
    assert_eq!(folds.fold_level(3).number(), BASE + 1);
    assert_eq!(folds.fold_level(3).next(), BASE);
    assert_eq!(folds.fold_level(4).number(), BASE);
}

#[test]
fn fold_disabled_writes_nothing() {
    let mut lexer = Lexer::new(true);
    let doc = SourceBuffer::new("{\nx\n}\n");
    let mut styles = StyleBuffer::new(doc.len());
    lexer.lex(0, doc.len(), 0, &doc, &mut styles);
    let mut folds = FoldBuffer::new();
    lexer.fold(0, doc.len(), 0, &doc, &styles, &mut folds);
    for line in 0..4 {
        assert_eq!(folds.level_at(line), BASE);
    }
}

#[test]
fn stream_comments_fold_when_enabled() {
    let text = "/*\nx\n*/\ny\n";
    let folds = folded(text, &[("fold.comment", "1")]);
    assert!(folds.fold_level(0).is_header());
    assert_eq!(folds.fold_level(1).number(), BASE + 1);
    assert_eq!(folds.fold_level(2).number(), BASE + 1);
    assert_eq!(folds.fold_level(2).next(), BASE);
    assert_eq!(folds.fold_level(3).number(), BASE);

    // without the option the same text stays flat
    let flat = folded(text, &[]);
    assert!(!flat.fold_level(0).is_header());
    assert_eq!(flat.fold_level(1).number(), BASE);
}

#[test]
fn explicit_comment_markers_fold() {
    let text = "//{\na\n//}\nb\n";
    let folds = folded(text, &[("fold.comment", "1")]);
    assert!(folds.fold_level(0).is_header());
    assert_eq!(folds.fold_level(1).number(), BASE + 1);
    assert_eq!(folds.fold_level(2).next(), BASE);

    let disabled = folded(
        text,
        &[("fold.comment", "1"), ("fold.pawn.comment.explicit", "0")],
    );
    assert!(!disabled.fold_level(0).is_header());
}

#[test]
fn preprocessor_regions_fold() {
    let folds = folded("#region init\na\n#end\nb\n", &[("fold.preprocessor", "1")]);
    assert!(folds.fold_level(0).is_header());
    assert_eq!(folds.fold_level(1).number(), BASE + 1);
    assert_eq!(folds.fold_level(2).next(), BASE);
    assert_eq!(folds.fold_level(3).number(), BASE);
}

#[test]
fn if_endif_folds_like_a_region() {
    let folds = folded("#if 1\na\n#endif\nb\n", &[("fold.preprocessor", "1")]);
    assert!(folds.fold_level(0).is_header());
    assert_eq!(folds.fold_level(1).number(), BASE + 1);
    assert_eq!(folds.fold_level(2).next(), BASE);
}

#[test]
fn compact_mode_flags_blank_lines() {
    let text = "a\n\nb\n";
    let folds = folded(text, &[("fold.compact", "1")]);
    assert!(folds.fold_level(1).is_white());
    assert!(!folds.fold_level(0).is_white());

    let loose = folded(text, &[]);
    assert!(!loose.fold_level(1).is_white());
}

#[test]
fn fold_at_else_moves_the_boundary() {
    let text = "if (x) {\na;\n} else {\nb;\n}\n";

    let folds = folded(text, &[("fold.at.else", "1")]);
    assert!(folds.fold_level(2).is_header());
    assert_eq!(folds.fold_level(2).number(), BASE);

    let folds = folded(text, &[]);
    assert!(!folds.fold_level(2).is_header());
    assert_eq!(folds.fold_level(2).number(), BASE + 1);
}

#[test]
fn trailing_newline_gets_a_blank_final_line() {
    let folds = folded("{\nx\n}\n", &[]);
    // the empty line after the final newline mirrors the level, marked blank
    assert!(folds.fold_level(3).is_white());
    assert_eq!(folds.fold_level(3).number(), BASE);
}

#[test]
fn inactive_braces_do_not_fold() {
    // the '{' sits in a false conditional branch; its style carries the
    // inactive flag so the operator comparison does not match
    let folds = folded("#if 0\n{\n#endif\nx\n", &[]);
    assert!(!folds.fold_level(1).is_header());
    assert_eq!(folds.fold_level(2).number(), BASE);
    assert_eq!(folds.fold_level(3).number(), BASE);
}
