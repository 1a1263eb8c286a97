//! Boolean expression evaluator for `#if`/`#elif` conditions.
//!
//! The raw text after the directive is tokenized against the active
//! definition table, then reduced in fixed stages: `defined(...)` and
//! `defined NAME` forms, parenthesized groups, unary negation, and three
//! precedence tiers each applied left to right. Unknown identifiers are dropped during
//! tokenization rather than substituted with zero, and bracket reduction
//! pairs the first `(` with the first `)` in the remaining stream; both
//! behaviors are long-standing and kept as-is.

use rustc_hash::FxHashMap;

/// Which precedence pass reduces an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Arithmetic,
    Relational,
    Logical,
}

/// Operators recognized in condition expressions.
///
/// Greedy two-character lexing can also produce combinations with no
/// meaning (`<>`, `|&`, a bare `=`); those carry only the tier implied by
/// their first character and reduce to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,
    Not,
    AndAnd,
    OrOr,
    LParen,
    RParen,
    Unknown(Option<Tier>),
}

impl OpKind {
    fn from_text(text: &str) -> OpKind {
        match text {
            "+" => OpKind::Plus,
            "-" => OpKind::Minus,
            "*" => OpKind::Star,
            "/" => OpKind::Slash,
            "%" => OpKind::Percent,
            "<" => OpKind::Lt,
            "<=" => OpKind::LtEq,
            ">" => OpKind::Gt,
            ">=" => OpKind::GtEq,
            "==" => OpKind::EqEq,
            "!=" => OpKind::NotEq,
            "!" => OpKind::Not,
            "&&" => OpKind::AndAnd,
            "||" => OpKind::OrOr,
            "(" => OpKind::LParen,
            ")" => OpKind::RParen,
            _ => {
                let first = text.bytes().next().unwrap_or(0);
                let tier = if is_arith_char(first) {
                    Some(Tier::Arithmetic)
                } else if is_rel_char(first) {
                    Some(Tier::Relational)
                } else if is_logical_char(first) {
                    Some(Tier::Logical)
                } else {
                    None
                };
                OpKind::Unknown(tier)
            }
        }
    }

    fn tier(self) -> Option<Tier> {
        match self {
            OpKind::Plus | OpKind::Minus | OpKind::Star | OpKind::Slash | OpKind::Percent => {
                Some(Tier::Arithmetic)
            }
            OpKind::Lt
            | OpKind::LtEq
            | OpKind::Gt
            | OpKind::GtEq
            | OpKind::EqEq
            | OpKind::NotEq
            | OpKind::Not => Some(Tier::Relational),
            OpKind::AndAnd | OpKind::OrOr => Some(Tier::Logical),
            OpKind::LParen | OpKind::RParen => None,
            OpKind::Unknown(tier) => tier,
        }
    }
}

/// A token in the reduction stream: a literal value (number text or a
/// macro's substituted value) or an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExprToken {
    Value(String),
    Op(OpKind),
}

fn is_arith_char(b: u8) -> bool {
    matches!(b, b'+' | b'-' | b'*' | b'/' | b'%')
}

fn is_rel_char(b: u8) -> bool {
    matches!(b, b'=' | b'!' | b'<' | b'>')
}

fn is_logical_char(b: u8) -> bool {
    matches!(b, b'|' | b'&')
}

/// Word characters inside condition expressions: identifiers, numbers,
/// and anything outside ASCII.
fn is_word_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || b >= 0x80
}

/// `atoi`-style integer prefix of a token's text; operators read as zero.
fn token_int(token: &ExprToken) -> i64 {
    match token {
        ExprToken::Value(text) => leading_int(text),
        ExprToken::Op(_) => 0,
    }
}

fn leading_int(s: &str) -> i64 {
    let t = s.trim_start();
    let (negative, digits) = match t.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, t.strip_prefix('+').unwrap_or(t)),
    };
    let mut value: i64 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i64);
    }
    if negative {
        -value
    } else {
        value
    }
}

/// Evaluate the text after `#if`/`#elif` against the active definitions.
///
/// False iff the reduced token list is empty or a single `""`/`"0"` value;
/// anything else, including stray unreduced operators, is true.
pub fn evaluate(expr: &str, definitions: &FxHashMap<String, String>) -> bool {
    let mut tokens = tokenize(expr, definitions);
    evaluate_tokens(&mut tokens);
    let is_false = tokens.is_empty()
        || (tokens.len() == 1
            && matches!(&tokens[0], ExprToken::Value(v) if v.is_empty() || v == "0"));
    !is_false
}

/// Split the expression into tokens, substituting macro values.
///
/// A word found in the table becomes its value text; a word that is numeric
/// or the literal `defined` is kept; any other word is dropped. A word
/// directly following a `defined` token is the paren-less `defined NAME`
/// form and reduces to membership on the spot. Relational and logical
/// operator characters greedily pair with a second character of the same
/// class.
fn tokenize(expr: &str, definitions: &FxHashMap<String, String>) -> Vec<ExprToken> {
    let bytes = expr.as_bytes();
    let mut tokens = Vec::new();
    let mut word: Vec<u8> = Vec::new();
    let mut i = 0;
    loop {
        let c = bytes.get(i).copied().unwrap_or(0);
        if c != 0 && is_word_char(c) {
            word.push(c);
        } else {
            let name = String::from_utf8_lossy(&word).into_owned();
            if !name.is_empty()
                && matches!(tokens.last(), Some(ExprToken::Value(v)) if v == "defined")
            {
                let result = if definitions.contains_key(&name) { "1" } else { "0" };
                let last = tokens.len() - 1;
                tokens[last] = ExprToken::Value(result.to_owned());
            } else if let Some(value) = definitions.get(&name) {
                tokens.push(ExprToken::Value(value.clone()));
            } else if !name.is_empty()
                && (name.as_bytes()[0].is_ascii_digit() || name == "defined")
            {
                tokens.push(ExprToken::Value(name));
            }
            word.clear();
            if c == 0 {
                break;
            }
            if c != b' ' && c != b'\t' {
                let mut op = vec![c];
                let next = bytes.get(i + 1).copied().unwrap_or(0);
                if (is_rel_char(c) && is_rel_char(next))
                    || (is_logical_char(c) && is_logical_char(next))
                {
                    op.push(next);
                    i += 1;
                }
                let text = String::from_utf8_lossy(&op).into_owned();
                tokens.push(ExprToken::Op(OpKind::from_text(&text)));
            }
        }
        i += 1;
    }
    tokens
}

fn is_lparen(token: &ExprToken) -> bool {
    *token == ExprToken::Op(OpKind::LParen)
}

fn is_rparen(token: &ExprToken) -> bool {
    *token == ExprToken::Op(OpKind::RParen)
}

/// Reduce a token stream in place to (ideally) a single value.
fn evaluate_tokens(tokens: &mut Vec<ExprToken>) {
    // `defined(X)` forms. Membership was already resolved during
    // tokenization: a defined name became its value, an unknown name was
    // dropped, so the argument count distinguishes the two cases.
    let mut i = 0;
    while i + 2 < tokens.len() {
        let is_defined = matches!(&tokens[i], ExprToken::Value(w) if w == "defined")
            && tokens[i + 1] == ExprToken::Op(OpKind::LParen);
        if is_defined {
            let mut value = "0";
            if is_rparen(&tokens[i + 2]) {
                tokens.drain(i + 1..i + 3);
            } else if tokens.get(i + 3).is_some_and(is_rparen) {
                tokens.drain(i + 1..i + 4);
                value = "1";
            }
            tokens[i] = ExprToken::Value(value.to_owned());
        } else {
            i += 1;
        }
    }

    // Parenthesized groups: pair the first `(` with the first `)`, reduce
    // the enclosed tokens recursively, and splice the result back. The
    // insertion happens before the removal, with both brackets re-located
    // in between.
    loop {
        let open = tokens.iter().position(is_lparen);
        let close = tokens.iter().position(is_rparen);
        let (Some(open), Some(close)) = (open, close) else {
            break;
        };
        if close <= open {
            break;
        }
        let mut inner: Vec<ExprToken> = tokens[open + 1..close].to_vec();
        evaluate_tokens(&mut inner);
        tokens.splice(open..open, inner);
        let open = tokens.iter().position(is_lparen);
        let close = tokens.iter().position(is_rparen);
        match (open, close) {
            (Some(open), Some(close)) if open <= close => {
                tokens.drain(open..=close);
            }
            _ => break,
        }
    }

    // Unary logical negation, left to right: `!` consumes the following
    // token and the pair becomes 1 or 0.
    let mut j = 0;
    while j + 1 < tokens.len() {
        if tokens[j] == ExprToken::Op(OpKind::Not) {
            let value = token_int(&tokens[j + 1]);
            let result = if value == 0 { "1" } else { "0" };
            tokens.splice(j..j + 2, std::iter::once(ExprToken::Value(result.to_owned())));
        } else {
            j += 1;
        }
    }

    // Three fixed precedence tiers, each a repeated left-to-right scan
    // reducing (operand, operator, operand) triples.
    for tier in [Tier::Arithmetic, Tier::Relational, Tier::Logical] {
        let mut k = 0;
        while k + 2 < tokens.len() {
            let op = match &tokens[k + 1] {
                ExprToken::Op(kind) if kind.tier() == Some(tier) => *kind,
                _ => {
                    k += 1;
                    continue;
                }
            };
            let a = token_int(&tokens[k]);
            let b = token_int(&tokens[k + 2]);
            let result = apply(op, a, b);
            tokens.splice(
                k..k + 3,
                std::iter::once(ExprToken::Value(result.to_string())),
            );
        }
    }
}

/// Apply a binary operator. Division and modulo by zero substitute a
/// divisor of 1; operators with no defined meaning reduce to 0 but still
/// consume their operands.
fn apply(op: OpKind, a: i64, b: i64) -> i64 {
    match op {
        OpKind::Plus => a.wrapping_add(b),
        OpKind::Minus => a.wrapping_sub(b),
        OpKind::Star => a.wrapping_mul(b),
        OpKind::Slash => a.wrapping_div(if b == 0 { 1 } else { b }),
        OpKind::Percent => a.wrapping_rem(if b == 0 { 1 } else { b }),
        OpKind::Lt => (a < b) as i64,
        OpKind::LtEq => (a <= b) as i64,
        OpKind::Gt => (a > b) as i64,
        OpKind::GtEq => (a >= b) as i64,
        OpKind::EqEq => (a == b) as i64,
        OpKind::NotEq => (a != b) as i64,
        OpKind::AndAnd => (a != 0 && b != 0) as i64,
        OpKind::OrOr => (a != 0 || b != 0) as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn arithmetic_feeds_relational() {
        assert!(evaluate("1 + 2 == 3", &defs(&[])));
        assert!(!evaluate("1 + 1 == 3", &defs(&[])));
    }

    #[test]
    fn logical_tier_runs_last() {
        assert!(!evaluate("0 && 1", &defs(&[])));
        assert!(evaluate("0 || 1", &defs(&[])));
        assert!(evaluate("1 + 1 == 2 && 2 > 1", &defs(&[])));
    }

    #[test]
    fn defined_with_parens_checks_membership() {
        assert!(evaluate("defined(FOO)", &defs(&[("FOO", "1")])));
        assert!(!evaluate("defined(FOO)", &defs(&[])));
        assert!(evaluate("!defined(FOO)", &defs(&[])));
        assert!(!evaluate("!defined(FOO)", &defs(&[("FOO", "0")])));
    }

    #[test]
    fn defined_without_parens_checks_membership() {
        assert!(evaluate("defined FOO", &defs(&[("FOO", "1")])));
        assert!(!evaluate("defined FOO", &defs(&[])));
        // membership, not truthiness of the value
        assert!(evaluate("defined ZERO", &defs(&[("ZERO", "0")])));
        assert!(evaluate("!defined FOO", &defs(&[])));
        assert!(!evaluate("defined FOO && 0", &defs(&[("FOO", "1")])));
    }

    #[test]
    fn macro_values_substitute_into_the_expression() {
        let table = defs(&[("VERSION", "200")]);
        assert!(evaluate("VERSION >= 150", &table));
        assert!(!evaluate("VERSION >= 300", &table));
        assert!(!evaluate("ZERO", &defs(&[("ZERO", "0")])));
    }

    #[test]
    fn empty_and_zero_are_false() {
        assert!(!evaluate("", &defs(&[])));
        assert!(!evaluate("0", &defs(&[])));
        assert!(!evaluate("   ", &defs(&[])));
        assert!(evaluate("2", &defs(&[])));
    }

    #[test]
    fn division_by_zero_substitutes_divisor_one() {
        assert!(evaluate("10 / 0 == 10", &defs(&[])));
        assert!(!evaluate("7 % 0", &defs(&[]))); // 7 % 1 == 0
    }

    #[test]
    fn unknown_identifiers_are_dropped_not_zeroed() {
        // "MISSING == 5" loses its left operand; the leftover pair of
        // tokens is not a single zero, so the expression reads true.
        assert!(evaluate("MISSING == 5", &defs(&[])));
    }

    #[test]
    fn parenthesized_groups_reduce_first() {
        assert!(evaluate("(1 + 2) * 3 == 9", &defs(&[])));
        assert!(!evaluate("(1 || 0) && (0)", &defs(&[])));
    }

    #[test]
    fn bracket_reduction_pairs_first_open_with_first_close() {
        // Nested brackets pair the outer `(` with the inner `)`, leaving a
        // stray `)` behind, which reads true regardless of the value.
        assert!(evaluate("((0))", &defs(&[])));
    }

    #[test]
    fn negation_consumes_the_following_token() {
        assert!(!evaluate("!1", &defs(&[])));
        assert!(evaluate("!0", &defs(&[])));
        assert!(evaluate("!!1", &defs(&[])));
    }

    #[test]
    fn unknown_operator_combinations_reduce_to_zero() {
        // `<>` lexes as one relational-class token with no meaning; the
        // triple still reduces, to 0.
        assert!(!evaluate("1 <> 2", &defs(&[])));
    }

    #[test]
    fn relational_tier_handles_not_equal() {
        assert!(evaluate("1 != 2", &defs(&[])));
        assert!(!evaluate("2 != 2", &defs(&[])));
    }
}
