//! Segment scanner: splits a lookup side into plain and `_kind(..)`
//! typed fragments via the `OUTSIDE` / `INSIDE_KIND` state machine in
//! the spec's state-machine design note. Deliberately not a `pest`
//! grammar — the embedded-form boundaries are simple enough that a
//! hand-rolled scanner is clearer than a parser generator here.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedKind {
    Text,
    Wildcard,
    Regex,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Plain(String),
    Typed {
        kind: EmbeddedKind,
        ignore_case: bool,
        payload: String,
    },
}

const OPENERS: &[(&str, EmbeddedKind, bool)] = &[
    ("_itext(", EmbeddedKind::Text, true),
    ("_text(", EmbeddedKind::Text, false),
    ("_iwildcard(", EmbeddedKind::Wildcard, true),
    ("_wildcard(", EmbeddedKind::Wildcard, false),
    ("_iregex(", EmbeddedKind::Regex, true),
    ("_regex(", EmbeddedKind::Regex, false),
);

enum State {
    Outside,
    InsideKind {
        kind: EmbeddedKind,
        ignore_case: bool,
        depth: u32,
    },
}

/// Scan `s` into alternating plain/typed segments.
pub fn scan(s: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut state = State::Outside;
    let mut plain = String::new();
    let mut payload = String::new();

    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match &mut state {
            State::Outside => {
                if let Some(&(opener, kind, ignore_case)) =
                    OPENERS.iter().find(|(op, _, _)| s[i..].starts_with(op))
                {
                    if !plain.is_empty() {
                        segments.push(Segment::Plain(std::mem::take(&mut plain)));
                    }
                    i += opener.len();
                    state = State::InsideKind {
                        kind,
                        ignore_case,
                        depth: 1,
                    };
                    continue;
                }
                plain.push(s[i..].chars().next().unwrap());
                i += s[i..].chars().next().unwrap().len_utf8();
            }
            State::InsideKind {
                kind,
                ignore_case,
                depth,
            } => {
                let c = s[i..].chars().next().unwrap();
                match c {
                    '(' => {
                        *depth += 1;
                        payload.push(c);
                    }
                    ')' => {
                        *depth -= 1;
                        if *depth == 0 {
                            segments.push(Segment::Typed {
                                kind: *kind,
                                ignore_case: *ignore_case,
                                payload: std::mem::take(&mut payload),
                            });
                            state = State::Outside;
                        } else {
                            payload.push(c);
                        }
                    }
                    other => payload.push(other),
                }
                i += c.len_utf8();
            }
        }
    }

    match state {
        State::Outside => {
            if !plain.is_empty() {
                segments.push(Segment::Plain(plain));
            }
            Ok(segments)
        }
        State::InsideKind { .. } => Err(Error::LookupSyntax(format!(
            "unterminated embedded form in {s:?}"
        ))),
    }
}
