// MIT License
//
// Copyright (c) 2024 Jerome Johnson
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Resolving one raw argument into a path or a literal
//!
//! ```text
//! 123            number literal
//! "a b" \'a b\'  string literals, rendered as 'a b'
//! true null      keyword literals
//! name.first     path from the data context
//! ../../up       two parent hops, then up
//! this.id ./id   explicitly from the current context
//! a.[b c].d      bracketed segment names (advanced variables)
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::argument::{LiteralKind, ParsedArgument, Segment};
use crate::context::CompileContext;
use crate::error::Diagnostic;

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").unwrap());

static BRACKETED_SEGMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]+\]|[^\[\]./]+").unwrap());

/// Where an argument sits in its tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Index among the positional arguments
    Positional(usize),
    Named,
}

/// Canonical text of a number literal, `007` is `7` and `1.50` is `1.5`
fn canonical_number(src: &str) -> String {
    let digits = src.strip_prefix('+').unwrap_or(src);
    if !digits.contains(['.', 'e', 'E']) {
        if let Ok(n) = digits.parse::<i64>() {
            return n.to_string();
        }
    }
    match digits.parse::<f64>() {
        Ok(n) if n == 0.0 => "0".to_string(),
        Ok(n) if !n.is_finite() => src.to_string(),
        Ok(n) if !digits.contains(['.', 'e', 'E']) && n.fract() == 0.0 => {
            // wider than i64, f64 would round it
            digits.to_string()
        }
        Ok(n) => n.to_string(),
        Err(_) => src.to_string(),
    }
}

/// Turns `\"` into `"` unless the backslash is itself escaped
fn unescape_double_quotes(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars().peekable();
    let mut prev = None;
    while let Some(c) = chars.next() {
        if c == '\\' && prev != Some('\\') && chars.peek() == Some(&'"') {
            chars.next();
            out.push('"');
            prev = Some('"');
            continue;
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Literal rules; `as_is` keeps the text as a single segment path instead
fn literal(src: &str, as_is: bool) -> Option<ParsedArgument> {
    let (kind, text) = if NUMBER.is_match(src) {
        (LiteralKind::Number, canonical_number(src))
    } else if src.len() >= 2 && src.starts_with('"') && src.ends_with('"') {
        (LiteralKind::String, unescape_double_quotes(&src[1..src.len() - 1]))
    } else if src.len() >= 4 && src.starts_with("\\'") && src.ends_with("\\'") {
        (LiteralKind::String, src[2..src.len() - 2].to_string())
    } else if matches!(src, "true" | "false" | "null" | "undefined") {
        (LiteralKind::Keyword, src.to_string())
    } else {
        return None;
    };
    Some(match (as_is, kind) {
        (true, _) => ParsedArgument::path([text]),
        (false, LiteralKind::String) => ParsedArgument::literal(kind, format!("'{text}'")),
        (false, _) => ParsedArgument::literal(kind, text),
    })
}

/// Resolves one raw argument
///
/// The first positional argument is usually a helper or partial name, so literal syntax
/// there is kept as a plain name.
pub fn resolve(src: &str, ctx: &mut CompileContext, position: Position) -> ParsedArgument {
    let as_is = position == Position::Positional(0);
    if let Some(literal) = literal(src, as_is) {
        return literal;
    }

    let trimmed = src.trim();
    let mut rest = if trimmed == ".." { "../" } else { trimmed };
    let mut levels = 0;
    while let Some(stripped) = rest.strip_prefix("../") {
        levels += 1;
        ctx.usage.parent += 1;
        rest = stripped;
    }
    if levels > 0 && !ctx.flags.parent_access {
        ctx.report(Diagnostic::UnsupportedParentAccess { path: trimmed.to_string() });
    }

    let mut scoped = rest.contains("./");
    let rest = rest.replace("./", "");

    let bracketed = ctx.flags.advanced_variables && rest.contains(']');
    let tokens: Vec<&str> = if bracketed {
        BRACKETED_SEGMENTS.find_iter(&rest).map(|m| m.as_str()).collect()
    } else {
        rest.split(['.', '/']).filter(|s| !s.is_empty()).collect()
    };

    let mut segments = Vec::with_capacity(tokens.len() + 1);
    for token in tokens {
        if bracketed && token.starts_with('[') {
            segments.push(Segment::name(&token[1..token.len() - 1]));
        } else if (ctx.flags.implicit_this && token == "this") || token == "." {
            scoped = true;
        } else {
            segments.push(Segment::name(token));
        }
    }

    if ctx.flags.string_params && !as_is {
        let names: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Name(name) => Some(name.as_str()),
                Segment::Current => None,
            })
            .collect();
        return ParsedArgument::literal(LiteralKind::String, format!("'{}'", names.join(".")));
    }

    if scoped && levels == 0 && !segments.is_empty() {
        segments.insert(0, Segment::Current);
    }
    ParsedArgument::Path { levels, segments }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::context::Flags;

    use super::*;

    fn flags(advanced_variables: bool, implicit_this: bool) -> Flags {
        Flags { advanced_variables, implicit_this, parent_access: true, ..Flags::default() }
    }

    fn path(levels: usize, segments: &[&str]) -> ParsedArgument {
        ParsedArgument::Path {
            levels,
            segments: segments
                .iter()
                .map(|s| if *s == "0" { Segment::Current } else { Segment::name(*s) })
                .collect(),
        }
    }

    fn resolve_with(src: &str, flags: Flags, position: Position) -> ParsedArgument {
        let mut ctx = CompileContext::new(flags);
        resolve(src, &mut ctx, position)
    }

    #[rstest]
    #[case("name", false, false, path(0, &["name"]))]
    #[case("this", false, false, path(0, &["this"]))]
    #[case("this", false, true, path(0, &[]))]
    #[case("../", false, true, path(1, &[]))]
    #[case("..", false, true, path(1, &[]))]
    #[case("../.", false, true, path(1, &[]))]
    #[case("../this", false, true, path(1, &[]))]
    #[case("../a", false, true, path(1, &["a"]))]
    #[case("../../a.b", false, false, path(2, &["a", "b"]))]
    #[case("../../[a].b", false, false, path(2, &["[a]", "b"]))]
    #[case("../../[a].b", true, false, path(2, &["a", "b"]))]
    #[case("this.id", true, true, path(0, &["0", "id"]))]
    #[case("this.id", true, false, path(0, &["this", "id"]))]
    #[case("./id", true, false, path(0, &["0", "id"]))]
    #[case("a/b", false, false, path(0, &["a", "b"]))]
    #[case("a.[b c].d", true, false, path(0, &["a", "b c", "d"]))]
    #[case("[q=[b c]", true, false, path(0, &["q=[b c"]))]
    fn paths(#[case] src: &str, #[case] advanced: bool, #[case] this: bool, #[case] expected: ParsedArgument) {
        assert_eq!(resolve_with(src, flags(advanced, this), Position::Positional(1)), expected);
    }

    #[rstest]
    #[case("\"a.b\"", LiteralKind::String, "'a.b'")]
    #[case("123", LiteralKind::Number, "123")]
    #[case("007", LiteralKind::Number, "7")]
    #[case("+1.50", LiteralKind::Number, "1.5")]
    #[case("2.0", LiteralKind::Number, "2")]
    #[case("-3", LiteralKind::Number, "-3")]
    #[case("1e3", LiteralKind::Number, "1000")]
    #[case("1e999", LiteralKind::Number, "1e999")]
    #[case("12345678901234567890", LiteralKind::Number, "12345678901234567890")]
    #[case("null", LiteralKind::Keyword, "null")]
    #[case("true", LiteralKind::Keyword, "true")]
    #[case("\\' d e\\'", LiteralKind::String, "' d e'")]
    #[case("\"say \\\"hi\\\"\"", LiteralKind::String, "'say \"hi\"'")]
    #[case("\"\\\"hi\"", LiteralKind::String, "'\"hi'")]
    fn literals(#[case] src: &str, #[case] kind: LiteralKind, #[case] text: &str) {
        assert_eq!(
            resolve_with(src, flags(true, false), Position::Positional(1)),
            ParsedArgument::literal(kind, text)
        );
    }

    #[test]
    fn literals_at_first_position_stay_names() {
        let f = flags(true, true);
        assert_eq!(resolve_with("\"foo\"", f, Position::Positional(0)), path(0, &["foo"]));
        assert_eq!(resolve_with("123", f, Position::Positional(0)), path(0, &["123"]));
        assert_eq!(resolve_with("\\'foo\\'", f, Position::Positional(0)), path(0, &["foo"]));
        assert_eq!(resolve_with("null", f, Position::Named), ParsedArgument::literal(LiteralKind::Keyword, "null"));
    }

    #[test]
    fn string_params() {
        let f = Flags { string_params: true, ..flags(false, true) };
        assert_eq!(
            resolve_with("this.a.b", f, Position::Positional(1)),
            ParsedArgument::literal(LiteralKind::String, "'a.b'")
        );
        assert_eq!(resolve_with("a.b", f, Position::Positional(0)), path(0, &["a", "b"]));
        assert_eq!(
            resolve_with("a", f, Position::Named),
            ParsedArgument::literal(LiteralKind::String, "'a'")
        );
    }

    #[test]
    fn parent_hops_are_counted() {
        let mut ctx = CompileContext::new(flags(false, false));
        resolve("../../a", &mut ctx, Position::Positional(1));
        resolve("../b", &mut ctx, Position::Positional(1));
        assert_eq!(ctx.usage().parent, 3);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn parent_access_disabled() {
        let mut ctx = CompileContext::new(Flags::default());
        let resolved = resolve("../a", &mut ctx, Position::Positional(1));
        assert_eq!(resolved, path(1, &["a"]));
        assert_eq!(ctx.usage().parent, 1);
        assert_eq!(ctx.diagnostics(), [Diagnostic::UnsupportedParentAccess { path: "../a".to_string() }]);
    }

    #[test]
    fn deterministic() {
        let mut ctx = CompileContext::new(flags(true, true));
        let first = resolve("../this.a.[b]", &mut ctx, Position::Positional(2));
        let second = resolve("../this.a.[b]", &mut ctx, Position::Positional(2));
        assert_eq!(first, second);
        assert_eq!(first, path(1, &["a", "b"]));
        assert_eq!(ctx.usage().parent, 2);
    }
}
