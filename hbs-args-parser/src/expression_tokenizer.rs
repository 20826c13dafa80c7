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

//! Splitting the inside of a tag into raw arguments
//!
//! Without advanced variables a tag is split on whitespace and nothing else. With them,
//! whitespace inside these constructs does not split:
//!
//! ```text
//! "quoted string"       \'escaped single quotes\'     [bracketed name]
//! name="quoted value"   name=\'quoted value\'          (sub expression (nested))
//! name=(sub expression) each items as |item index|
//! ```
//!
//! The returned arguments are slices of the tag text with their quotes, brackets and
//! parentheses still in place. A block param run (`as |a b|`) comes back without the `as`
//! and with the whitespace that followed it, which is how the analyzer tells it apart from
//! a bare `|a|` word.

use tracing::trace;

use crate::context::CompileContext;
use crate::error::Diagnostic;

/// What a pending multi-word argument is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    InDoubleQuote,
    InEscapedSingleQuote,
    InBracket,
    InParen(isize),
    /// Holds the end of the `as` word, where the emitted run starts
    InBlockParamList(usize),
}

/// A whitespace separated word as byte offsets into the tag text
#[derive(Debug, Clone, Copy)]
struct Word {
    start: usize,
    end: usize,
}

fn words(src: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut start = None;
    for (i, c) in src.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push(Word { start: s, end: i });
                start = None;
            }
            (false, None) => start = Some(i),
            _ => (),
        }
    }
    if let Some(s) = start {
        words.push(Word { start: s, end: src.len() });
    }
    words
}

fn leading_run(word: &str, c: char) -> usize {
    word.chars().take_while(|x| *x == c).count()
}

fn trailing_run(word: &str, c: char) -> usize {
    word.chars().rev().take_while(|x| *x == c).count()
}

/// Length of the `(` run in `name=((expr` style words: an open paren after the first
/// character with no `)` following it
fn inner_open_run(word: &str) -> usize {
    let Some(first) = word.chars().next() else {
        return 0;
    };
    let rest = &word[first.len_utf8()..];
    match rest.rfind('(') {
        Some(pos) if !rest[pos..].contains(')') => trailing_run(&rest[..=pos], '('),
        _ => 0,
    }
}

/// How far a word nested inside a subexpression deepens it
fn nested_opens(word: &str) -> usize {
    match leading_run(word, '(') {
        0 => inner_open_run(word),
        leading => leading,
    }
}

/// Decides whether `word` starts an argument that continues into the following words
fn opens(word: &str, end: usize, has_previous: bool) -> Option<State> {
    if word.starts_with('(') && !word.contains(')') {
        return Some(State::InParen(leading_run(word, '(') as isize));
    }
    if let Some(rest) = word.strip_prefix('"') {
        if !rest.contains('"') {
            return Some(State::InDoubleQuote);
        }
    }
    if let Some(rest) = word.strip_prefix("\\'") {
        if !rest.contains('\'') {
            return Some(State::InEscapedSingleQuote);
        }
    }
    if word.contains("=\"") && word.matches('"').count() == 1 {
        return Some(State::InDoubleQuote);
    }
    if !word.starts_with(['"', '\'']) {
        if let Some(pos) = word.rfind('[') {
            if !word[pos..].contains(']') {
                return Some(State::InBracket);
            }
        }
    }
    if word.contains("=\\'") && word.matches('\'').count() == 1 {
        return Some(State::InEscapedSingleQuote);
    }
    match inner_open_run(word) {
        0 => (),
        run => return Some(State::InParen(run as isize)),
    }
    if word == "as" && has_previous {
        return Some(State::InBlockParamList(end));
    }
    None
}

/// Splits the inner text of a tag into raw argument strings
///
/// `tag` is the text reported in diagnostics, usually the whole tag as written.
pub fn split_arguments<'a>(src: &'a str, tag: &str, ctx: &mut CompileContext) -> Vec<&'a str> {
    let words = words(src);
    if words.is_empty() {
        return src.split(' ').collect();
    }
    if !ctx.flags.advanced_variables {
        return words.iter().map(|w| &src[w.start..w.end]).collect();
    }

    let mut args = Vec::new();
    let mut state = State::Normal;
    let mut pending_start = 0;
    let mut pending_end = 0;
    for w in words {
        let word = &src[w.start..w.end];
        let closes = match state {
            State::Normal => {
                match opens(word, w.end, !args.is_empty()) {
                    Some(next) => {
                        state = next;
                        pending_start = w.start;
                        pending_end = w.end;
                    }
                    None => args.push(word),
                }
                continue;
            }
            State::InDoubleQuote => word.ends_with('"'),
            State::InEscapedSingleQuote => word.ends_with('\''),
            State::InBracket => word.ends_with(']'),
            State::InBlockParamList(_) => word.ends_with('|'),
            State::InParen(depth) => {
                let mut depth = depth + nested_opens(word) as isize;
                if word.ends_with(')') {
                    depth -= trailing_run(word, ')') as isize;
                }
                if depth < 0 {
                    ctx.report(Diagnostic::UnbalancedSubexpression { tag: tag.to_string() });
                    return args;
                }
                state = State::InParen(depth);
                depth == 0
            }
        };
        pending_end = w.end;
        if closes {
            let start = match state {
                State::InBlockParamList(body_start) => body_start,
                _ => pending_start,
            };
            args.push(&src[start..pending_end]);
            state = State::Normal;
        }
    }

    match state {
        State::Normal => (),
        State::InParen(_) => {
            // a nested split only sees text its enclosing split already reported
            if ctx.depth() == 0 {
                ctx.report(Diagnostic::UnbalancedSubexpression { tag: tag.to_string() });
            }
            args.push(&src[pending_start..pending_end]);
        }
        _ => args.push(&src[pending_start..pending_end]),
    }
    trace!(?args, "split tag arguments");
    args
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::context::Flags;

    use super::*;

    fn advanced() -> CompileContext {
        CompileContext::new(Flags { advanced_variables: true, named_arguments: true, ..Flags::default() })
    }

    fn split(src: &str) -> Vec<String> {
        let mut ctx = advanced();
        let args = split_arguments(src, src, &mut ctx).into_iter().map(str::to_string).collect();
        assert!(!ctx.has_errors(), "{:?}", ctx.diagnostics());
        args
    }

    #[test]
    fn plain_words_without_advanced_variables() {
        let mut ctx = CompileContext::new(Flags::default());
        assert_eq!(split_arguments("a  b", "", &mut ctx), ["a", "b"]);
        assert_eq!(split_arguments("a \"b c\"", "", &mut ctx), ["a", "\"b", "c\""]);
        assert_eq!(split_arguments("a [b c]", "", &mut ctx), ["a", "[b", "c]"]);
    }

    #[test]
    fn empty_tag_falls_back_to_space_split() {
        let mut ctx = advanced();
        assert_eq!(split_arguments("", "", &mut ctx), [""]);
    }

    #[rstest]
    #[case("a \"b c\"", &["a", "\"b c\""])]
    #[case("a \" b c\"", &["a", "\" b c\""])]
    #[case("a [b c]", &["a", "[b c]"])]
    #[case("a [ b c]", &["a", "[ b c]"])]
    #[case("a q=[b c]", &["a", "q=[b c]"])]
    #[case("a [q=[b c]", &["a", "[q=[b c]"])]
    #[case("a q=\"b c\"", &["a", "q=\"b c\""])]
    #[case("a q=\\' d e\\'", &["a", "q=\\' d e\\'"])]
    #[case("foo \\' ==\\' bar", &["foo", "\\' ==\\'", "bar"])]
    #[case("foo '==' bar", &["foo", "'=='", "bar"])]
    #[case("(foo bar)", &["(foo bar)"])]
    #[case("( foo bar)", &["( foo bar)"])]
    #[case("q=( foo bar)", &["q=( foo bar)"])]
    #[case("( foo (bar baz) )", &["( foo (bar baz) )"])]
    #[case("(foo (bar baz)) qux", &["(foo (bar baz))", "qux"])]
    #[case("((a b))", &["((a b))"])]
    #[case("(a b=(c d))", &["(a b=(c d))"])]
    #[case("(a (b) c) d", &["(a (b) c)", "d"])]
    fn merges(#[case] src: &str, #[case] expected: &[&str]) {
        assert_eq!(split(src), expected);
    }

    #[test]
    fn block_params_keep_leading_space() {
        assert_eq!(split("each items as |item index|"), ["each", "items", " |item index|"]);
        assert_eq!(split("with x as |y|"), ["with", "x", " |y|"]);
    }

    #[test]
    fn leading_as_is_a_word() {
        assert_eq!(split("as |a|"), ["as", "|a|"]);
    }

    #[test]
    fn unmatched_close_paren() {
        let mut ctx = advanced();
        let args = split_arguments("a (foo bar)) b", "{{a (foo bar)) b}}", &mut ctx);
        assert_eq!(args, ["a"]);
        assert_eq!(
            ctx.diagnostics(),
            [Diagnostic::UnbalancedSubexpression { tag: "{{a (foo bar)) b}}".to_string() }]
        );
    }

    #[test]
    fn unclosed_paren_is_flushed() {
        let mut ctx = advanced();
        let args = split_arguments("a (foo bar", "{{a (foo bar}}", &mut ctx);
        assert_eq!(args, ["a", "(foo bar"]);
        assert_eq!(ctx.diagnostics().len(), 1);
    }

    #[test]
    fn unclosed_quote_is_flushed() {
        let mut ctx = advanced();
        assert_eq!(split_arguments("a \"b c", "", &mut ctx), ["a", "\"b c"]);
        assert!(!ctx.has_errors());
    }

    #[test]
    fn unclosed_block_params_keep_as() {
        let mut ctx = advanced();
        assert_eq!(split_arguments("each items as |a b", "", &mut ctx), ["each", "items", "as |a b"]);
    }
}
