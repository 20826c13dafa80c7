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

//! Delimiter configuration
//!
//! The surrounding tokenizer finds tags with a matcher built from the current delimiters.
//! A tag splits into these parts:
//!
//! ```text
//! text   {{~{   #   each items   }~}}   text
//! |  |  |  || |  |       |       | ||  |  |
//! |  |  |  || |  op      inner   | ||  |  trailing text
//! |  |  |  || raw begin          | ||  trailing space
//! |  |  |  |space control        | |end
//! |  |  |  begin                 | space control
//! |  |  leading space            raw end
//! leading text
//! ```
//!
//! Switching delimiters rebuilds the matcher. `=` is reserved for the switch syntax itself
//! so delimiters containing it are refused.

use std::fmt::Display;

use regex::{Captures, Regex};
use tracing::debug;

use crate::context::CompileContext;
use crate::error::Diagnostic;

/// Capture group positions of the tag matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPart {
    LeadingText = 1,
    LeadingSpace,
    Begin,
    LeftSpaceControl,
    RawBegin,
    Operator,
    Inner,
    RawEnd,
    RightSpaceControl,
    End,
    TrailingSpace,
    TrailingText,
}

/// A compiled delimiter configuration
#[derive(Debug, Clone)]
pub struct Tokens {
    matcher: Regex,
    start_char: Option<char>,
    left: String,
    right: String,
}

impl Tokens {
    fn build(left: &str, right: &str, raw_count: &str) -> Self {
        let pattern = format!(
            r"(?s)^(.*?)(\s*)({})(~?)(\{{{raw_count})([\^#/!&>*]{{0,2}})(.*?)(\}}{raw_count})(~?)({})(\s*)(.*)$",
            regex::escape(left),
            regex::escape(right),
        );
        Self {
            matcher: Regex::new(&pattern).unwrap(),
            start_char: left.chars().next(),
            left: left.to_string(),
            right: right.to_string(),
        }
    }

    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// First character of the left delimiter, a cheap pre-check for tag scanning
    pub fn start_char(&self) -> Option<char> {
        self.start_char
    }

    pub fn left(&self) -> &str {
        &self.left
    }

    pub fn right(&self) -> &str {
        &self.right
    }

    /// Applies the matcher once, splitting out the first tag in `src`
    pub fn match_tag<'a>(&self, src: &'a str) -> Option<TagMatch<'a>> {
        self.matcher.captures(src).map(|caps| TagMatch::from_captures(&caps))
    }
}

/// Rebuilds the tag matcher for new delimiters
///
/// On a delimiter containing `=` a [`Diagnostic::ConfigurationError`] is recorded and the
/// previous configuration stays in place.
pub fn configure_delimiters(ctx: &mut CompileContext, left: &str, right: &str) {
    if left.contains('=') || right.contains('=') {
        ctx.report(Diagnostic::ConfigurationError {
            left: left.to_string(),
            right: right.to_string(),
        });
        return;
    }
    let raw_count = if ctx.raw_block_active {
        "{2}"
    } else if ctx.flags.raw_blocks {
        "{0,2}"
    } else {
        "?"
    };
    debug!(left, right, raw_count, "configured delimiters");
    ctx.tokens = Some(Tokens::build(left, right, raw_count));
}

/// The tag part of one match, the input to [`parse_tag`](crate::parser::parse_tag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawTag<'a> {
    pub begin: &'a str,
    pub left_space_control: &'a str,
    /// `{` for triple-stash, `{{` inside raw blocks
    pub raw_begin: &'a str,
    /// Up to two of `^ # / ! & > *`
    pub operator: &'a str,
    pub inner: &'a str,
    pub raw_end: &'a str,
    pub right_space_control: &'a str,
    pub end: &'a str,
}

impl<'a> RawTag<'a> {
    /// A `{{inner}}` tag with no markers
    pub fn new(inner: &'a str) -> Self {
        Self { begin: "{{", inner, end: "}}", ..Self::default() }
    }

    pub fn with_operator(mut self, operator: &'a str) -> Self {
        self.operator = operator;
        self
    }

    /// Marks the tag as `{{{triple-stash}}}`
    pub fn raw(mut self) -> Self {
        self.raw_begin = "{";
        self.raw_end = "}";
        self
    }
}

impl<'a> Display for RawTag<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for part in [
            self.begin,
            self.left_space_control,
            self.raw_begin,
            self.operator,
            self.inner,
            self.raw_end,
            self.right_space_control,
            self.end,
        ] {
            f.write_str(part)?;
        }
        Ok(())
    }
}

/// One tag found by [`Tokens::match_tag`] together with its surroundings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagMatch<'a> {
    pub leading_text: &'a str,
    pub leading_space: &'a str,
    pub tag: RawTag<'a>,
    pub trailing_space: &'a str,
    pub trailing_text: &'a str,
}

impl<'a> TagMatch<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        let part = |part: TagPart| caps.get(part as usize).map_or("", |m| m.as_str());
        Self {
            leading_text: part(TagPart::LeadingText),
            leading_space: part(TagPart::LeadingSpace),
            tag: RawTag {
                begin: part(TagPart::Begin),
                left_space_control: part(TagPart::LeftSpaceControl),
                raw_begin: part(TagPart::RawBegin),
                operator: part(TagPart::Operator),
                inner: part(TagPart::Inner),
                raw_end: part(TagPart::RawEnd),
                right_space_control: part(TagPart::RightSpaceControl),
                end: part(TagPart::End),
            },
            trailing_space: part(TagPart::TrailingSpace),
            trailing_text: part(TagPart::TrailingText),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Flags;

    use super::*;

    #[test]
    fn split_plain_tag() {
        let ctx = CompileContext::new(Flags::default());
        let found = ctx.tokens().unwrap().match_tag("Hello {{name}}!").unwrap();
        assert_eq!(found.leading_text, "Hello");
        assert_eq!(found.leading_space, " ");
        assert_eq!(found.tag.inner, "name");
        assert_eq!(found.tag.operator, "");
        assert_eq!(found.trailing_text, "!");
        assert_eq!(found.tag.to_string(), "{{name}}");
    }

    #[test]
    fn split_markers() {
        let ctx = CompileContext::new(Flags::default());
        let found = ctx.tokens().unwrap().match_tag("a {{~#each items~}} b").unwrap();
        assert_eq!(found.tag.left_space_control, "~");
        assert_eq!(found.tag.operator, "#");
        assert_eq!(found.tag.inner, "each items");
        assert_eq!(found.tag.right_space_control, "~");
        assert_eq!(found.trailing_text, "b");
    }

    #[test]
    fn split_triple_stash() {
        let ctx = CompileContext::new(Flags::default());
        let found = ctx.tokens().unwrap().match_tag("{{{html}}}").unwrap();
        assert_eq!(found.tag.raw_begin, "{");
        assert_eq!(found.tag.inner, "html");
        assert_eq!(found.tag.raw_end, "}");
    }

    #[test]
    fn raw_block_markers_need_the_flag() {
        let ctx = CompileContext::new(Flags { raw_blocks: true, ..Flags::default() });
        let found = ctx.tokens().unwrap().match_tag("{{{{raw}}}}").unwrap();
        assert_eq!(found.tag.raw_begin, "{{");
        assert_eq!(found.tag.inner, "raw");
    }

    #[test]
    fn custom_delimiters() {
        let mut ctx = CompileContext::new(Flags::default());
        configure_delimiters(&mut ctx, "<%", "%>");
        let tokens = ctx.tokens().unwrap();
        assert_eq!(tokens.start_char(), Some('<'));
        let found = tokens.match_tag("x <%> partial%> y").unwrap();
        assert_eq!(found.tag.operator, ">");
        assert_eq!(found.tag.inner, " partial");
        assert!(tokens.match_tag("{{name}}").is_none());
    }

    #[test]
    fn equals_sign_is_refused() {
        let mut ctx = CompileContext::new(Flags::default());
        configure_delimiters(&mut ctx, "<%=", "%>");
        assert_eq!(
            ctx.diagnostics(),
            [Diagnostic::ConfigurationError { left: "<%=".to_string(), right: "%>".to_string() }]
        );
        assert_eq!(ctx.tokens().unwrap().left(), "{{");
    }

    #[test]
    fn raw_tag_display() {
        let tag = RawTag::new("name").raw().with_operator("&");
        assert_eq!(tag.to_string(), "{{{&name}}}");
    }
}
