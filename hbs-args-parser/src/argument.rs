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

//! Parsed tag arguments
//!
//! A tag such as `{{#each (filter items active=true) as |item idx|}}` parses into an
//! [`ArgumentList`] holding:
//! - positional arguments, in the order they were written
//! - named arguments (`active=true`), keyed by name
//! - block params (`|item idx|`), kept apart from both
//!
//! Each argument is a [`ParsedArgument`]: a path into the data context, a literal, or a
//! nested subexpression.

use std::fmt::Display;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Resolve explicitly from the current context (`this.x`, `./x`)
    Current,
    Name(String),
}

impl Segment {
    pub fn name(name: impl Into<String>) -> Self {
        Segment::Name(name.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    /// Rendered text is wrapped in single quotes
    String,
    /// `true`, `false`, `null` or `undefined`
    Keyword,
}

/// A `(helper arg...)` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubExpression {
    pub args: ArgumentList,
    /// The subexpression as written, parentheses included
    pub source: String,
}

/// A classified tag argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgument {
    /// `levels` parent hops followed by `segments`
    Path { levels: usize, segments: Vec<Segment> },
    Literal { kind: LiteralKind, text: String },
    SubExpression(SubExpression),
}

impl ParsedArgument {
    /// A path with no parent hops
    pub fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParsedArgument::Path {
            levels: 0,
            segments: segments.into_iter().map(|s| Segment::Name(s.into())).collect(),
        }
    }

    pub fn literal(kind: LiteralKind, text: impl Into<String>) -> Self {
        ParsedArgument::Literal { kind, text: text.into() }
    }

    /// The name a helper call would be looked up by, if this argument names one
    pub fn helper_name(&self) -> Option<&str> {
        match self {
            ParsedArgument::Path { levels: 0, segments } => match segments.first() {
                Some(Segment::Name(name)) => Some(name),
                _ => None,
            },
            _ => None,
        }
    }

    /// True for a path that navigates nowhere, e.g. a bare `this`
    pub fn is_empty_path(&self) -> bool {
        matches!(self, ParsedArgument::Path { levels: 0, segments } if segments.is_empty())
    }
}

impl Display for ParsedArgument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParsedArgument::Path { levels, segments } => {
                for _ in 0..*levels {
                    f.write_str("../")?;
                }
                let mut glue = "";
                for segment in segments {
                    f.write_str(glue)?;
                    match segment {
                        Segment::Current => f.write_str("this")?,
                        Segment::Name(name) => f.write_str(name)?,
                    }
                    glue = ".";
                }
                Ok(())
            }
            ParsedArgument::Literal { text, .. } => f.write_str(text),
            ParsedArgument::SubExpression(sub) => f.write_str(&sub.source),
        }
    }
}

/// The arguments of one tag or subexpression
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentList {
    positional: Vec<ParsedArgument>,
    named: Vec<(String, ParsedArgument)>,
    block_params: Option<Vec<String>>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(&self) -> &[ParsedArgument] {
        &self.positional
    }

    /// Named arguments in the order their names first appeared
    pub fn named(&self) -> &[(String, ParsedArgument)] {
        &self.named
    }

    pub fn get(&self, index: usize) -> Option<&ParsedArgument> {
        self.positional.get(index)
    }

    pub fn get_named(&self, name: &str) -> Option<&ParsedArgument> {
        self.named.iter().find(|(key, _)| key == name).map(|(_, value)| value)
    }

    pub fn block_params(&self) -> Option<&[String]> {
        self.block_params.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty() && self.block_params.is_none()
    }

    pub fn push_positional(&mut self, argument: ParsedArgument) {
        self.positional.push(argument);
    }

    /// Stores a named argument, a repeated name overwrites the earlier value in place
    pub fn insert_named(&mut self, name: impl Into<String>, argument: ParsedArgument) {
        let name = name.into();
        match self.named.iter_mut().find(|(key, _)| *key == name) {
            Some((_, value)) => *value = argument,
            None => self.named.push((name, argument)),
        }
    }

    pub fn set_block_params(&mut self, params: Vec<String>) {
        self.block_params = Some(params);
    }

    pub(crate) fn positional_mut(&mut self) -> &mut Vec<ParsedArgument> {
        &mut self.positional
    }
}

/// Removes the block params from a parsed tag and returns them
pub fn extract_block_params(args: &mut ArgumentList) -> Option<Vec<String>> {
    args.block_params.take()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_arguments_keep_first_position() {
        let mut args = ArgumentList::new();
        args.insert_named("a", ParsedArgument::path(["x"]));
        args.insert_named("b", ParsedArgument::path(["y"]));
        args.insert_named("a", ParsedArgument::path(["z"]));
        let names: Vec<&str> = args.named().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(args.get_named("a"), Some(&ParsedArgument::path(["z"])));
    }

    #[test]
    fn extract_takes_block_params_once() {
        let mut args = ArgumentList::new();
        args.push_positional(ParsedArgument::path(["items"]));
        args.set_block_params(vec!["item".to_string(), "index".to_string()]);
        assert_eq!(extract_block_params(&mut args), Some(vec!["item".to_string(), "index".to_string()]));
        assert_eq!(extract_block_params(&mut args), None);
        assert_eq!(args.positional().len(), 1);
    }

    #[test]
    fn helper_name_only_for_plain_paths() {
        assert_eq!(ParsedArgument::path(["lookup", "x"]).helper_name(), Some("lookup"));
        let parent = ParsedArgument::Path { levels: 1, segments: vec![Segment::name("up")] };
        assert_eq!(parent.helper_name(), None);
        let scoped = ParsedArgument::Path { levels: 0, segments: vec![Segment::Current, Segment::name("id")] };
        assert_eq!(scoped.helper_name(), None);
        assert_eq!(ParsedArgument::literal(LiteralKind::Number, "1").helper_name(), None);
    }

    #[test]
    fn display_path() {
        let path = ParsedArgument::Path { levels: 2, segments: vec![Segment::name("a"), Segment::name("b")] };
        assert_eq!(path.to_string(), "../../a.b");
        let scoped = ParsedArgument::Path { levels: 0, segments: vec![Segment::Current, Segment::name("id")] };
        assert_eq!(scoped.to_string(), "this.id");
    }
}
