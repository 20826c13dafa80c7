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

//! Handlebars tag argument parser
//!
//! This crate parses the inside of one Handlebars tag into structured arguments for a
//! template compiler. Finding the tags in template text and generating code from the result
//! are left to the caller; this crate sits in between.
//!
//! # Features
//!
//! - Paths: `name`, `a.b`, `a/b`, `../parent`, `this.id`, `./id`, `a.[odd name]`
//! - Literals: numbers, `"strings"`, `\'strings\'`, `true`, `false`, `null`, `undefined`
//! - Subexpressions: `(helper arg (nested arg))`
//! - Named arguments: `key=value`, `[odd key]=value`, `key=(helper arg)`
//! - Block params: `as |item index|`
//! - Partial names: `{{> "my partial"}}`
//! - Configurable delimiters
//!
//! Problems in the template never abort parsing. They are collected as [`Diagnostic`]s on
//! the [`CompileContext`] so a compiler can report all of them at once.
//!
//! # Example
//!
//! ```rust
//! use hbs_args_parser::{parse_tag, CompileContext, Flags, RawTag};
//! use hbs_args_parser::{extract_block_params, ParsedArgument, Segment};
//!
//! let mut ctx = CompileContext::new(Flags::handlebars());
//! let tokens = ctx.tokens().unwrap().clone();
//! let found = tokens.match_tag("<ul>{{#each ../items as |item|}}").unwrap();
//!
//! let (raw, mut args) = parse_tag(&found.tag, &mut ctx);
//! assert!(!raw);
//! assert_eq!(
//!     args.get(1),
//!     Some(&ParsedArgument::Path { levels: 1, segments: vec![Segment::name("items")] })
//! );
//! assert_eq!(extract_block_params(&mut args), Some(vec!["item".to_string()]));
//! assert!(!ctx.has_errors());
//! ```
//!
//! # Module Structure
//!
//! - `token.rs`: delimiter configuration and the tag matcher
//! - `expression_tokenizer.rs`: splitting a tag into raw arguments
//! - `parser.rs`: classifying raw arguments, subexpressions
//! - `path.rs`: path and literal grammar
//! - `argument.rs`: parsed argument types
//! - `context.rs`: flags and per-compile state
//! - `error.rs`: diagnostics

pub mod argument;
pub mod context;
pub mod error;
pub mod expression_tokenizer;
pub mod parser;
pub mod path;
pub mod token;

pub use argument::{extract_block_params, ArgumentList, LiteralKind, ParsedArgument, Segment, SubExpression};
pub use context::{CompileContext, FeatureUsage, Flags, HelperRegistry, DEFAULT_MAX_DEPTH};
pub use error::{Diagnostic, MalformedReason};
pub use expression_tokenizer::split_arguments;
pub use parser::{parse_subexpression, parse_tag};
pub use path::{resolve, Position};
pub use token::{configure_delimiters, RawTag, TagMatch, TagPart, Tokens};
