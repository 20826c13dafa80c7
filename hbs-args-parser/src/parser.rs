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

//! Classifying the arguments of a tag
//!
//! [`parse_tag`] splits the inner text of a tag and classifies every argument in order:
//!
//! 1. `(helper arg...)` subexpressions, parsed recursively
//! 2. `as |a b|` block params
//! 3. `name=value` named arguments
//! 4. name validation for advanced variables
//! 5. paths and literals
//!
//! Problems are recorded on the context and never stop the remaining arguments from being
//! parsed.
//!
//! # Examples
//!
//! ```rust
//! use hbs_args_parser::{parse_tag, CompileContext, Flags, ParsedArgument, RawTag};
//!
//! let mut ctx = CompileContext::new(Flags::handlebars());
//! let (raw, args) = parse_tag(&RawTag::new("format price digits=2"), &mut ctx);
//! assert!(!raw);
//! assert_eq!(args.get(1), Some(&ParsedArgument::path(["price"])));
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use crate::argument::{ArgumentList, ParsedArgument, SubExpression};
use crate::context::CompileContext;
use crate::error::{rcap, Diagnostic, MalformedReason};
use crate::expression_tokenizer::split_arguments;
use crate::path::{resolve, Position};
use crate::token::RawTag;

static BLOCK_PARAMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^\s+\|(.+)\|$").unwrap());

static NAMED_ARGUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)^(?:\[([^\]]+)\]|([^=^\["']+))=(.+)$"#).unwrap());

/// `foo]` or `foo[`: a bracket that does not start the name
static UNOPENED_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\[.]+[\]\[]").unwrap());

/// `[bar` or `]bar`: a bracket that does not end the name
static UNCLOSED_BRACKET: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\[\]][^\].]+$").unwrap());

/// `]bar.`: a closing bracket not followed by a dot
static MIDDLE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\][^\]\[.]+\.").unwrap());

/// `.foo[`: an opening bracket not preceded by a dot
static MIDDLE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.[^\]\[.]+\[").unwrap());

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]+\]").unwrap());

static BRACKETED_LAZY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.+?\]").unwrap());

static PARENT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\.\./)+").unwrap());

static UNPROTECTED: Lazy<Regex> = Lazy::new(|| Regex::new(r##"[!"#%&'*+,;<=>{|}~]"##).unwrap());

fn is_subexpression(src: &str) -> bool {
    src.len() > 2 && src.starts_with('(') && src.ends_with(')')
}

fn is_quoted(src: &str) -> bool {
    (src.starts_with('"') || src.starts_with("\\'")) && (src.ends_with('"') || src.ends_with("\\'"))
}

/// Checks bracket placement and unprotected special characters in a variable name
fn validate_name(name: &str, tag: &str, ctx: &mut CompileContext) {
    let normalized = BRACKETED.replace_all(name, "[XXX]");
    let normalized = PARENT_PREFIX.replace(&normalized, "");
    let reason = if UNOPENED_BRACKET.is_match(name)
        || UNCLOSED_BRACKET.is_match(name)
        || MIDDLE_CLOSE.is_match(name)
        || MIDDLE_OPEN.is_match(&normalized)
    {
        MalformedReason::Structure
    } else if UNPROTECTED.is_match(&BRACKETED_LAZY.replace_all(name, "")) {
        MalformedReason::UnprotectedCharacters
    } else {
        return;
    };
    ctx.report(Diagnostic::MalformedVariableName {
        name: name.to_string(),
        tag: tag.to_string(),
        reason,
    });
}

/// Classifies the raw arguments of one tag or subexpression
fn analyze(raw: &[&str], tag: &str, ctx: &mut CompileContext) -> ArgumentList {
    let mut list = ArgumentList::new();
    for &var in raw {
        if is_subexpression(var) {
            list.push_positional(ParsedArgument::SubExpression(parse_subexpression(var, ctx)));
            continue;
        }

        if let Some(caps) = BLOCK_PARAMS.captures(var) {
            list.set_block_params(caps[1].split_whitespace().map(str::to_string).collect());
            continue;
        }

        let mut name = None;
        let mut value = var;
        if ctx.flags.named_arguments {
            if let Some(caps) = NAMED_ARGUMENT.captures(var) {
                let key = match caps.get(1) {
                    Some(bracketed) => {
                        if !ctx.flags.advanced_variables {
                            ctx.report(Diagnostic::UnsupportedBracketArgumentName {
                                name: bracketed.as_str().to_string(),
                                tag: tag.to_string(),
                            });
                        }
                        bracketed.as_str()
                    }
                    None => caps.get(2).map_or("", |m| m.as_str()),
                };
                value = caps.get(3).map_or(var, |m| m.as_str());
                if is_subexpression(value) {
                    let sub = parse_subexpression(value, ctx);
                    list.insert_named(key, ParsedArgument::SubExpression(sub));
                    continue;
                }
                name = Some(key);
            }
        }

        if ctx.flags.advanced_variables && !is_quoted(value) {
            validate_name(value, tag, ctx);
        }

        match name {
            Some(key) => {
                let resolved = resolve(value, ctx, Position::Named);
                list.insert_named(key, resolved);
            }
            None => {
                let position = Position::Positional(list.positional().len());
                let resolved = resolve(value, ctx, position);
                list.push_positional(resolved);
            }
        }
    }
    list
}

/// Parses a `(helper arg...)` subexpression
///
/// Unless arbitrary helper expressions are allowed the helper name must be known to the
/// context's registry, otherwise a [`Diagnostic::MissingHelperDefinition`] is recorded.
/// The subexpression is returned either way.
pub fn parse_subexpression(src: &str, ctx: &mut CompileContext) -> SubExpression {
    ctx.usage.subexpressions += 1;
    if !ctx.enter() {
        let limit = ctx.max_depth();
        ctx.report(Diagnostic::SubexpressionTooDeep { limit, tag: rcap(src).to_string() });
        return SubExpression { args: ArgumentList::new(), source: src.to_string() };
    }

    let inner = src
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(src);
    let raw = split_arguments(inner, src, ctx);
    let args = analyze(&raw, src, ctx);
    ctx.leave();

    if !ctx.flags.allow_arbitrary_helper_expressions {
        if let Some(first) = args.get(0) {
            if !first.is_empty_path() {
                let known = first.helper_name().map(|name| ctx.has_helper(name)).unwrap_or(false);
                if !known {
                    let name = match first.helper_name() {
                        Some(name) => name.to_string(),
                        None => first.to_string(),
                    };
                    ctx.report(Diagnostic::MissingHelperDefinition { name });
                }
            }
        }
    }
    SubExpression { args, source: src.to_string() }
}

/// The name a partial tag refers to, with surrounding quotes or brackets removed
fn partial_name(raw: &[&str], index: usize) -> Option<String> {
    let var = *raw.get(index)?;
    if is_subexpression(var) {
        return None;
    }
    let name = if var.len() > 2 && var.starts_with('"') && var.ends_with('"') {
        &var[1..var.len() - 1]
    } else if var.len() > 2 && var.starts_with('[') && var.ends_with(']') {
        &var[1..var.len() - 1]
    } else if var.len() > 4 && var.starts_with("\\'") && var.ends_with("\\'") {
        &var[2..var.len() - 2]
    } else {
        var
    };
    Some(name.to_string())
}

/// Parses one tag
///
/// Returns whether the tag outputs unescaped (`{{{x}}}`, `{{&x}}`, the no-escape flag or an
/// active raw block) together with its arguments.
pub fn parse_tag(tag: &RawTag<'_>, ctx: &mut CompileContext) -> (bool, ArgumentList) {
    let display = tag.to_string();
    let raw = split_arguments(tag.inner, &display, ctx);
    let partial = match tag.operator {
        ">" => partial_name(&raw, 0).map(|name| (0, name)),
        "#*" => partial_name(&raw, 1).map(|name| (1, name)),
        _ => None,
    };

    let mut args = analyze(&raw, &display, ctx);
    if let Some((index, name)) = partial {
        if let Some(slot) = args.positional_mut().get_mut(index) {
            *slot = ParsedArgument::path([name]);
        }
    }

    let raw_output =
        tag.raw_begin == "{" || tag.operator == "&" || ctx.flags.no_escape || ctx.raw_block_active;
    (raw_output, args)
}
