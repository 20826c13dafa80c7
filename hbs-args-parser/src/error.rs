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

//! Diagnostics raised while parsing tag arguments
//!
//! Nothing in this crate aborts on bad template input. Every problem is turned into a
//! [`Diagnostic`], appended to the [`CompileContext`](crate::context::CompileContext) and
//! parsing carries on with a best-effort result. Whether a non-empty diagnostic list is
//! fatal is up to the calling compiler.

use std::fmt::Display;

use thiserror::Error;

/// A problem found in a template while parsing one tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// Delimiters may not contain `=`, it is reserved for the `{{=<% %>=}}` switch syntax
    #[error("can not set delimiter containing '=', tried to set delimiter as '{left}' and '{right}'")]
    ConfigurationError { left: String, right: String },

    #[error("wrong variable naming as '{name}' in {tag}{reason}")]
    MalformedVariableName {
        name: String,
        tag: String,
        reason: MalformedReason,
    },

    /// A `)` without a matching `(`, or a `(` that never closes
    #[error("unexpected ')' in expression '{tag}'")]
    UnbalancedSubexpression { tag: String },

    #[error("can not find custom helper function definition {name}()")]
    MissingHelperDefinition { name: String },

    #[error("parent access is not enabled, can not resolve '{path}'")]
    UnsupportedParentAccess { path: String },

    #[error("wrong argument name as '[{name}]' in {tag}, bracketed argument names need advanced variables")]
    UnsupportedBracketArgumentName { name: String, tag: String },

    #[error("subexpressions nested deeper than {limit} levels near \"{tag}\"")]
    SubexpressionTooDeep { limit: usize, tag: String },
}

/// Why a variable name was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Brackets and dots are not arranged as `a.[b].c`
    Structure,
    /// Special characters appear outside of `[ ]`
    UnprotectedCharacters,
}

impl Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::Structure => Ok(()),
            MalformedReason::UnprotectedCharacters => {
                f.write_str(", you should wrap ! \" # % & ' * + , ; < = > { | } ~ into [ ]")
            }
        }
    }
}

/// Returns the last 32 characters of a string for error context
pub(crate) fn rcap(src: &str) -> &str {
    static CAP_AT: usize = 32;

    if src.len() > CAP_AT {
        let mut start = src.len() - CAP_AT;
        while !src.is_char_boundary(start) {
            start += 1;
        }
        &src[start..]
    } else {
        src
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rcap_keeps_short_text() {
        assert_eq!(rcap("{{foo}}"), "{{foo}}");
    }

    #[test]
    fn rcap_cuts_on_char_boundary() {
        let src = format!("é{}", "a".repeat(31));
        assert_eq!(rcap(&src), "a".repeat(31));
    }

    #[test]
    fn malformed_hint_only_for_unprotected_characters() {
        let structure = Diagnostic::MalformedVariableName {
            name: "a]b".to_string(),
            tag: "{{a]b}}".to_string(),
            reason: MalformedReason::Structure,
        };
        assert_eq!(structure.to_string(), "wrong variable naming as 'a]b' in {{a]b}}");

        let unprotected = Diagnostic::MalformedVariableName {
            name: "a!b".to_string(),
            tag: "{{a!b}}".to_string(),
            reason: MalformedReason::UnprotectedCharacters,
        };
        assert!(unprotected.to_string().ends_with("into [ ]"));
    }
}
