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

//! Per-compile state shared by every tag
//!
//! A [`CompileContext`] is created once per template compile and handed by `&mut` to every
//! parsing call. It carries the dialect [`Flags`], the current delimiters, the diagnostics
//! found so far and counters of which syntax features the template used.
//!
//! ```rust
//! use hbs_args_parser::{CompileContext, Flags};
//!
//! let ctx = CompileContext::new(Flags::handlebars())
//!     .with_helpers(["lookup", "format"].into_iter().collect::<std::collections::HashSet<_>>());
//! assert!(!ctx.has_errors());
//! ```

use std::{borrow::Borrow, collections::HashSet, hash::Hash};

use tracing::debug;

use crate::error::Diagnostic;
use crate::token::{configure_delimiters, Tokens};

/// Default limit on nested subexpressions
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Dialect switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// `[...]` segment names, quoted strings with spaces and the other merging rules
    pub advanced_variables: bool,
    /// Treat `this` as the current context instead of a key named "this"
    pub implicit_this: bool,
    /// Non-leading arguments render as string literals instead of being resolved
    pub string_params: bool,
    /// `name=value` arguments
    pub named_arguments: bool,
    /// Skip the helper registry check for subexpressions
    pub allow_arbitrary_helper_expressions: bool,
    /// Every tag outputs without escaping
    pub no_escape: bool,
    /// `../` paths
    pub parent_access: bool,
    /// `{{{{raw}}}}` blocks
    pub raw_blocks: bool,
}

impl Flags {
    /// The full handlebars dialect
    pub fn handlebars() -> Self {
        Self {
            advanced_variables: true,
            implicit_this: true,
            named_arguments: true,
            parent_access: true,
            raw_blocks: true,
            ..Self::default()
        }
    }

    /// Plain mustache: paths only
    pub fn mustache() -> Self {
        Self {
            implicit_this: true,
            parent_access: true,
            ..Self::default()
        }
    }
}

/// How often a template used features that need runtime support
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureUsage {
    /// One per `../` hop
    pub parent: usize,
    pub subexpressions: usize,
}

/// Looks up helper names for subexpression validation
pub trait HelperRegistry: Send + Sync {
    fn has_helper(&self, name: &str) -> bool;
}

impl<S> HelperRegistry for HashSet<S>
where
    S: Borrow<str> + Hash + Eq + Send + Sync,
{
    fn has_helper(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<F> HelperRegistry for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn has_helper(&self, name: &str) -> bool {
        self(name)
    }
}

/// Mutable state threaded through one compile
pub struct CompileContext {
    pub flags: Flags,
    /// True while the surrounding tokenizer is inside a `{{{{raw}}}}` block
    pub raw_block_active: bool,
    pub(crate) tokens: Option<Tokens>,
    diagnostics: Vec<Diagnostic>,
    pub(crate) usage: FeatureUsage,
    helpers: Box<dyn HelperRegistry>,
    depth: usize,
    max_depth: usize,
}

impl CompileContext {
    /// Creates a context with `{{` `}}` delimiters and no known helpers
    pub fn new(flags: Flags) -> Self {
        let mut ctx = Self {
            flags,
            raw_block_active: false,
            tokens: None,
            diagnostics: Vec::new(),
            usage: FeatureUsage::default(),
            helpers: Box::new(HashSet::<String>::new()),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        };
        configure_delimiters(&mut ctx, "{{", "}}");
        ctx
    }

    pub fn with_helpers(mut self, helpers: impl HelperRegistry + 'static) -> Self {
        self.helpers = Box::new(helpers);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The current delimiter configuration
    pub fn tokens(&self) -> Option<&Tokens> {
        self.tokens.as_ref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn usage(&self) -> FeatureUsage {
        self.usage
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn has_helper(&self, name: &str) -> bool {
        self.helpers.has_helper(name)
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        debug!(%diagnostic, "template diagnostic");
        self.diagnostics.push(diagnostic);
    }

    /// Steps into a subexpression, false when that would exceed the depth limit
    pub(crate) fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Number of subexpressions currently entered
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }
}
