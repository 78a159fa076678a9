// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parsing source text into attributed trees.
//!
//! [`parse_compilation_unit`] produces a bare syntax tree. [`JavaParser`]
//! adds type attribution against a [`Classpath`], which is what recipes and
//! templates work on.

mod errors;
mod grammar;

pub use errors::{prettify_error, ParseError};
pub(crate) use grammar::is_reserved;

use std::sync::Arc;

use rewrite_core::{RewriteError, RewriteResult};
use tracing::debug;

use crate::attribution::{attribute, declare_types};
use crate::tree::{CompilationUnit, J};
use crate::types::Classpath;

/// Parse one compilation unit without attributing it.
pub fn parse_compilation_unit(source: &str) -> Result<CompilationUnit, ParseError> {
    grammar::java::compilation_unit(source).map_err(ParseError::from)
}

/// Parse a single expression.
pub(crate) fn parse_expression(source: &str) -> Result<J, ParseError> {
    grammar::java::expression(source).map_err(ParseError::from)
}

/// Units parsed together, and the classpath that declares their classes.
#[derive(Debug, Clone)]
pub struct ParsedSources {
    pub units: Vec<Arc<CompilationUnit>>,
    pub classpath: Classpath,
}

/// Parses and attributes source text.
///
/// ```
/// use rewrite_java::parser::JavaParser;
///
/// let parser = JavaParser::standard();
/// let unit = parser.parse("class A { String s; }").unwrap();
/// assert_eq!(unit.classes.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JavaParser {
    classpath: Classpath,
}

impl JavaParser {
    pub fn new(classpath: Classpath) -> Self {
        JavaParser { classpath }
    }

    /// A parser over the standard registry.
    pub fn standard() -> Self {
        JavaParser::default()
    }

    /// Declare the classes in `stub` for every later parse.
    pub fn depends_on(self, stub: &str) -> RewriteResult<Self> {
        Ok(JavaParser {
            classpath: self.classpath.with_stub_source(stub)?,
        })
    }

    pub fn classpath(&self) -> &Classpath {
        &self.classpath
    }

    /// Parse and attribute a single unit.
    ///
    /// Fails on syntax errors and on names that do not resolve.
    pub fn parse(&self, source: &str) -> RewriteResult<Arc<CompilationUnit>> {
        let mut parsed = self.parse_all(&[source])?;
        parsed
            .units
            .pop()
            .ok_or_else(|| RewriteError::internal("no unit parsed"))
    }

    /// Parse units that may refer to each other's classes.
    ///
    /// The returned classpath declares every class of every unit.
    pub fn parse_all(&self, sources: &[&str]) -> RewriteResult<ParsedSources> {
        let units = sources
            .iter()
            .map(|s| parse_compilation_unit(s))
            .collect::<Result<Vec<_>, _>>()?;
        let refs: Vec<&CompilationUnit> = units.iter().collect();
        let declared = declare_types(&refs, &self.classpath);
        debug!(units = units.len(), classes = declared.len(), "declared source classes");
        let classpath = self
            .classpath
            .with_classes(declared.into_iter().map(Arc::new));

        let mut attributed = Vec::with_capacity(units.len());
        for unit in &units {
            let result = attribute(unit, &classpath);
            if !result.unresolved.is_empty() {
                return Err(RewriteError::Unresolved {
                    names: result.unresolved,
                });
            }
            attributed.push(Arc::new(result.unit));
        }
        Ok(ParsedSources {
            units: attributed,
            classpath,
        })
    }
}
