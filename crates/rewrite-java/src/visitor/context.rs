// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-unit execution state and per-pass side channels.

use std::fmt;
use std::sync::Arc;

use rewrite_core::{Cursor, NodeId};
use tracing::warn;

use super::JavaVisitor;
use crate::tree::J;
use crate::types::{Classpath, TypeRegistry};

/// An edit that could not be made at one occurrence.
///
/// The visitor that recorded it left the node unchanged and went on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditFailure {
    pub source_path: Option<String>,
    pub node: NodeId,
    pub message: String,
}

impl fmt::Display for EditFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_path {
            Some(path) => write!(f, "{}: node {}: {}", path, self.node, self.message),
            None => write!(f, "node {}: {}", self.node, self.message),
        }
    }
}

/// State that lives for the run over one unit.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    classpath: Arc<Classpath>,
    source_path: Option<Arc<str>>,
    failures: Vec<EditFailure>,
}

impl ExecutionContext {
    pub fn new(classpath: Arc<Classpath>) -> Self {
        ExecutionContext {
            classpath,
            source_path: None,
            failures: Vec::new(),
        }
    }

    pub fn with_source_path(mut self, path: Option<Arc<str>>) -> Self {
        self.source_path = path;
        self
    }

    pub fn classpath(&self) -> &Arc<Classpath> {
        &self.classpath
    }

    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Record a failed edit at `node` and log it.
    pub fn record_failure(&mut self, node: NodeId, message: impl fmt::Display) {
        let failure = EditFailure {
            source_path: self.source_path.as_deref().map(str::to_string),
            node,
            message: message.to_string(),
        };
        warn!(%failure, "edit failed; node left unchanged");
        self.failures.push(failure);
    }

    pub fn failures(&self) -> &[EditFailure] {
        &self.failures
    }

    pub fn take_failures(&mut self) -> Vec<EditFailure> {
        std::mem::take(&mut self.failures)
    }
}

/// A requested import: a type, or a member of a type for static imports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportRequest {
    pub type_name: String,
    /// The member for a static import, `*` for all members.
    pub member: Option<String>,
}

impl ImportRequest {
    pub fn of_type(type_name: &str) -> Self {
        ImportRequest {
            type_name: type_name.to_string(),
            member: None,
        }
    }

    pub fn of_member(type_name: &str, member: &str) -> Self {
        ImportRequest {
            type_name: type_name.to_string(),
            member: Some(member.to_string()),
        }
    }
}

/// Side effects collected during one pass, honored after it.
#[derive(Default)]
pub struct PassEffects {
    pub add_imports: Vec<ImportRequest>,
    pub remove_imports: Vec<ImportRequest>,
    pub after_visits: Vec<Box<dyn JavaVisitor>>,
    pub delete_unit: bool,
}

impl PassEffects {
    pub fn is_empty(&self) -> bool {
        self.add_imports.is_empty()
            && self.remove_imports.is_empty()
            && self.after_visits.is_empty()
            && !self.delete_unit
    }
}

impl fmt::Debug for PassEffects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PassEffects")
            .field("add_imports", &self.add_imports)
            .field("remove_imports", &self.remove_imports)
            .field("after_visits", &self.after_visits.len())
            .field("delete_unit", &self.delete_unit)
            .finish()
    }
}

/// Everything a visit method can reach besides the node itself.
pub struct VisitCtx {
    pub cursor: Cursor<J>,
    pub exec: ExecutionContext,
    pub effects: PassEffects,
}

impl VisitCtx {
    pub fn new(exec: ExecutionContext) -> Self {
        VisitCtx {
            cursor: Cursor::new(),
            exec,
            effects: PassEffects::default(),
        }
    }

    /// A context over an empty classpath, for passes that only look at
    /// syntax.
    pub(crate) fn scratch() -> Self {
        let classpath = Classpath::new(Arc::new(TypeRegistry::empty()));
        VisitCtx::new(ExecutionContext::new(Arc::new(classpath)))
    }

    pub fn classpath(&self) -> &Arc<Classpath> {
        self.exec.classpath()
    }

    /// Add an import for `fqn` after the pass, if the unit then refers to
    /// it and does not already import it.
    pub fn maybe_add_import(&mut self, fqn: &str) {
        self.effects.add_imports.push(ImportRequest::of_type(fqn));
    }

    pub fn maybe_add_static_import(&mut self, type_name: &str, member: &str) {
        self.effects
            .add_imports
            .push(ImportRequest::of_member(type_name, member));
    }

    /// Remove the import of `fqn` after the pass, if nothing outside the
    /// imports still refers to it.
    pub fn maybe_remove_import(&mut self, fqn: &str) {
        self.effects.remove_imports.push(ImportRequest::of_type(fqn));
    }

    /// Run `visitor` as a full pass over the unit once this pass is done.
    pub fn do_after_visit(&mut self, visitor: Box<dyn JavaVisitor>) {
        self.effects.after_visits.push(visitor);
    }

    /// Delete the unit being visited.
    pub fn delete_unit(&mut self) {
        self.effects.delete_unit = true;
    }

    /// A context for visiting a free-standing subtree.
    ///
    /// The nested context starts with an empty cursor and no effects; hand it
    /// back with [`VisitCtx::absorb`] to keep what it recorded.
    pub fn detached(&self) -> VisitCtx {
        let mut exec = self.exec.clone();
        exec.failures.clear();
        VisitCtx::new(exec)
    }

    /// Merge failures and effects recorded by a detached context.
    pub fn absorb(&mut self, nested: VisitCtx) {
        let VisitCtx {
            mut exec, effects, ..
        } = nested;
        self.exec.failures.append(&mut exec.failures);
        self.effects.add_imports.extend(effects.add_imports);
        self.effects.remove_imports.extend(effects.remove_imports);
        self.effects.after_visits.extend(effects.after_visits);
        self.effects.delete_unit |= effects.delete_unit;
    }

    /// Split into the execution state and this pass's effects.
    pub fn finish(self) -> (ExecutionContext, PassEffects) {
        (self.exec, self.effects)
    }
}

impl fmt::Debug for VisitCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitCtx")
            .field("depth", &self.cursor.depth())
            .field("exec", &self.exec)
            .field("effects", &self.effects)
            .finish()
    }
}
