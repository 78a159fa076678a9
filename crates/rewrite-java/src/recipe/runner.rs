// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Running recipes over compilation units.
//!
//! Each unit is run on its own: passes over one unit are strictly
//! sequential, and nothing is shared between units but the recipe and the
//! classpath, so units run concurrently when [`RunOptions::parallel`] is
//! set.
//!
//! A pass runs one recipe over the unit:
//!
//! 1. the applicability test, if any; an unchanged result ends the pass;
//! 2. the recipe's visitor;
//! 3. the import additions and removals the visit requested, merged once;
//! 4. the follow-up visitors the visit scheduled, one full pass each.
//!
//! A cycle runs the recipe and then each recipe it chains to. Cycles repeat
//! until one changes nothing, up to [`RunOptions::max_cycles`].

use std::collections::VecDeque;
use std::sync::Arc;

use rayon::prelude::*;
use rewrite_core::RewriteResult;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span};

use super::{validate_all, Recipe};
use crate::imports::finalize_imports;
use crate::tree::{CompilationUnit, J};
use crate::types::Classpath;
use crate::visitor::{visit_unit, EditFailure, ExecutionContext, JavaVisitor, VisitCtx};

/// How a run proceeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunOptions {
    /// Run units concurrently.
    pub parallel: bool,
    /// Upper bound on cycles per unit.
    pub max_cycles: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            parallel: true,
            max_cycles: 3,
        }
    }
}

/// The outcome for one unit.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub before: Arc<CompilationUnit>,
    /// `None` if the unit was deleted.
    pub after: Option<Arc<CompilationUnit>>,
    /// Names of the recipes whose passes changed the unit, in first-change
    /// order.
    pub recipes_that_made_changes: Vec<String>,
    pub failures: Vec<EditFailure>,
}

impl RunResult {
    pub fn is_changed(&self) -> bool {
        match &self.after {
            Some(after) => !Arc::ptr_eq(after, &self.before),
            None => true,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.after.is_none()
    }

    /// Source text after the run; `None` for a deleted unit.
    pub fn printed(&self) -> Option<String> {
        self.after.as_ref().map(|u| J::from(u.clone()).print())
    }
}

/// Runs a recipe over compilation units.
///
/// ```
/// use std::sync::Arc;
/// use rewrite_java::parser::JavaParser;
/// use rewrite_java::recipe::{RecipeRunner, RunOptions};
/// use rewrite_java::recipes::{ChangeFieldName, ChangeFieldNameOptions};
///
/// let parsed = JavaParser::standard()
///     .parse_all(&["class A { int count; int f() { return count; } }"])
///     .unwrap();
/// let recipe = ChangeFieldName::new(ChangeFieldNameOptions {
///     class_name: "A".to_string(),
///     old_field_name: "count".to_string(),
///     new_field_name: "total".to_string(),
/// });
/// let runner = RecipeRunner::new(Arc::new(recipe), Arc::new(parsed.classpath))
///     .with_options(RunOptions { parallel: false, max_cycles: 2 });
/// let results = runner.run(&parsed.units).unwrap();
/// assert_eq!(
///     results[0].printed().unwrap(),
///     "class A { int total; int f() { return total; } }"
/// );
/// ```
pub struct RecipeRunner {
    recipe: Arc<dyn Recipe>,
    classpath: Arc<Classpath>,
    options: RunOptions,
}

impl RecipeRunner {
    pub fn new(recipe: Arc<dyn Recipe>, classpath: Arc<Classpath>) -> Self {
        RecipeRunner {
            recipe,
            classpath,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Run over every unit, in input order.
    ///
    /// Fails before touching any unit if a recipe's options are invalid.
    pub fn run(&self, units: &[Arc<CompilationUnit>]) -> RewriteResult<Vec<RunResult>> {
        validate_all(self.recipe.as_ref())?;
        debug!(
            recipe = self.recipe.name(),
            units = units.len(),
            parallel = self.options.parallel,
            "running recipe"
        );
        let results = if self.options.parallel {
            units.par_iter().map(|u| self.run_unit(u)).collect()
        } else {
            units.iter().map(|u| self.run_unit(u)).collect()
        };
        Ok(results)
    }

    /// Run over one unit. Options are not validated.
    pub fn run_unit(&self, unit: &Arc<CompilationUnit>) -> RunResult {
        let span = info_span!(
            "run_unit",
            path = unit.source_path.as_deref().unwrap_or("<unnamed>")
        );
        let _enter = span.enter();

        let mut run = UnitRun {
            exec: ExecutionContext::new(self.classpath.clone())
                .with_source_path(unit.source_path.clone()),
            changed_by: Vec::new(),
        };
        let mut current = Some(unit.clone());
        for cycle in 1..=self.options.max_cycles {
            let Some(start) = current.clone() else {
                break;
            };
            current = run.recipe(self.recipe.as_ref(), start.clone());
            let changed = match &current {
                Some(after) => !Arc::ptr_eq(after, &start),
                None => true,
            };
            debug!(cycle, changed, "cycle complete");
            if !changed {
                break;
            }
        }

        RunResult {
            before: unit.clone(),
            after: current,
            recipes_that_made_changes: run.changed_by,
            failures: run.exec.take_failures(),
        }
    }
}

/// State of the run over one unit.
struct UnitRun {
    exec: ExecutionContext,
    changed_by: Vec<String>,
}

impl UnitRun {
    /// A pass of `recipe`, then its chained recipes. `None` if the unit was
    /// deleted.
    fn recipe(&mut self, recipe: &dyn Recipe, unit: Arc<CompilationUnit>) -> Option<Arc<CompilationUnit>> {
        let after = self.pass(recipe, &unit);
        match &after {
            Some(out) if Arc::ptr_eq(out, &unit) => {}
            _ => self.made_changes(recipe.name()),
        }
        let mut current = after?;
        for next in recipe.recipe_list() {
            current = self.recipe(next.as_ref(), current)?;
        }
        Some(current)
    }

    fn pass(&mut self, recipe: &dyn Recipe, unit: &Arc<CompilationUnit>) -> Option<Arc<CompilationUnit>> {
        if let Some(mut test) = recipe.applicability_test() {
            let mut cx = VisitCtx::new(self.exec.clone());
            let tested = visit_unit(test.as_mut(), unit, &mut cx);
            if Arc::ptr_eq(&tested, unit) {
                debug!(recipe = recipe.name(), "not applicable");
                return Some(unit.clone());
            }
        }

        let mut queue: VecDeque<Box<dyn JavaVisitor>> = VecDeque::new();
        queue.push_back(recipe.visitor());
        let mut current = unit.clone();
        while let Some(mut visitor) = queue.pop_front() {
            let mut cx = VisitCtx::new(self.exec.clone());
            let out = visit_unit(visitor.as_mut(), &current, &mut cx);
            let (exec, effects) = cx.finish();
            self.exec = exec;
            if effects.delete_unit {
                debug!(recipe = recipe.name(), "unit deleted");
                return None;
            }
            current = finalize_imports(&out, &effects.add_imports, &effects.remove_imports);
            queue.extend(effects.after_visits);
        }
        debug!(
            recipe = recipe.name(),
            changed = !Arc::ptr_eq(&current, unit),
            "pass complete"
        );
        Some(current)
    }

    fn made_changes(&mut self, name: &str) {
        if !self.changed_by.iter().any(|n| n == name) {
            self.changed_by.push(name.to_string());
        }
    }
}
