// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Recipes: named, configured transformations.
//!
//! A [`Recipe`] bundles immutable options with the visitors that act on
//! them:
//!
//! - an optional applicability test, run first; the unit is applicable
//!   only if the test returns a different tree (search visitors mark the
//!   unit to say so);
//! - the visitor that makes the edit;
//! - follow-up recipes run after it, in order, each as its own pass.
//!
//! Recipes are created once per run and shared across threads. They must
//! produce the same output for the same unit, options and classpath.
//!
//! [`RecipeRunner`] drives recipes over units.

mod runner;

pub use runner::{RecipeRunner, RunOptions, RunResult};

use std::sync::Arc;

use rewrite_core::RewriteResult;

use crate::validation::Validated;
use crate::visitor::{JavaVisitor, NoopVisitor};

pub trait Recipe: Send + Sync {
    /// Stable identifier, e.g. `ChangeFieldName`.
    fn name(&self) -> &str;

    fn display_name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// Rule identifiers the recipe satisfies, e.g. `RSPEC-1171`.
    fn tags(&self) -> &[&'static str] {
        &[]
    }

    fn validate(&self) -> Validated {
        Validated::valid()
    }

    fn applicability_test(&self) -> Option<Box<dyn JavaVisitor>> {
        None
    }

    fn visitor(&self) -> Box<dyn JavaVisitor>;

    /// Recipes to run after this one, in order.
    fn recipe_list(&self) -> &[Arc<dyn Recipe>] {
        &[]
    }
}

/// Validate `recipe` and every recipe it chains to.
pub fn validate_all(recipe: &dyn Recipe) -> RewriteResult<()> {
    recipe.validate().into_result(recipe.name())?;
    for next in recipe.recipe_list() {
        validate_all(next.as_ref())?;
    }
    Ok(())
}

/// A recipe that only runs other recipes.
#[derive(Clone)]
pub struct CompositeRecipe {
    name: String,
    display_name: String,
    description: String,
    recipes: Vec<Arc<dyn Recipe>>,
}

impl CompositeRecipe {
    pub fn new(name: &str, recipes: Vec<Arc<dyn Recipe>>) -> Self {
        CompositeRecipe {
            name: name.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            recipes,
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn recipes(&self) -> &[Arc<dyn Recipe>] {
        &self.recipes
    }
}

impl std::fmt::Debug for CompositeRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.recipes.iter().map(|r| r.name()).collect();
        f.debug_struct("CompositeRecipe")
            .field("name", &self.name)
            .field("recipes", &names)
            .finish()
    }
}

impl Recipe for CompositeRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn visitor(&self) -> Box<dyn JavaVisitor> {
        Box::new(NoopVisitor)
    }

    fn recipe_list(&self) -> &[Arc<dyn Recipe>] {
        &self.recipes
    }
}

/// Chaining for any recipe.
pub trait RecipeExt: Recipe + Sized + 'static {
    /// This recipe, then `next`.
    fn and_then<R: Recipe + 'static>(self, next: R) -> CompositeRecipe {
        let name = format!("{} and then {}", self.name(), next.name());
        CompositeRecipe::new(&name, vec![Arc::new(self), Arc::new(next)])
    }
}

impl<R: Recipe + Sized + 'static> RecipeExt for R {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str, Validated);

    impl Recipe for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn display_name(&self) -> &str {
            self.0
        }

        fn validate(&self) -> Validated {
            self.1.clone()
        }

        fn visitor(&self) -> Box<dyn JavaVisitor> {
            Box::new(NoopVisitor)
        }
    }

    #[test]
    fn and_then_keeps_order() {
        let chained = Named("First", Validated::valid()).and_then(Named("Second", Validated::valid()));
        let names: Vec<&str> = chained.recipe_list().iter().map(|r| r.name()).collect();
        assert_eq!(names, ["First", "Second"]);
        assert_eq!(chained.name(), "First and then Second");
    }

    #[test]
    fn validation_reaches_chained_recipes() {
        let chained = Named("Ok", Validated::valid())
            .and_then(Named("Broken", Validated::invalid("to", "is required")));
        let err = validate_all(&chained).unwrap_err();
        assert!(err.to_string().contains("Broken"), "{}", err);
    }
}
