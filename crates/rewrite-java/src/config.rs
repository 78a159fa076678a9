// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! JSON configuration of a run: run options plus an ordered list of
//! recipes with their options.
//!
//! ```
//! use rewrite_java::config::RecipeConfig;
//! use rewrite_java::recipe::Recipe;
//!
//! let config = RecipeConfig::from_json(r#"{
//!     "run": { "max_cycles": 2 },
//!     "recipes": [
//!         { "recipe": "ChangeFieldName",
//!           "options": { "class_name": "a.Foo", "old_field_name": "count", "new_field_name": "total" } },
//!         { "recipe": "NoDoubleBraceInitialization" }
//!     ]
//! }"#).unwrap();
//! assert_eq!(config.run.max_cycles, 2);
//! assert!(config.run.parallel);
//!
//! let recipe = config.build().unwrap();
//! assert_eq!(recipe.recipe_list().len(), 2);
//! ```

use std::sync::Arc;

use rewrite_core::RewriteError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::recipe::{validate_all, CompositeRecipe, Recipe, RunOptions};
use crate::recipes::{
    ChangeFieldName, ChangeFieldNameOptions, ChangeStaticFieldToMethod,
    ChangeStaticFieldToMethodOptions, NoDoubleBraceInitialization,
};

/// Name of the composite recipe a configuration builds.
pub const CONFIGURED_RECIPE: &str = "Configured";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("malformed recipe configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("recipe configuration lists no recipes")]
    NoRecipes,

    /// A recipe's options failed validation.
    #[error(transparent)]
    InvalidOptions(RewriteError),
}

impl From<ConfigError> for RewriteError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidOptions(err) => err,
            other => RewriteError::invalid_args(other.to_string()),
        }
    }
}

/// One configured recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "recipe", content = "options")]
pub enum RecipeSpec {
    ChangeFieldName(ChangeFieldNameOptions),
    ChangeStaticFieldToMethod(ChangeStaticFieldToMethodOptions),
    NoDoubleBraceInitialization,
}

impl RecipeSpec {
    pub fn to_recipe(&self) -> Arc<dyn Recipe> {
        match self {
            RecipeSpec::ChangeFieldName(options) => Arc::new(ChangeFieldName::new(options.clone())),
            RecipeSpec::ChangeStaticFieldToMethod(options) => {
                Arc::new(ChangeStaticFieldToMethod::new(options.clone()))
            }
            RecipeSpec::NoDoubleBraceInitialization => Arc::new(NoDoubleBraceInitialization),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeConfig {
    #[serde(default)]
    pub run: RunOptions,
    pub recipes: Vec<RecipeSpec>,
}

impl RecipeConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The configured recipes, in order, as one validated recipe.
    pub fn build(&self) -> Result<CompositeRecipe, ConfigError> {
        if self.recipes.is_empty() {
            return Err(ConfigError::NoRecipes);
        }
        let recipes: Vec<Arc<dyn Recipe>> = self.recipes.iter().map(RecipeSpec::to_recipe).collect();
        let composite = CompositeRecipe::new(CONFIGURED_RECIPE, recipes)
            .with_display_name("Configured recipes")
            .with_description("Recipes listed in a configuration file, run in order.");
        validate_all(&composite).map_err(ConfigError::InvalidOptions)?;
        debug!(recipes = self.recipes.len(), "built configured recipe");
        Ok(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewrite_core::OutputErrorCode;

    #[test]
    fn run_options_default_when_absent() {
        let config = RecipeConfig::from_json(r#"{"recipes":[{"recipe":"NoDoubleBraceInitialization"}]}"#).unwrap();
        assert_eq!(config.run, RunOptions::default());
        assert_eq!(config.recipes, [RecipeSpec::NoDoubleBraceInitialization]);
    }

    #[test]
    fn unknown_recipe_is_rejected() {
        let err = RecipeConfig::from_json(r#"{"recipes":[{"recipe":"DeleteEverything"}]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert_eq!(RewriteError::from(err).error_code(), OutputErrorCode::InvalidArguments);
    }

    #[test]
    fn empty_list_is_rejected() {
        let config = RecipeConfig::from_json(r#"{"recipes":[]}"#).unwrap();
        assert!(matches!(config.build(), Err(ConfigError::NoRecipes)));
    }

    #[test]
    fn invalid_options_keep_their_details() {
        let config = RecipeConfig {
            run: RunOptions::default(),
            recipes: vec![RecipeSpec::ChangeFieldName(ChangeFieldNameOptions {
                class_name: "a.Foo".to_string(),
                old_field_name: "count".to_string(),
                new_field_name: "2total".to_string(),
            })],
        };
        let err = RewriteError::from(config.build().unwrap_err());
        match err {
            RewriteError::InvalidArguments { message, details } => {
                assert!(message.contains("ChangeFieldName"), "{}", message);
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn json_round_trip() {
        let config = RecipeConfig {
            run: RunOptions {
                parallel: false,
                max_cycles: 1,
            },
            recipes: vec![
                RecipeSpec::ChangeStaticFieldToMethod(ChangeStaticFieldToMethodOptions {
                    old_class_name: "a.Holder".to_string(),
                    old_field_name: "OLD".to_string(),
                    new_class_name: Some("b.NewHolder".to_string()),
                    new_method_name: "make".to_string(),
                }),
                RecipeSpec::NoDoubleBraceInitialization,
            ],
        };
        let json = config.to_json().unwrap();
        assert_eq!(RecipeConfig::from_json(&json).unwrap(), config);
    }
}
