// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Runs driven by a JSON recipe configuration.

mod support;

use std::sync::Arc;

use rewrite_java::config::{ConfigError, RecipeConfig, RecipeSpec, CONFIGURED_RECIPE};
use rewrite_java::recipe::{Recipe, RecipeRunner};
use rewrite_java::{OutputErrorCode, RewriteError};
use support::{assert_same_text, init_tracing, parse};

const CONFIG: &str = r#"{
    "run": { "parallel": true, "max_cycles": 3 },
    "recipes": [
        {
            "recipe": "ChangeStaticFieldToMethod",
            "options": {
                "old_class_name": "java.util.Collections",
                "old_field_name": "EMPTY_LIST",
                "new_method_name": "emptyList"
            }
        },
        { "recipe": "NoDoubleBraceInitialization" }
    ]
}"#;

const SOURCE: &str = "import java.util.ArrayList;
import java.util.Collections;
import java.util.List;

class Lists {
    List<String> none = Collections.EMPTY_LIST;

    List<String> some() {
        List<String> l = new ArrayList<String>() {{
            add(\"x\");
        }};
        return l;
    }
}
";

#[test]
fn configured_recipes_run_in_order() {
    init_tracing();
    let config = RecipeConfig::from_json(CONFIG).unwrap();
    let recipe = config.build().unwrap();
    assert_eq!(recipe.name(), CONFIGURED_RECIPE);

    let parsed = parse(&[SOURCE, "class Untouched { int n; }"]);
    let runner = RecipeRunner::new(Arc::new(recipe), Arc::new(parsed.classpath)).with_options(config.run);
    let results = runner.run(&parsed.units).unwrap();

    assert_same_text(
        "import java.util.ArrayList;
import java.util.Collections;
import java.util.List;

class Lists {
    List<String> none = Collections.emptyList();

    List<String> some() {
        List<String> l = new ArrayList<String>();
        l.add(\"x\");
        return l;
    }
}
",
        &results[0].printed().unwrap(),
    );
    assert_eq!(
        results[0].recipes_that_made_changes,
        ["ChangeStaticFieldToMethod", "NoDoubleBraceInitialization"]
    );
    assert!(results[0].failures.is_empty(), "{:?}", results[0].failures);
    assert!(!results[1].is_changed());
}

#[test]
fn written_config_reads_back() {
    let config = RecipeConfig::from_json(CONFIG).unwrap();
    let again = RecipeConfig::from_json(&config.to_json().unwrap()).unwrap();
    assert_eq!(config, again);
    assert!(matches!(again.recipes[1], RecipeSpec::NoDoubleBraceInitialization));
}

#[test]
fn configuration_errors_map_to_invalid_arguments() {
    let malformed: RewriteError = RecipeConfig::from_json("{ \"recipes\": [").unwrap_err().into();
    assert_eq!(malformed.error_code(), OutputErrorCode::InvalidArguments);

    let err = RecipeConfig::from_json(r#"{
        "recipes": [{
            "recipe": "ChangeStaticFieldToMethod",
            "options": {
                "old_class_name": "java.util.Collections",
                "old_field_name": "EMPTY LIST",
                "new_method_name": "emptyList"
            }
        }]
    }"#)
    .unwrap()
    .build()
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidOptions(_)));
    let err: RewriteError = err.into();
    assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
    assert!(err.to_string().contains("old_field_name"), "{}", err);
}
