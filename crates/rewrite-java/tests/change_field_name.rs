// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Renaming a field across units.

mod support;

use std::sync::Arc;

use rewrite_java::recipe::RecipeRunner;
use rewrite_java::recipes::{ChangeFieldName, ChangeFieldNameOptions};
use rewrite_java::OutputErrorCode;
use support::{assert_same_text, assert_unchanged, parse, run};

const FOO: &str = "package a;

public class Foo {
    public int count; // hits so far

    public int next() {
        count = count + 1;
        return this.count;
    }
}
";

const SUB_FOO: &str = "package a;

public class SubFoo extends Foo {
}
";

const BAR: &str = "package b;

public class Bar {
    public int count;
}
";

const CLIENT: &str = "package b;

import a.Foo;
import a.SubFoo;

class Client {
    int read(Foo foo, SubFoo sub, Bar bar) {
        return foo.count + sub.count + bar.count;
    }
}
";

fn rename_count() -> ChangeFieldName {
    ChangeFieldName::new(ChangeFieldNameOptions {
        class_name: "a.Foo".to_string(),
        old_field_name: "count".to_string(),
        new_field_name: "total".to_string(),
    })
}

#[test]
fn renames_declaration_and_references_across_units() {
    let results = run(rename_count(), &[FOO, SUB_FOO, BAR, CLIENT]);

    assert_same_text(
        "package a;

public class Foo {
    public int total; // hits so far

    public int next() {
        total = total + 1;
        return this.total;
    }
}
",
        &results[0].printed().unwrap(),
    );
    assert!(!results[1].is_changed());
    assert!(!results[2].is_changed(), "Bar.count belongs to another class");
    assert_same_text(
        "package b;

import a.Foo;
import a.SubFoo;

class Client {
    int read(Foo foo, SubFoo sub, Bar bar) {
        return foo.total + sub.total + bar.count;
    }
}
",
        &results[3].printed().unwrap(),
    );
    assert_eq!(results[0].recipes_that_made_changes, ["ChangeFieldName"]);
    assert!(results.iter().all(|r| r.failures.is_empty()));
}

#[test]
fn second_run_changes_nothing() {
    let first = run(rename_count(), &[FOO, SUB_FOO, BAR, CLIENT]);
    let foo = first[0].printed().unwrap();
    let client = first[3].printed().unwrap();
    assert_unchanged(rename_count(), &[&foo, SUB_FOO, BAR, &client]);
    assert_unchanged(rename_count(), &[&client, SUB_FOO, BAR, &foo]);
}

#[test]
fn unrelated_class_is_untouched() {
    assert_unchanged(rename_count(), &[BAR, FOO]);
}

#[test]
fn local_variables_keep_their_names() {
    let results = run(
        rename_count(),
        &[
            "package b;\n\nimport a.Foo;\n\nclass User {\n    int f(Foo foo) {\n        int count = 1;\n        return count + foo.count;\n    }\n}\n",
            FOO,
        ],
    );
    assert_same_text(
        "package b;\n\nimport a.Foo;\n\nclass User {\n    int f(Foo foo) {\n        int count = 1;\n        return count + foo.total;\n    }\n}\n",
        &results[0].printed().unwrap(),
    );
}

#[test]
fn invalid_options_stop_the_run() {
    let parsed = parse(&[FOO]);
    let recipe = ChangeFieldName::new(ChangeFieldNameOptions {
        class_name: "a.Foo".to_string(),
        old_field_name: "count".to_string(),
        new_field_name: "not valid".to_string(),
    });
    let runner = RecipeRunner::new(Arc::new(recipe), Arc::new(parsed.classpath));
    let err = runner.run(&parsed.units).unwrap_err();
    assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
    assert!(err.to_string().contains("new_field_name"), "{}", err);
}
