// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Shared helpers for the rewrite-java integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use difference::assert_diff;
use itertools::Itertools;
use rewrite_java::parser::{JavaParser, ParsedSources};
use rewrite_java::recipe::{Recipe, RecipeRunner, RunOptions, RunResult};
use tracing_subscriber::EnvFilter;

/// Install a subscriber honoring `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Make blanks and line ends visible in diffs.
pub fn visualize(s: &str) -> String {
    s.replace(' ', "▩").lines().join("↩\n")
}

pub fn assert_same_text(expected: &str, actual: &str) {
    if expected != actual {
        let got = visualize(actual);
        let expected = visualize(expected);
        assert_diff!(expected.as_ref(), got.as_ref(), "", 0);
    }
}

pub fn parse(sources: &[&str]) -> ParsedSources {
    match JavaParser::standard().parse_all(sources) {
        Ok(parsed) => parsed,
        Err(err) => panic!("sources do not parse: {}", err),
    }
}

fn sequential() -> RunOptions {
    RunOptions {
        parallel: false,
        ..RunOptions::default()
    }
}

/// Run `recipe` over `sources`, one result per source in order.
pub fn run<R: Recipe + 'static>(recipe: R, sources: &[&str]) -> Vec<RunResult> {
    init_tracing();
    let parsed = parse(sources);
    let runner = RecipeRunner::new(Arc::new(recipe), Arc::new(parsed.classpath)).with_options(sequential());
    match runner.run(&parsed.units) {
        Ok(results) => results,
        Err(err) => panic!("recipe did not run: {}", err),
    }
}

/// Assert that the recipe turns the first source into `expected`.
pub fn assert_changed<R: Recipe + 'static>(recipe: R, sources: &[&str], expected: &str) -> Vec<RunResult> {
    let results = run(recipe, sources);
    let first = &results[0];
    assert!(first.failures.is_empty(), "edit failures: {:?}", first.failures);
    assert!(first.is_changed(), "expected a change in:\n{}", sources[0]);
    assert_same_text(expected, &first.printed().unwrap_or_default());
    results
}

/// Assert that the recipe leaves the first source alone, down to the tree.
pub fn assert_unchanged<R: Recipe + 'static>(recipe: R, sources: &[&str]) {
    let results = run(recipe, sources);
    let first = &results[0];
    assert_same_text(sources[0], &first.printed().unwrap_or_default());
    assert!(!first.is_changed(), "the tree was rebuilt without a textual change");
    assert!(first.recipes_that_made_changes.is_empty());
}
