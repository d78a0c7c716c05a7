//! End-to-end solver scenarios.
//!
//! These tests drive the whole pipeline: records into a pool, a
//! request through rule generation and SAT solving, out to an
//! ordered transaction.

use super::*;
use crate::package::{Dependency, PackageRecord};
use crate::repository::Repository;
use solv_version::{parse_constraints, Constraint, Version};

/// Helper to create a package record with a given name and version
fn pkg(name: &str, version: &str) -> PackageRecord {
    PackageRecord::new(name, Version::parse(version).unwrap())
}

/// Helper to create a record with requirements
fn pkg_with_requires(name: &str, version: &str, requires: Vec<(&str, &str)>) -> PackageRecord {
    let mut p = pkg(name, version);
    for (dep_name, constraint) in requires {
        p = p.with_require(Dependency::new(
            dep_name,
            parse_constraints(constraint).unwrap(),
        ));
    }
    p
}

fn pool_of(records: Vec<PackageRecord>) -> Pool {
    let mut pool = Pool::new();
    pool.add_repository(&Repository::from_records(records));
    pool
}

/// Check that a transaction matches expected operations, in order.
fn check_operations(transaction: &Transaction, expected: Vec<(&str, &str, &str)>) {
    let actual: Vec<(String, String, String)> = transaction
        .operations
        .iter()
        .map(|op| {
            let job = if op.is_install() { "install" } else { "remove" };
            let record = op.record();
            (
                job.to_string(),
                record.name.clone(),
                record.version.to_string(),
            )
        })
        .collect();

    let expected: Vec<(String, String, String)> = expected
        .into_iter()
        .map(|(j, n, v)| (j.to_string(), n.to_string(), v.to_string()))
        .collect();

    assert_eq!(actual, expected);
}

/// Exhaustively check whether any assignment over the mentioned
/// package ids satisfies every reported rule at once.
fn formula_satisfiable(rules: &[ProblemRule]) -> bool {
    let mut ids: Vec<PackageId> = rules
        .iter()
        .flat_map(|r| r.literals.iter().map(|l| l.abs()))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert!(ids.len() <= 16, "formula too wide to enumerate");

    for mask in 0u32..(1 << ids.len()) {
        let truth = |literal: Literal| {
            let idx = ids.iter().position(|&id| id == literal.abs()).unwrap();
            let installed = mask & (1 << idx) != 0;
            if literal > 0 {
                installed
            } else {
                !installed
            }
        };
        if rules
            .iter()
            .all(|rule| rule.literals.iter().any(|&l| truth(l)))
        {
            return true;
        }
    }
    false
}

#[test]
fn test_install_picks_version_satisfying_transitive_constraint() {
    // b requires a >= 2.0, so even though a-1.0 exists the solver
    // must pick a-2.0
    let pool = pool_of(vec![
        pkg("a", "1.0"),
        pkg("a", "2.0"),
        pkg_with_requires("b", "1.0", vec![("a", ">= 2.0")]),
    ]);
    let policy = Policy::new();
    let solver = Solver::new(&pool, &policy);

    let mut request = Request::new();
    request.install("b", Constraint::Any);

    let transaction = solver.solve(&request).unwrap();
    check_operations(
        &transaction,
        vec![("install", "a", "2.0"), ("install", "b", "1.0")],
    );
}

#[test]
fn test_install_and_remove_same_package_is_unsatisfiable() {
    let pool = pool_of(vec![pkg("a", "1.0")]);
    let policy = Policy::new();
    let solver = Solver::new(&pool, &policy);

    let mut request = Request::new();
    request.install("a", Constraint::Any);
    request.remove("a");

    let problems = solver.solve(&request).unwrap_err();
    assert_eq!(problems.len(), 1);

    let types: Vec<RuleType> = problems.problems()[0]
        .rules
        .iter()
        .map(|r| r.rule_type)
        .collect();
    assert!(types.contains(&RuleType::JobInstall));
    assert!(types.contains(&RuleType::JobRemove));
    assert!(!formula_satisfiable(&problems.problems()[0].rules));
}

#[test]
fn test_conflict_explanation_is_standalone_unsatisfiable() {
    // Both requested roots exist, but they pin "c" to different
    // versions. The explanation must carry the job assertions too,
    // otherwise setting every package to not-installed would satisfy
    // the remaining requires and conflict rules.
    let pool = pool_of(vec![
        pkg_with_requires("a", "1.0", vec![("c", "==1.0")]),
        pkg_with_requires("b", "1.0", vec![("c", "==2.0")]),
        pkg("c", "1.0"),
        pkg("c", "2.0"),
    ]);
    let policy = Policy::new();
    let solver = Solver::new(&pool, &policy);

    let mut request = Request::new();
    request.install("a", Constraint::Any);
    request.install("b", Constraint::Any);

    let problems = solver.solve(&request).unwrap_err();
    assert!(!problems.is_empty());
    for problem in problems.problems() {
        assert!(!problem.rules.is_empty());
        assert!(!formula_satisfiable(&problem.rules));
    }
}

#[test]
fn test_update_emits_remove_then_install() {
    // a-1.0 is installed, a-2.0 is available
    let pool = pool_of(vec![pkg("a", "1.0"), pkg("a", "2.0")]);
    let policy = Policy::new().with_installed([1]);
    let solver = Solver::new(&pool, &policy).with_installed([1]);

    let mut request = Request::new();
    request.update("a", parse_constraints(">= 2.0").unwrap());

    let transaction = solver.solve(&request).unwrap();
    check_operations(
        &transaction,
        vec![("remove", "a", "1.0"), ("install", "a", "2.0")],
    );

    let updates: Vec<_> = transaction.updates().collect();
    assert_eq!(updates.len(), 1);
}

#[test]
fn test_empty_request_leaves_installed_untouched() {
    let pool = pool_of(vec![
        pkg_with_requires("app", "1.0", vec![("lib", "*")]),
        pkg("lib", "1.0"),
    ]);
    let policy = Policy::new().with_installed([1, 2]);
    let solver = Solver::new(&pool, &policy).with_installed([1, 2]);

    let transaction = solver.solve(&Request::new()).unwrap();
    assert!(transaction.is_empty());
}

#[test]
fn test_at_most_one_version_per_name_installed() {
    let pool = pool_of(vec![
        pkg("dep", "1.0"),
        pkg("dep", "2.0"),
        pkg_with_requires("x", "1.0", vec![("dep", "< 2.0")]),
        pkg_with_requires("y", "1.0", vec![("dep", "*")]),
    ]);
    let policy = Policy::new();
    let solver = Solver::new(&pool, &policy);

    let mut request = Request::new();
    request.install("x", Constraint::Any);
    request.install("y", Constraint::Any);

    let transaction = solver.solve(&request).unwrap();

    let mut names: Vec<&str> = transaction.installs().map(|p| p.name.as_str()).collect();
    names.sort_unstable();
    let before = names.len();
    names.dedup();
    assert_eq!(before, names.len(), "duplicate name installed");

    // Both x and y must share dep-1.0
    let dep_versions: Vec<String> = transaction
        .installs()
        .filter(|p| p.name == "dep")
        .map(|p| p.version.to_string())
        .collect();
    assert_eq!(dep_versions, vec!["1.0"]);
}

#[test]
fn test_solution_satisfies_every_rule() {
    // Cross-check soundness: the final assignment makes every
    // generated rule true (undecided literals count as absent)
    let pool = pool_of(vec![
        pkg_with_requires("a", "1.0", vec![("shared", ">= 1.0")]),
        pkg_with_requires("b", "1.0", vec![("shared", "< 2.0")]),
        pkg("shared", "1.0"),
        pkg("shared", "2.0"),
    ]);
    let policy = Policy::new();

    let mut request = Request::new();
    request.install("a", Constraint::Any);
    request.install("b", Constraint::Any);

    let solver = Solver::new(&pool, &policy);
    let transaction = solver.solve(&request).unwrap();

    let installed: std::collections::HashSet<&str> = transaction
        .installs()
        .map(|p| p.name.as_str())
        .collect();
    assert!(installed.contains("a"));
    assert!(installed.contains("b"));

    let decided: std::collections::HashSet<PackageId> = pool
        .package_ids()
        .filter(|&id| {
            let record = pool.package(id).unwrap();
            transaction
                .installs()
                .any(|p| p.name == record.name && p.version == record.version)
        })
        .collect();

    let generator = RuleGenerator::new(&pool, &[]);
    let rules = generator.generate(&request);
    for rule in rules.iter() {
        let satisfied = rule.literals().iter().any(|&lit| {
            if lit > 0 {
                decided.contains(&(lit as PackageId))
            } else {
                !decided.contains(&(-lit as PackageId))
            }
        });
        assert!(satisfied, "violated: {rule}");
    }
}

#[test]
fn test_same_request_same_transaction() {
    let pool = pool_of(vec![
        pkg_with_requires("top", "1.0", vec![("mid", "*")]),
        pkg_with_requires("mid", "1.0", vec![("base", "*")]),
        pkg("base", "1.0"),
        pkg("base", "1.5"),
        pkg("mid", "2.0"),
    ]);
    let policy = Policy::new();

    let run = || {
        let solver = Solver::new(&pool, &policy);
        let mut request = Request::new();
        request.install("top", Constraint::Any);
        solver
            .solve(&request)
            .unwrap()
            .operations
            .iter()
            .map(|op| op.to_string())
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(first, run());
}

#[test]
fn test_remove_keeps_unrelated_packages() {
    let pool = pool_of(vec![pkg("a", "1.0"), pkg("b", "1.0")]);
    let policy = Policy::new().with_installed([1, 2]);
    let solver = Solver::new(&pool, &policy).with_installed([1, 2]);

    let mut request = Request::new();
    request.remove("a");

    let transaction = solver.solve(&request).unwrap();
    check_operations(&transaction, vec![("remove", "a", "1.0")]);
}

#[test]
fn test_provider_satisfies_requirement() {
    let provider = pkg("mkl", "2.0").with_provide(Dependency::new(
        "blas",
        parse_constraints("== 2.0").unwrap(),
    ));
    let pool = pool_of(vec![
        provider,
        pkg_with_requires("numpy", "1.0", vec![("blas", "*")]),
    ]);
    let policy = Policy::new();
    let solver = Solver::new(&pool, &policy);

    let mut request = Request::new();
    request.install("numpy", Constraint::Any);

    let transaction = solver.solve(&request).unwrap();
    let names: Vec<&str> = transaction.installs().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["mkl", "numpy"]);
}

#[test]
fn test_installed_version_preferred_over_newer() {
    // Policy keeps what is already there unless the request forces a change
    let pool = pool_of(vec![
        pkg("a", "1.0"),
        pkg("a", "2.0"),
        pkg_with_requires("b", "1.0", vec![("a", "*")]),
    ]);
    let policy = Policy::new().with_installed([1]);
    let solver = Solver::new(&pool, &policy).with_installed([1]);

    let mut request = Request::new();
    request.install("b", Constraint::Any);

    let transaction = solver.solve(&request).unwrap();
    let names: Vec<&str> = transaction.installs().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["b"]);
    assert_eq!(transaction.removals().count(), 0);
}
