//! Resolve an install request against two JSON catalogs.
//!
//! Run with `RUST_LOG=debug cargo run --example resolve` to see the
//! solver's phase logging alongside the rule dump.

use solv_core::solver::{Policy, Pool, Request, RuleGenerator, Solver};
use solv_core::Repository;
use solv_version::parse_constraints;

/// Packages available for installation
const AVAILABLE: &str = r#"[
    {"name": "mkl", "version": "10.3-1", "provide": [{"name": "blas", "constraint": "*"}]},
    {"name": "numpy", "version": "1.8.1", "require": [{"name": "mkl", "constraint": ">= 10.3"}]},
    {"name": "scipy", "version": "0.14.0", "require": [{"name": "numpy", "constraint": ">= 1.8"}]}
]"#;

/// Packages already on the system
const INSTALLED: &str = r#"[
    {"name": "mkl", "version": "10.2-1"},
    {"name": "numpy", "version": "1.7.1", "require": [{"name": "mkl", "constraint": ">= 10.1"}]}
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let available = Repository::from_json_str(AVAILABLE)?;
    let installed_repo = Repository::from_json_str(INSTALLED)?;

    let mut pool = Pool::new();
    pool.add_repository(&available);
    let installed = pool.add_repository(&installed_repo);

    let mut request = Request::new();
    request.install("scipy", parse_constraints("^0.14")?);

    println!("request:");
    for job in request.jobs() {
        println!("  {}", job);
    }

    let rules = RuleGenerator::new(&pool, &installed).generate(&request);
    println!("\nrules:");
    for rule in rules.iter() {
        let literals: Vec<String> = rule
            .literals()
            .iter()
            .map(|&l| pool.id_to_string(l))
            .collect();
        println!("  {:<12} [{}]", format!("{:?}", rule.rule_type()), literals.join(" | "));
    }

    let policy = Policy::new().with_installed(installed.iter().copied());
    let solver = Solver::new(&pool, &policy).with_installed(installed.iter().copied());

    match solver.solve(&request) {
        Ok(transaction) => {
            println!("\n{}:", transaction.summary());
            for operation in &transaction.operations {
                println!("  {}", operation);
            }
        }
        Err(problems) => {
            println!("\nresolution failed:\n{}", problems.describe(&pool));
        }
    }

    Ok(())
}
