// git-mux: Multi-Repository Branch Multiplexer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::args::{self, FlowCommand};
use super::{ComponentOutcome, FlowDispatcher, FlowReport, MemoryConsole, Verb, help};
use crate::component::{Component, ComponentCache};
use crate::error::{FlowError, MuxError, MuxResult};
use crate::git::test_utils::FakeGit;
use crate::git::{BranchType, ToolOutput};
use crate::registry::{self, BranchRegistry};

struct Fixture {
    _temp: TempDir,
    git: Arc<FakeGit>,
    cache: ComponentCache,
    components: Vec<Component>,
    registry: BranchRegistry,
    cancel: CancellationToken,
}

impl Fixture {
    /// Components are `(name, url)`; every url gets a fresh remote.
    fn new(git: FakeGit, components: &[(&str, &str)]) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let git = Arc::new(
            components
                .iter()
                .fold(git, |git, (_, url)| git.with_remote(url, &[])),
        );
        let cache = ComponentCache::new(temp.path(), "origin", git.clone()).quiet();
        let mut components: Vec<_> = components
            .iter()
            .map(|(name, url)| Component::new(*name, *url))
            .collect();
        components.sort();
        let registry = registry::build(&components, &cache).unwrap();
        git.clear_calls();
        Self {
            _temp: temp,
            git,
            cache,
            components,
            registry,
            cancel: CancellationToken::new(),
        }
    }

    /// `web` (u1) and `api` (u2) with no branches yet.
    fn web_and_api() -> Self {
        Self::new(FakeGit::new(), &[("web", "u1"), ("api", "u2")])
    }

    fn path(&self, component: &str) -> std::path::PathBuf {
        self.cache.path_for(&Component::new(component, ""))
    }

    fn flow(&mut self, args: &[&str]) -> MuxResult<(FlowReport, Vec<String>)> {
        let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
        let FlowCommand::Run(request) = args::parse(&args, &BranchType::ALL)? else {
            panic!("expected a runnable request for {args:?}");
        };
        let mut console = MemoryConsole::new();
        let report = FlowDispatcher::new(&self.components, &self.cache, &mut self.registry)
            .with_cancel_token(self.cancel.clone())
            .run(&request, &mut console)?;
        Ok((report, console.lines().to_vec()))
    }

    fn assert_all_on_scratch(&self) {
        for component in &self.components {
            let path = self.cache.path_for(component);
            assert_eq!(
                self.git.checked_out(&path).as_deref(),
                Some("scratch"),
                "{} left off scratch",
                component.name()
            );
        }
    }

    fn carriers(&self, branch: &str) -> Vec<String> {
        self.registry.components_for(branch).into_iter().collect()
    }
}

fn flow_error(err: MuxError) -> FlowError {
    match err {
        MuxError::Flow(inner) => *inner,
        other => panic!("expected a flow error, got {other:?}"),
    }
}

fn parse(args: &[&str]) -> Result<FlowCommand, FlowError> {
    let args: Vec<String> = args.iter().map(|a| (*a).to_string()).collect();
    args::parse(&args, &BranchType::ALL)
}

// --- Parsing ---

#[test]
fn test_parse_help_and_version() {
    assert_eq!(parse(&[]).unwrap(), FlowCommand::Help(Vec::new()));
    assert_eq!(
        parse(&["feature", "help"]).unwrap(),
        FlowCommand::Help(vec!["feature".to_string(), "help".to_string()])
    );
    assert_eq!(parse(&["version"]).unwrap(), FlowCommand::Version);
}

#[test]
fn test_parse_rejects_init_and_unknown_words() {
    assert!(matches!(parse(&["init"]), Err(FlowError::InitNotSupported)));
    assert!(matches!(
        parse(&["bugfix", "start", "x"]),
        Err(FlowError::InvalidBranchType(t)) if t == "bugfix"
    ));
    assert!(matches!(
        parse(&["feature", "publish", "x"]),
        Err(FlowError::InvalidCommand(v)) if v == "publish"
    ));
    assert!(matches!(
        parse(&["feature", "finish"]),
        Err(FlowError::MissingBranchName { .. })
    ));
}

#[test]
fn test_parse_unmuxed_type_rejected() {
    let args = vec!["hotfix".to_string(), "list".to_string()];
    let result = args::parse(&args, &[BranchType::Feature]);
    assert!(matches!(result, Err(FlowError::InvalidBranchType(t)) if t == "hotfix"));
}

#[test]
fn test_parse_bare_type_lists() {
    let FlowCommand::Run(request) = parse(&["release"]).unwrap() else {
        panic!("expected run");
    };
    assert_eq!(request.verb(), Verb::List);
    assert_eq!(request.tool_args(), ["release", "list"]);
    assert!(request.target().is_none());
}

#[test]
fn test_parse_start_name_validation() {
    for bad in ["Has_Upper", "bad_underscore"] {
        assert!(
            matches!(parse(&["feature", "start", bad]), Err(FlowError::InvalidBranchName(n)) if n == bad)
        );
    }
    let FlowCommand::Run(request) = parse(&["feature", "start", "cool-feature"]).unwrap() else {
        panic!("expected run");
    };
    assert_eq!(request.target().map(ToString::to_string).as_deref(), Some("feature/cool-feature"));
}

#[test]
fn test_parse_pull_keeps_remote_before_name() {
    let FlowCommand::Run(request) = parse(&["feature", "pull", "upstream", "shared"]).unwrap() else {
        panic!("expected run");
    };
    assert_eq!(request.remote(), Some("upstream"));
    assert_eq!(request.tool_args(), ["feature", "pull", "upstream", "shared"]);
    assert_eq!(request.target().map(|b| b.name().to_string()).as_deref(), Some("shared"));
}

#[test]
fn test_parse_pull_malformed() {
    let err = parse(&["release", "pull", "-r", "origin", "2.0"]).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r#"Expected "git mux flow <branch_type> pull <remote> <name>"."#);
    assert!(parse(&["release", "pull", "2.0"]).is_err());
}

#[test]
fn test_parse_push_rejects_extra_flags() {
    let err = parse(&["feature", "push", "-f", "x"]).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r#"Expected "git mux flow <branch_type> push <name>"."#);
}

#[test]
fn test_help_rewrites_command_name() {
    let output = ToolOutput {
        exit_code: 1,
        stdout: "usage: git flow feature [list] [-v]\n".to_string(),
        stderr: "       git flow feature start <name>\n".to_string(),
    };
    insta::assert_snapshot!(help::rewrite(&output), @r"
    usage: git mux flow feature [list] [-v]
           git mux flow feature start <name>
    ");
    assert_eq!(help::help_args(&[]), vec!["help".to_string()]);
}

// --- Dispatch ---

#[test]
fn test_start_on_every_component() {
    let mut fx = Fixture::web_and_api();
    let (report, lines) = fx.flow(&["feature", "start", "checkout-icon"]).unwrap();

    insta::assert_debug_snapshot!(lines, @r#"
    [
        "[api]",
        "Branch feature/checkout-icon started.",
        "[web]",
        "Branch feature/checkout-icon started.",
    ]
    "#);
    assert!(!report.has_failures());
    assert_eq!(fx.carriers("feature/checkout-icon"), vec!["api", "web"]);
    assert!(fx.registry.is_consistent());
    assert!(fx.git.remote_branches("u1").contains("feature/checkout-icon"));
    assert!(fx.git.remote_branches("u2").contains("feature/checkout-icon"));
    fx.assert_all_on_scratch();
}

#[test]
fn test_start_component_call_sequence() {
    let mut fx = Fixture::new(FakeGit::new(), &[("api", "u2")]);
    fx.flow(&["feature", "start", "checkout-icon"]).unwrap();
    insta::assert_debug_snapshot!(fx.git.calls(), @r#"
    [
        "api: git flow feature start checkout-icon",
        "api: git push -u origin feature/checkout-icon",
        "api: git checkout scratch",
    ]
    "#);
}

#[test]
fn test_start_twice_is_idempotent() {
    let mut fx = Fixture::web_and_api();
    fx.flow(&["feature", "start", "x"]).unwrap();

    for _ in 0..2 {
        let (report, _) = fx.flow(&["feature", "start", "x"]).unwrap();
        for component in ["api", "web"] {
            assert_eq!(
                report.outcome_for(component),
                Some(&ComponentOutcome::AlreadyDone("Branch feature/x already started.".to_string()))
            );
        }
        assert_eq!(fx.carriers("feature/x"), vec!["api", "web"]);
    }
    fx.assert_all_on_scratch();
}

#[test]
fn test_start_idempotent_path_repairs_upstream() {
    let mut fx = Fixture::new(FakeGit::new(), &[("api", "u2")]);
    fx.flow(&["feature", "start", "x"]).unwrap();
    fx.git.clear_calls();

    fx.flow(&["feature", "start", "x"]).unwrap();
    insta::assert_debug_snapshot!(fx.git.calls(), @r#"
    [
        "api: git checkout feature/x",
        "api: git push -u origin feature/x",
        "api: git checkout scratch",
    ]
    "#);
}

#[test]
fn test_invalid_name_touches_nothing() {
    let mut fx = Fixture::web_and_api();
    for bad in ["Has_Upper", "bad_underscore"] {
        let err = flow_error(fx.flow(&["feature", "start", bad]).unwrap_err());
        assert!(matches!(err, FlowError::InvalidBranchName(_)));
    }
    assert!(fx.git.calls().is_empty());
    fx.flow(&["feature", "start", "cool-feature"]).unwrap();
    assert_eq!(fx.carriers("feature/cool-feature"), vec!["api", "web"]);
}

#[test]
fn test_finish_on_every_component() {
    let mut fx = Fixture::web_and_api();
    fx.flow(&["feature", "start", "checkout-icon"]).unwrap();

    let (report, lines) = fx.flow(&["feature", "finish", "checkout-icon"]).unwrap();
    insta::assert_debug_snapshot!(lines, @r#"
    [
        "[api]",
        "Branch feature/checkout-icon finished.",
        "[web]",
        "Branch feature/checkout-icon finished.",
    ]
    "#);
    assert!(!report.has_failures());
    assert!(!fx.registry.contains_branch("feature/checkout-icon"));
    assert!(!fx.registry.branches_for("api").contains("feature/checkout-icon"));
    assert!(!fx.git.remote_branches("u1").contains("feature/checkout-icon"));
    fx.assert_all_on_scratch();
}

#[test]
fn test_finish_unknown_branch_is_fatal() {
    let mut fx = Fixture::web_and_api();
    let err = flow_error(fx.flow(&["feature", "finish", "nowhere"]).unwrap_err());
    insta::assert_snapshot!(err.to_string(), @r#"Branch "feature/nowhere" is not recognized."#);
    assert!(fx.git.calls().is_empty());
}

#[test]
fn test_finish_failure_does_not_stop_fan_out() {
    let git = FakeGit::new().fail_flow("api", "finish", "CONFLICT (content): Merge conflict in README");
    let mut fx = Fixture::new(git, &[("api", "u1"), ("core", "u2"), ("web", "u3")]);
    fx.flow(&["feature", "start", "x"]).unwrap();

    let (report, lines) = fx.flow(&["feature", "finish", "x"]).unwrap();
    insta::assert_debug_snapshot!(lines, @r#"
    [
        "[api]",
        "error: CONFLICT (content): Merge conflict in README",
        "[core]",
        "Branch feature/x finished.",
        "[web]",
        "Branch feature/x finished.",
    ]
    "#);
    assert_eq!(report.failures(), vec!["api"]);
    assert_eq!(fx.carriers("feature/x"), vec!["api"]);
    fx.assert_all_on_scratch();
}

#[test]
fn test_silent_failure_gets_default_message() {
    let git = FakeGit::new().fail_flow("api", "rebase", "");
    let mut fx = Fixture::new(git, &[("api", "u1")]);
    fx.flow(&["feature", "start", "x"]).unwrap();

    let (report, _) = fx.flow(&["feature", "rebase", "x"]).unwrap();
    assert_eq!(
        report.outcome_for("api"),
        Some(&ComponentOutcome::Failed("flow command failed".to_string()))
    );
}

#[test]
fn test_handler_error_fails_only_that_component() {
    let mut fx = Fixture::new(FakeGit::new(), &[("api", "u1"), ("core", "u2"), ("web", "u3")]);
    fx.flow(&["feature", "start", "x"]).unwrap();
    fx.git.fail_checkout(
        "core",
        "feature/x",
        "error: Your local changes would be overwritten by checkout",
    );

    let (report, lines) = fx.flow(&["feature", "push", "x"]).unwrap();
    insta::assert_debug_snapshot!(lines, @r#"
    [
        "[api]",
        "Branch feature/x pushed.",
        "[core]",
        "error: git error: git command failed: checkout - error: Your local changes would be overwritten by checkout",
        "[web]",
        "Branch feature/x pushed.",
    ]
    "#);
    assert_eq!(report.failures(), vec!["core"]);
    assert!(matches!(report.outcome_for("api"), Some(ComponentOutcome::Succeeded(_))));
    assert!(matches!(report.outcome_for("web"), Some(ComponentOutcome::Succeeded(_))));
    assert!(!fx.git.remote_branches("u2").contains("feature/x"));
    fx.assert_all_on_scratch();
}

#[test]
fn test_scratch_restore_failure_fails_component() {
    let mut fx = Fixture::web_and_api();
    fx.flow(&["feature", "start", "x"]).unwrap();
    fx.git
        .fail_checkout("api", "scratch", "error: you need to resolve your current index first");

    let (report, lines) = fx.flow(&["feature", "push", "x"]).unwrap();
    insta::assert_debug_snapshot!(lines, @r#"
    [
        "[api]",
        "error: could not return to scratch: git error: git command failed: checkout - error: you need to resolve your current index first",
        "[web]",
        "Branch feature/x pushed.",
    ]
    "#);
    assert_eq!(report.failures(), vec!["api"]);
    assert_eq!(fx.git.checked_out(&fx.path("api")).as_deref(), Some("feature/x"));
    assert_eq!(fx.git.checked_out(&fx.path("web")).as_deref(), Some("scratch"));
}

#[test]
fn test_scratch_restore_failure_keeps_handler_failure() {
    let git = FakeGit::new().fail_flow("api", "finish", "CONFLICT (content): Merge conflict in README");
    let mut fx = Fixture::new(git, &[("api", "u1")]);
    fx.flow(&["feature", "start", "x"]).unwrap();
    fx.git
        .fail_checkout("api", "scratch", "error: you need to resolve your current index first");

    let (report, _) = fx.flow(&["feature", "finish", "x"]).unwrap();
    insta::assert_debug_snapshot!(report.outcome_for("api"), @r#"
    Some(
        Failed(
            "CONFLICT (content): Merge conflict in README; could not return to scratch: git error: git command failed: checkout - error: you need to resolve your current index first",
        ),
    )
    "#);
    assert_eq!(fx.carriers("feature/x"), vec!["api"]);
}

#[test]
fn test_release_finish_publishes_master_and_tags() {
    let mut fx = Fixture::new(FakeGit::new(), &[("api", "u1")]);
    fx.flow(&["release", "start", "spring"]).unwrap();
    fx.git.clear_calls();

    fx.flow(&["release", "finish", "spring"]).unwrap();
    insta::assert_debug_snapshot!(fx.git.calls(), @r#"
    [
        "api: git checkout release/spring",
        "api: git flow release finish spring",
        "api: git push origin :release/spring",
        "api: git push origin develop",
        "api: git push origin master",
        "api: git push origin --tags",
        "api: git checkout scratch",
    ]
    "#);
}

#[test]
fn test_push_only_acting_components() {
    let git = FakeGit::new().fail_flow("web", "start", "fatal: could not create branch");
    let mut fx = Fixture::new(git, &[("api", "u1"), ("web", "u2")]);
    let (report, _) = fx.flow(&["feature", "start", "solo"]).unwrap();
    assert_eq!(report.failures(), vec!["web"]);
    assert_eq!(fx.carriers("feature/solo"), vec!["api"]);
    fx.git.clear_calls();

    let (report, lines) = fx.flow(&["feature", "push", "solo"]).unwrap();
    assert_eq!(report.outcome_for("web"), Some(&ComponentOutcome::Skipped));
    insta::assert_debug_snapshot!(lines, @r#"
    [
        "[api]",
        "Branch feature/solo pushed.",
    ]
    "#);
    assert!(fx.git.calls().iter().all(|call| !call.starts_with("web: git push")));
    fx.assert_all_on_scratch();
}

#[test]
fn test_pull_materializes_branch_from_remote() {
    let mut fx = Fixture::web_and_api();
    fx.git.seed_remote_branch("u1", "feature/shared");

    let (report, lines) = fx.flow(&["feature", "pull", "origin", "shared"]).unwrap();
    assert_eq!(report.outcome_for("api"), Some(&ComponentOutcome::Skipped));
    insta::assert_debug_snapshot!(lines, @r#"
    [
        "[web]",
        "Pulled feature/shared",
    ]
    "#);
    assert_eq!(fx.carriers("feature/shared"), vec!["web"]);
    assert!(fx.git.local_branches(&fx.path("web")).contains("feature/shared"));
    fx.assert_all_on_scratch();
}

#[test]
fn test_list_broadcasts_to_every_component() {
    let mut fx = Fixture::web_and_api();
    fx.git.seed_local_branch(&fx.path("web"), "feature/local-only");

    let (report, lines) = fx.flow(&["feature", "list"]).unwrap();
    assert_eq!(report.outcomes().len(), 2);
    insta::assert_debug_snapshot!(lines, @r#"
    [
        "[api]",
        "[web]",
        "  local-only",
    ]
    "#);
}

#[test]
fn test_cancelled_before_first_component() {
    let mut fx = Fixture::web_and_api();
    fx.cancel.cancel();
    let err = flow_error(fx.flow(&["feature", "list"]).unwrap_err());
    assert!(matches!(err, FlowError::Interrupted { completed: 0 }));
    assert!(fx.git.calls().is_empty());
}

#[test]
fn test_setup_failure_aborts_fan_out() {
    let temp = tempfile::tempdir().unwrap();
    let git = Arc::new(FakeGit::new().with_remote("u1", &[]).with_remote("u2", &[]).fail_clone("u2"));
    let cache = ComponentCache::new(temp.path(), "origin", git.clone()).quiet();
    let components = vec![Component::new("api", "u1"), Component::new("web", "u2")];
    let mut registry = BranchRegistry::new();

    let args = vec!["feature".to_string(), "list".to_string()];
    let FlowCommand::Run(request) = args::parse(&args, &BranchType::ALL).unwrap() else {
        panic!("expected run");
    };
    let mut console = MemoryConsole::new();
    let err = FlowDispatcher::new(&components, &cache, &mut registry)
        .run(&request, &mut console)
        .unwrap_err();

    assert!(err.to_string().contains("web"), "got: {err}");
    assert_eq!(console.lines(), ["[api]".to_string()]);
}
