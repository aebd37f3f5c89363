//! Tests for argument parsing, the project-editing commands and exit codes.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use clap::Parser;
use reppl::cli::{
    Cli, Commands, Completion, ERROR_EXIT_CODE, PutCommand, cmd_init, cmd_put_hash, cmd_show,
    cmd_unset,
};
use reppl::store::load_project;
use reppl_core::{ReppError, Ware};
use std::path::PathBuf;

// =============================================================================
// PARSING
// =============================================================================

#[test]
fn test_eval_requires_formula() {
    assert!(Cli::try_parse_from(["reppl", "eval"]).is_err());
}

#[test]
fn test_eval_collects_repeated_env() {
    let cli = Cli::try_parse_from([
        "reppl", "eval", "build.frm", "-e", "A=1", "--env", "B=2", "--force",
    ])
    .unwrap();

    let Commands::Eval { formula, force, env } = cli.command else {
        panic!("expected eval");
    };
    assert_eq!(formula, PathBuf::from("build.frm"));
    assert!(force);
    assert_eq!(env, vec!["A=1".to_string(), "B=2".to_string()]);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["reppl", "show", "-p", "other.reppl", "-v", "--json"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.project, Some(PathBuf::from("other.reppl")));
    assert!(matches!(cli.command, Commands::Show { json: true }));
}

#[test]
fn test_put_hash_defaults_to_tar() {
    let cli = Cli::try_parse_from([
        "reppl", "put", "hash", "base", "abc", "-w", "http://a", "-w", "http://b",
    ])
    .unwrap();

    let Commands::Put {
        what:
            PutCommand::Hash {
                tag,
                hash,
                kind,
                warehouse,
            },
    } = cli.command
    else {
        panic!("expected put hash");
    };
    assert_eq!(tag, "base");
    assert_eq!(hash, "abc");
    assert_eq!(kind, "tar");
    assert_eq!(warehouse.len(), 2);
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Cli::try_parse_from(["reppl", "publish"]).is_err());
}

// =============================================================================
// PROJECT COMMANDS
// =============================================================================

#[test]
fn test_init_refuses_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".reppl");

    assert_eq!(cmd_init(&path, false).unwrap(), Completion::Done);
    cmd_put_hash(&path, "base", "abc", "tar", &[]).unwrap();

    assert!(cmd_init(&path, false).is_err());
    assert!(load_project(&path).unwrap().lookup_by_tag("base").is_some());

    cmd_init(&path, true).unwrap();
    assert!(load_project(&path).unwrap().tags().is_empty());
}

#[test]
fn test_put_then_unset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".reppl");
    cmd_init(&path, false).unwrap();

    cmd_put_hash(&path, "base", "abc", "git", &["http://wh".to_string()]).unwrap();
    let project = load_project(&path).unwrap();
    let ware = Ware::new("git", "abc");
    assert_eq!(project.lookup_by_tag("base"), Some(&ware));
    assert_eq!(
        project.lookup_warehouses(&ware),
        Some(&["http://wh".to_string()][..])
    );

    cmd_unset(&path, "base").unwrap();
    let project = load_project(&path).unwrap();
    assert!(project.lookup_by_tag("base").is_none());
    // Warehouse knowledge outlives the tag.
    assert!(project.lookup_warehouses(&ware).is_some());
}

#[test]
fn test_unset_missing_tag_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".reppl");
    cmd_init(&path, false).unwrap();

    assert_eq!(cmd_unset(&path, "nope").unwrap(), Completion::Done);
}

#[test]
fn test_commands_need_a_project() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".reppl");

    assert!(matches!(cmd_show(&path, false), Err(ReppError::Io(_))));
    assert!(matches!(
        cmd_put_hash(&path, "t", "h", "tar", &[]),
        Err(ReppError::Io(_))
    ));
}

// =============================================================================
// EXIT CODES
// =============================================================================

#[test]
fn test_exit_codes_are_distinct() {
    assert_eq!(Completion::Done.exit_code(), 0);
    assert_eq!(Completion::ActionFailed.exit_code(), 1);
    assert_eq!(ERROR_EXIT_CODE, 2);
}

#[cfg(unix)]
mod eval_command {
    use super::*;
    use reppl::cli::cmd_eval;
    use reppl::config::Config;
    use std::path::Path;

    const FORMULA: &str = "action:\n  command: [make]\noutputs:\n  result:\n    tag: app\n";

    /// An engine that answers every pin file with the given exit code.
    fn engine_exiting(code: &str) -> Vec<String> {
        let script = format!(
            r#"echo '{{"results":{{"$exitcode":{{"type":"exitcode","hash":"{}"}},"result":{{"type":"tar","hash":"H"}}}}}}'"#,
            code
        );
        vec!["sh".to_string(), "-c".to_string(), script]
    }

    fn setup(dir: &Path) -> (PathBuf, PathBuf) {
        let project = dir.join(".reppl");
        let formula = dir.join("build.frm");
        std::fs::write(&formula, FORMULA).unwrap();
        cmd_init(&project, false).unwrap();
        (project, formula)
    }

    #[tokio::test]
    async fn test_failing_action_completes_as_action_failed() {
        let dir = tempfile::tempdir().unwrap();
        let (project, formula) = setup(dir.path());
        let before = std::fs::read(&project).unwrap();
        let config = Config {
            project: project.clone(),
            engine: engine_exiting("1"),
        };

        let completion = cmd_eval(&config, formula, false, Vec::new()).await.unwrap();

        assert_eq!(completion, Completion::ActionFailed);
        assert_eq!(completion.exit_code(), 1);
        assert_eq!(std::fs::read(&project).unwrap(), before);
    }

    #[tokio::test]
    async fn test_successful_action_then_noop_complete_as_done() {
        let dir = tempfile::tempdir().unwrap();
        let (project, formula) = setup(dir.path());
        let config = Config {
            project: project.clone(),
            engine: engine_exiting("0"),
        };

        let first = cmd_eval(&config, formula.clone(), false, Vec::new())
            .await
            .unwrap();
        assert_eq!(first, Completion::Done);
        assert_eq!(
            load_project(&project).unwrap().lookup_by_tag("app"),
            Some(&Ware::new("tar", "H"))
        );

        // Memo hit; an engine that cannot start proves nothing runs.
        let broken = Config {
            project,
            engine: vec!["/nonexistent/reppl-engine".to_string()],
        };
        let second = cmd_eval(&broken, formula, false, Vec::new()).await.unwrap();
        assert_eq!(second, Completion::Done);
    }

    #[tokio::test]
    async fn test_unstartable_engine_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (project, formula) = setup(dir.path());
        let config = Config {
            project,
            engine: vec!["/nonexistent/reppl-engine".to_string()],
        };

        let err = cmd_eval(&config, formula, false, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ReppError::Engine(_)));
    }
}
