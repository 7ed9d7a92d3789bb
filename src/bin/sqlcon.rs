//! sqlcon binary - interactive SQL console and script runner
//!
//! Thin glue around the library: argument handling, prompts, and the stdin
//! line loop. Runs against the in-process dry-run processor; a networked
//! client would slot in through the same traits.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use sqlcon::{
    CommitMode, ConsoleConfig, ConsoleError, DiscardResults, DryRunProcessor, ExecutionEngine,
    ReplControl, ReplRunner, ScriptRunner, StdoutReporter,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

struct Args {
    commit_mode: Option<CommitMode>,
    statement: Option<String>,
    script: Option<PathBuf>,
}

fn run() -> anyhow::Result<()> {
    let args = parse_args()?;

    let default_mode = if args.statement.is_some() || args.script.is_some() {
        CommitMode::Commit
    } else {
        CommitMode::AutoCommit
    };
    let config = ConsoleConfig::with_commit_mode(args.commit_mode.unwrap_or(default_mode));
    let engine = ExecutionEngine::new(
        DryRunProcessor::new(),
        DiscardResults,
        StdoutReporter,
        config,
    );

    if let Some(statement) = args.statement {
        let mut runner = ScriptRunner::new(engine);
        runner.run(&statement)?;
        return Ok(());
    }

    if let Some(path) = args.script {
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read script {}", path.display()))?;
        let mut runner = ScriptRunner::new(engine);
        runner.run(&source)?;
        return Ok(());
    }

    interactive_mode(engine)
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        commit_mode: None,
        statement: None,
        script: None,
    };

    let mut iter = env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("sqlcon v{}", VERSION);
                std::process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--auto-commit" => set_commit_mode(&mut args, CommitMode::AutoCommit)?,
            "--no-auto-commit" => set_commit_mode(&mut args, CommitMode::NoAutoCommit)?,
            "--commit" => set_commit_mode(&mut args, CommitMode::Commit)?,
            "--no-commit" => set_commit_mode(&mut args, CommitMode::NoCommit)?,
            "-e" => {
                let statement = iter
                    .next()
                    .ok_or_else(|| ConsoleError::Message("-e requires a statement".to_string()))?;
                args.statement = Some(statement);
            }
            path if !path.starts_with('-') => {
                args.script = Some(PathBuf::from(path));
            }
            unknown => {
                print_help();
                return Err(
                    ConsoleError::Message(format!("unknown option: {}", unknown)).into(),
                );
            }
        }
    }
    Ok(args)
}

fn set_commit_mode(args: &mut Args, mode: CommitMode) -> anyhow::Result<()> {
    if let Some(existing) = args.commit_mode {
        if existing != mode {
            return Err(ConsoleError::Message(
                "conflicting commit-mode options".to_string(),
            )
            .into());
        }
    }
    args.commit_mode = Some(mode);
    Ok(())
}

fn print_help() {
    println!(
        r#"sqlcon v{} - SQL console for transactional databases

usage:
  sqlcon                  start the interactive console
  sqlcon <script.sql>     run a script file
  sqlcon -e "<sql>"       run a single statement
  sqlcon --version        show version
  sqlcon --help           show this help

commit mode (choose at most one):
  --auto-commit           commit each statement (interactive default)
  --no-auto-commit        transactions are fully user-controlled
  --commit                commit at end of a successful run (script default)
  --no-commit             always roll back at end of the run

inside the console, type \help for available commands."#,
        VERSION
    );
}

fn interactive_mode(
    engine: ExecutionEngine<DryRunProcessor, DiscardResults, StdoutReporter>,
) -> anyhow::Result<()> {
    println!("sqlcon v{}", VERSION);
    println!("type '\\help' for help, '\\exit' to quit\n");

    let mut repl = ReplRunner::new(engine);
    let stdin = io::stdin();
    let mut buffer = String::new();

    loop {
        if repl.needs_more() {
            print!("   ...> ");
        } else {
            print!("sqlcon> ");
        }
        io::stdout().flush()?;

        buffer.clear();
        if stdin.lock().read_line(&mut buffer)? == 0 {
            // End of input: a trailing statement without a delimiter still
            // executes.
            repl.finish_input()?;
            break;
        }

        match repl.feed_line(buffer.trim_end_matches('\n'))? {
            ReplControl::Ready | ReplControl::NeedMore => {}
            ReplControl::Exit => break,
        }
    }

    repl.finish(true)?;
    println!("bye");
    Ok(())
}
