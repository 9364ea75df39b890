//! Quill CLI binary: one conversation turn per invocation, or a REPL with `-i`.
//!
//! Subcommands: `show` (session state as JSON), `history` (checkpoints), `reset` (forget a session).

mod logging;
mod repl;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cli::StoreKind;
use config::Settings;
use repl::{run_repl_loop, run_turn};

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Quill: plan, write and assemble a tutorial through conversation")]
struct Args {
    #[command(subcommand)]
    cmd: Option<Command>,

    /// Session id. Turns with the same id continue the same tutorial.
    #[arg(short, long, value_name = "ID", env = "QUILL_SESSION", default_value = "default")]
    session: String,

    /// User message (or pass as positional arguments)
    #[arg(short, long, value_name = "TEXT")]
    message: Option<String>,

    /// Positional args: user message when -m/--message is not used
    #[arg(trailing_var_arg = true)]
    rest: Vec<String>,

    /// Interactive REPL: keep reading messages from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Keep sessions in memory instead of the SQLite checkpoint file
    #[arg(long)]
    memory: bool,

    /// Write the finished tutorial as Markdown into this directory
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Print each turn as one JSON line
    #[arg(long)]
    json: bool,

    /// Verbose: show nodes run and recovered failures; debug logs for quill
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Print the saved session state as JSON
    Show,
    /// List the session's checkpoints, oldest first
    History {
        /// Only the newest N checkpoints
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// Delete every checkpoint of the session
    Reset,
}

/// Output options shared by one-shot and REPL turns.
pub struct Output<'a> {
    pub json: bool,
    pub verbose: bool,
    pub out_dir: Option<&'a std::path::Path>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    config::load_and_apply("quill", None::<&std::path::Path>).ok();
    let args = Args::parse();
    let _log_guard = logging::init(args.verbose)?;

    let settings = Settings::from_env()?;
    let store = if args.memory {
        StoreKind::Memory
    } else {
        StoreKind::Sqlite
    };
    let workflow = cli::build_workflow(&settings, store)?;
    let session = args.session.as_str();

    match &args.cmd {
        Some(Command::Show) => {
            let state = workflow.load(session).await?;
            println!("{}", serde_json::to_string_pretty(&state)?);
            return Ok(());
        }
        Some(Command::History { limit }) => {
            let items = workflow.history(session, *limit).await?;
            if args.json {
                println!("{}", serde_json::to_string(&items)?);
            } else if items.is_empty() {
                println!("no checkpoints for session {}", session);
            } else {
                for item in items {
                    println!(
                        "{:>4}  {}  {}",
                        item.step,
                        item.created_at.format("%Y-%m-%d %H:%M:%S"),
                        item.checkpoint_id
                    );
                }
            }
            return Ok(());
        }
        Some(Command::Reset) => {
            workflow.reset(session).await?;
            println!("session {} reset", session);
            return Ok(());
        }
        None => {}
    }

    let message = args.message.clone().or_else(|| {
        if args.rest.is_empty() {
            None
        } else {
            Some(args.rest.join(" "))
        }
    });
    if !args.interactive && message.is_none() {
        eprintln!("quill: provide a message via -m/--message or positional args, or use -i");
        std::process::exit(1);
    }
    if args.memory && !args.interactive {
        eprintln!("quill: --memory without -i keeps nothing after this turn");
    }

    let output = Output {
        json: args.json,
        verbose: args.verbose,
        out_dir: args.out.as_deref(),
    };

    if let Some(msg) = message.as_deref().filter(|m| !m.trim().is_empty()) {
        if let Err(e) = run_turn(&workflow, session, msg, &output).await {
            eprintln!("error: {}", e);
            if !args.interactive {
                std::process::exit(1);
            }
        }
    }
    if args.interactive {
        run_repl_loop(&workflow, session, &output).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_words_form_the_message() {
        let args = Args::try_parse_from(["quill", "-s", "rust", "teach", "me", "rust"]).unwrap();
        assert_eq!(args.session, "rust");
        assert_eq!(args.rest, vec!["teach", "me", "rust"]);
        assert!(args.cmd.is_none());
    }

    #[test]
    fn subcommands_parse() {
        let args = Args::try_parse_from(["quill", "-s", "a", "history", "--limit", "3"]).unwrap();
        assert!(matches!(args.cmd, Some(Command::History { limit: Some(3) })));
        let args = Args::try_parse_from(["quill", "reset"]).unwrap();
        assert!(matches!(args.cmd, Some(Command::Reset)));
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from([
            "quill", "-i", "--memory", "--json", "--out", "/tmp/t", "-m", "hi",
        ])
        .unwrap();
        assert!(args.interactive && args.memory && args.json);
        assert_eq!(args.out, Some(PathBuf::from("/tmp/t")));
        assert_eq!(args.message.as_deref(), Some("hi"));
    }
}
