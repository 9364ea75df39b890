//! Interactive REPL: read stdin, run one turn per line, print replies, repeat until EOF or quit.

use std::io::Write;

use quill::TutorialWorkflow;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::Output;

fn is_quit_command(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit" | "/quit" | "/exit")
}

/// Runs turns for `session_id` until EOF (Ctrl+D) or `quit`/`exit`.
///
/// A failed turn is reported on stderr and the loop continues; the session
/// stays at its last saved checkpoint.
pub async fn run_repl_loop(
    workflow: &TutorialWorkflow,
    session_id: &str,
    output: &Output<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match reader.next_line().await? {
            None => break,
            Some(s) if s.trim().is_empty() => continue,
            Some(s) if is_quit_command(&s) => break,
            Some(s) => s,
        };

        if let Err(e) = run_turn(workflow, session_id, &line, output).await {
            eprintln!("error: {}", e);
        }
    }
    println!("Bye.");
    Ok(())
}

/// One turn plus its output and optional export.
pub async fn run_turn(
    workflow: &TutorialWorkflow,
    session_id: &str,
    message: &str,
    output: &Output<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = workflow.run_with_report(session_id, message).await?;
    if output.json {
        println!("{}", serde_json::to_string(&cli::report_json(&report))?);
    } else {
        println!("{}", cli::render_report(&report, output.verbose));
    }
    if let (Some(artifact), Some(dir)) = (&report.artifact, output.out_dir) {
        let path = cli::export_tutorial(dir, artifact)?;
        eprintln!("tutorial written to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::is_quit_command;

    #[test]
    fn quit_commands() {
        for s in ["quit", "exit", " /quit ", "/exit"] {
            assert!(is_quit_command(s), "{}", s);
        }
        assert!(!is_quit_command("quit now"));
        assert!(!is_quit_command("I want to learn exit codes"));
    }
}
