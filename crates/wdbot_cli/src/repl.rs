use crate::commands::{Command, Session};
use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use tracing::error;

/// A single prompt line, parsed with the same grammar as the subcommands.
#[derive(Parser, Debug)]
#[command(name = "wdbot", no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

pub async fn run(session: &Session) -> Result<()> {
    println!("wdbot ready for user {}. Type 'quit' to exit.", session.user_id);
    print!("> ");
    io::stdout().flush()?;

    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let trimmed = input.trim();

        if trimmed == "quit" || trimmed == "exit" {
            break;
        }

        if !trimmed.is_empty() {
            match Line::try_parse_from(trimmed.split_whitespace()) {
                Ok(line) => {
                    if let Err(e) = session.dispatch(line.command).await {
                        error!("Command failed: {:#}", e);
                        println!("[Error]: {:#}", e);
                    }
                }
                Err(e) => println!("{}", e),
            }
        }

        print!("> ");
        io::stdout().flush()?;
    }

    Ok(())
}
