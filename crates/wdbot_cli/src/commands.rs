use crate::collaborators::Collaborators;
use anyhow::{Context, Result};
use clap::Subcommand;
use wdbot_core::{HistoryCategory, ResultPage, UserId, WizardPhase};
use wdbot_memory::InteractionState;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ranked visit history (categories: entity, location)
    #[command(subcommand)]
    History(HistoryCommand),
    /// Recent navigation path
    #[command(subcommand)]
    Path(PathCommand),
    /// Subject/predicate/object query wizard
    #[command(subcommand)]
    Wizard(WizardCommand),
    /// List popular entity ids
    Popular,
    /// Interactive prompt accepting the commands above
    Repl,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    Record { category: String, value: String },
    List { category: String },
    Clear { category: String },
}

#[derive(Subcommand, Debug)]
pub enum PathCommand {
    Append { token: String },
    List,
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum WizardCommand {
    Start,
    /// Feed the next answer (subject, then predicate, then object)
    Say {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Print the synthesized query
    Finish,
    /// Execute the synthesized query and print one page of results
    Run {
        #[arg(long, default_value_t = 0)]
        page: usize,
    },
    Show,
}

/// What the wizard asks for next.
fn prompt_for(phase: WizardPhase) -> &'static str {
    match phase {
        WizardPhase::AwaitingSubject => "Who or what are you looking for?",
        WizardPhase::AwaitingPredicate => "Which property should it have?",
        WizardPhase::AwaitingObject => "With which value?",
        WizardPhase::Ready => "Ready. Use `wizard finish` or `wizard run`.",
    }
}

pub struct Session {
    pub state: InteractionState,
    pub collaborators: Collaborators,
    pub user_id: UserId,
    pub results_per_page: usize,
}

impl Session {
    pub async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::History(cmd) => self.history(cmd).await,
            Command::Path(cmd) => self.path(cmd).await,
            Command::Wizard(cmd) => self.wizard(cmd).await,
            Command::Popular => self.popular().await,
            Command::Repl => {
                println!("Already in the interactive prompt.");
                Ok(())
            }
        }
    }

    async fn history(&self, cmd: HistoryCommand) -> Result<()> {
        let history = &self.state.history;
        match cmd {
            HistoryCommand::Record { category, value } => {
                let category: HistoryCategory = category.parse()?;
                if history.record(self.user_id, category, &value).await? {
                    println!("Recorded {} in {} history.", value.trim(), category);
                } else {
                    println!("Nothing recorded.");
                }
            }
            HistoryCommand::List { category } => {
                let category: HistoryCategory = category.parse()?;
                let values = history.list(self.user_id, category).await?;
                if values.is_empty() {
                    println!("No {} history.", category);
                }
                for (i, value) in values.iter().enumerate() {
                    match category {
                        HistoryCategory::Entity => {
                            let label = self
                                .collaborators
                                .reader
                                .entity_label(value)
                                .await
                                .with_context(|| format!("Failed to look up {}", value))?;
                            match label.description {
                                Some(d) => println!("{}. {} ({}) - {}", i + 1, label.label, value, d),
                                None => println!("{}. {} ({})", i + 1, label.label, value),
                            }
                        }
                        HistoryCategory::Location => println!("{}. {}", i + 1, value),
                    }
                }
            }
            HistoryCommand::Clear { category } => {
                let category: HistoryCategory = category.parse()?;
                history.clear(self.user_id, category).await?;
                println!("Cleared {} history.", category);
            }
        }
        Ok(())
    }

    async fn path(&self, cmd: PathCommand) -> Result<()> {
        let paths = &self.state.paths;
        match cmd {
            PathCommand::Append { token } => {
                paths.append_token(self.user_id, &token).await?;
                println!("{}", paths.list(self.user_id).await?.join(" > "));
            }
            PathCommand::List => {
                let tokens = paths.list(self.user_id).await?;
                if tokens.is_empty() {
                    println!("No path yet.");
                } else {
                    println!("{}", tokens.join(" > "));
                }
            }
            PathCommand::Clear => {
                paths.clear(self.user_id).await?;
                println!("Cleared path.");
            }
        }
        Ok(())
    }

    async fn wizard(&self, cmd: WizardCommand) -> Result<()> {
        let wizard = &self.state.wizard;
        match cmd {
            WizardCommand::Start => {
                wizard.start(self.user_id).await?;
                println!("{}", prompt_for(WizardPhase::AwaitingSubject));
            }
            WizardCommand::Say { text } => match wizard.submit_text(self.user_id, &text.join(" ")).await? {
                Some(phase) => println!("{}", prompt_for(phase)),
                None => println!("No wizard in progress. Use `wizard start` first."),
            },
            WizardCommand::Finish => {
                println!("{}", wizard.finish(self.user_id).await?);
            }
            WizardCommand::Run { page } => {
                let rows = wizard.run(self.user_id, self.collaborators.executor.as_ref()).await?;
                let shown = ResultPage::of(&rows, page, self.results_per_page);
                if shown.is_empty() {
                    println!("No results.");
                    return Ok(());
                }
                for row in shown.items {
                    match &row.description {
                        Some(d) => println!("- {} ({}) - {}", row.label, row.id, d),
                        None => println!("- {} ({})", row.label, row.id),
                    }
                }
                println!("Page {}/{}", shown.page + 1, shown.total_pages);
            }
            WizardCommand::Show => match wizard.state(self.user_id).await? {
                Some(state) => {
                    println!("phase:     {:?}", state.phase);
                    println!("subject:   {}", state.subject);
                    println!("predicate: {}", state.predicate);
                    println!("object:    {}", state.object);
                }
                None => println!("No wizard in progress."),
            },
        }
        Ok(())
    }

    async fn popular(&self) -> Result<()> {
        let popular = self
            .collaborators
            .popular
            .as_ref()
            .context("Popular entities need network access; drop --offline")?;
        let ids = popular.get().await;
        if ids.is_empty() {
            println!("No popular entities available.");
        }
        for id in ids {
            println!("{}", id);
        }
        Ok(())
    }
}
