mod display;
mod helper;
mod input;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rand::seq::SliceRandom;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use tarot_application::{AppContext, AppOptions, ResumeOutcome, SubmitOutcome, WizardController};
use tarot_core::card::card_by_id;
use tarot_core::resume::ResumeParams;
use tarot_core::session::{CardSelection, ReadingStatus};
use tarot_core::{MAJOR_ARCANA, SpreadType, TarotError, WizardStage};
use tarot_infrastructure::{TarotPaths, process_env};

use helper::CliHelper;
use input::{Command, Input};

/// Interactive tarot readings in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory holding config.toml and secret.json
    #[arg(long, env = "TAROT_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Keep resume drafts in memory
    #[arg(long)]
    memory_store: bool,

    /// Address returned by checkout; resumes the paid reading on startup
    #[arg(long)]
    resume: Option<String>,
}

/// Logs go to a daily file so the prompt stays readable.
fn init_logging(logs_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;
    let appender = tracing_appender::rolling::daily(logs_dir, "tarot-readline.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tarot=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(guard)
}

struct Repl {
    ctx: AppContext,
    controller: WizardController,
    /// "About you" answer waiting for the question.
    pending_user_info: Option<String>,
}

impl Repl {
    fn new(ctx: AppContext) -> Self {
        let controller = ctx.controller(ctx.default_origin());
        Self {
            ctx,
            controller,
            pending_user_info: None,
        }
    }

    fn prompt(&self) -> String {
        let session = self.controller.session();
        match session.stage() {
            WizardStage::Question if self.pending_user_info.is_none() => "about you> ".to_string(),
            WizardStage::Question => "question> ".to_string(),
            WizardStage::Spread => "spread> ".to_string(),
            WizardStage::Card => format!(
                "card {}/{}> ",
                session.selected_card_ids().len() + 1,
                session.spread_type.card_count()
            ),
            WizardStage::Confirm => "confirm> ".to_string(),
            WizardStage::Result => "result> ".to_string(),
        }
    }

    fn announce_stage(&self) {
        let session = self.controller.session();
        match session.stage() {
            WizardStage::Question => {
                println!(
                    "{}",
                    "Tell me a little about yourself, then ask your question.".bright_black()
                );
            }
            WizardStage::Spread => {
                let premium = self.controller.premium_available().then(|| {
                    (
                        self.ctx.payments.product(SpreadType::Single),
                        self.ctx.payments.product(SpreadType::Universal6),
                    )
                });
                println!("{}", "Choose a spread:".bright_yellow());
                println!(
                    "{}",
                    display::spread_menu(premium.as_ref().map(|(s, u)| (s, u)))
                );
            }
            WizardStage::Card => {
                println!("{}", display::card_table());
                self.announce_next_position();
            }
            WizardStage::Confirm => {
                let cards: Vec<_> = session
                    .selected_card_ids()
                    .iter()
                    .filter_map(|&id| card_by_id(id))
                    .collect();
                println!("{}", "Your cards:".bright_yellow());
                println!("{}", display::selection(&cards));
                let hint = if session.needs_checkout() {
                    "Press Enter to continue to payment, or /back to pick again."
                } else {
                    "Press Enter to receive your reading, or /back to pick again."
                };
                println!("{}", hint.bright_black());
            }
            WizardStage::Result => {
                println!(
                    "{}",
                    "Type /save to keep this reading or /new to start another.".bright_black()
                );
            }
        }
    }

    fn announce_next_position(&self) {
        let session = self.controller.session();
        if let Some(position) =
            display::next_position(session.spread_type, session.selected_card_ids().len())
        {
            println!("{}", position.bright_yellow());
        }
    }

    fn report(&self, err: &TarotError) {
        tracing::warn!("[Readline] {}", err);
        eprintln!("{}", err.user_message().red());
    }

    async fn handle(&mut self, input: Input) {
        let before = self.controller.session().stage();
        let outcome = match input {
            Input::Empty if before == WizardStage::Confirm => self.submit().await,
            Input::Empty | Input::Quit => Ok(()),
            Input::Text(text) => self.text(&text),
            Input::Command(command) => self.command(command).await,
        };
        if let Err(err) = outcome {
            self.report(&err);
            if matches!(self.controller.session().status(), ReadingStatus::Failed(_)) {
                println!("{}", "Press Enter to try again.".bright_black());
            }
        }
        if self.controller.session().stage() != before {
            self.announce_stage();
        }
    }

    fn text(&mut self, text: &str) -> Result<(), TarotError> {
        match self.controller.session().stage() {
            WizardStage::Question => match self.pending_user_info.take() {
                None => {
                    self.pending_user_info = Some(text.to_string());
                    Ok(())
                }
                Some(user_info) => {
                    let submitted = self.controller.submit_question(&user_info, text);
                    if submitted.is_err() {
                        self.pending_user_info = Some(user_info);
                    }
                    submitted
                }
            },
            WizardStage::Spread => {
                let (spread, tier) = input::spread_choice(text).ok_or_else(|| {
                    TarotError::validation("Choose 1-4, or type single / universal6 [premium]")
                })?;
                self.controller.choose_spread(spread, tier)
            }
            WizardStage::Card => {
                let id = input::card_id(text)
                    .ok_or_else(|| TarotError::validation(format!("Unknown card: {text}")))?;
                self.pick(id)
            }
            WizardStage::Confirm => Err(TarotError::validation(
                "Press Enter to submit, or /back to pick again",
            )),
            WizardStage::Result => Err(TarotError::validation(
                "Type /save to keep this reading or /new to start another",
            )),
        }
    }

    fn pick(&mut self, id: u8) -> Result<(), TarotError> {
        let name = card_by_id(id).map(|c| c.name).unwrap_or_default();
        match self.controller.select_card(id)? {
            CardSelection::Picked { .. } => {
                println!("{}", format!("Drew {name}").green());
                self.announce_next_position();
            }
            CardSelection::Truncated { count } => {
                println!(
                    "{}",
                    format!("Put back {name}; {count} card(s) remain").yellow()
                );
                self.announce_next_position();
            }
            CardSelection::Completed => println!("{}", format!("Drew {name}").green()),
        }
        Ok(())
    }

    async fn submit(&mut self) -> Result<(), TarotError> {
        if !self.controller.session().needs_checkout() {
            println!("{}", "Consulting the cards...".bright_black());
        }
        match self.controller.submit().await? {
            SubmitOutcome::Reading(result) => println!("{}", display::reading(&result)),
            SubmitOutcome::RedirectTo(started) => {
                println!("{}", "Complete your payment at:".bright_yellow());
                println!("{}", started.url.bright_cyan());
                println!(
                    "{}",
                    "When you are returned, paste that address after /resume.".bright_black()
                );
                tracing::info!("[Readline] Checkout started (resume id {})", started.resume_id);
            }
        }
        Ok(())
    }

    async fn command(&mut self, command: Command) -> Result<(), TarotError> {
        match command {
            Command::Back => self.controller.go_back(),
            Command::Cards => {
                println!("{}", display::card_table());
                Ok(())
            }
            Command::Help => {
                print_help();
                Ok(())
            }
            Command::History => {
                if self.controller.history().is_empty() {
                    println!("{}", "No saved readings yet.".bright_black());
                }
                for (i, result) in self.controller.history().iter().enumerate() {
                    println!("{}", display::history_line(i, result));
                }
                Ok(())
            }
            Command::New => {
                self.controller.new_reading();
                self.pending_user_info = None;
                Ok(())
            }
            Command::Random => {
                if self.controller.session().stage() != WizardStage::Card {
                    return Err(TarotError::validation("Cards can only be drawn while picking"));
                }
                let selected = self.controller.session().selected_card_ids();
                let remaining: Vec<u8> = MAJOR_ARCANA
                    .iter()
                    .map(|c| c.id)
                    .filter(|id| !selected.contains(id))
                    .collect();
                let id = remaining
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .ok_or_else(|| TarotError::internal("No cards left to draw"))?;
                self.pick(id)
            }
            Command::Resume(address) => {
                let params = input::resume_params(&address).map_err(TarotError::validation)?;
                self.resume(&params).await
            }
            Command::Save => {
                let saved = self.controller.save()?;
                println!(
                    "{}",
                    format!("Saved \"{}\"", saved.question).green()
                );
                self.pending_user_info = None;
                Ok(())
            }
            Command::Unknown(name) => Err(TarotError::validation(format!(
                "Unknown command: /{name} (try /help)"
            ))),
        }
    }

    async fn resume(&mut self, params: &ResumeParams) -> Result<(), TarotError> {
        println!("{}", "Restoring your paid reading...".bright_black());
        match self.controller.resume(params).await? {
            ResumeOutcome::Resumed(result) => println!("{}", display::reading(&result)),
            ResumeOutcome::NotRequested => {
                return Err(TarotError::validation(
                    "That address has no checkout session to resume",
                ));
            }
            ResumeOutcome::AlreadyResumed => {
                println!(
                    "{}",
                    "This payment has already been used for a reading.".yellow()
                );
            }
            ResumeOutcome::NothingToResume => {
                println!("{}", "There is no saved reading to resume.".yellow());
            }
        }
        Ok(())
    }
}

fn print_help() {
    println!("{}", "Commands:".bright_yellow());
    println!("  /back     return to card selection");
    println!("  /cards    list the Major Arcana");
    println!("  /random   draw a random card");
    println!("  /resume   resume a paid reading from the checkout return address");
    println!("  /save     keep the current reading");
    println!("  /history  list saved readings");
    println!("  /new      start over");
    println!("  quit      exit");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = process_env();

    let paths = TarotPaths::resolve(args.config_dir.as_deref(), &env)?;
    let _log_guard = init_logging(&paths.logs_dir())?;

    let options = AppOptions {
        config_dir: Some(paths.config_dir().to_path_buf()),
        memory_store: args.memory_store,
    };
    let ctx = AppContext::bootstrap(&options, env).await?;
    let mut repl = Repl::new(ctx);

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Tarot-AI ===".bright_magenta().bold());
    println!(
        "{}",
        "Type /help for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    if let Some(address) = args.resume.as_deref() {
        repl.handle(Input::Command(Command::Resume(address.to_string())))
            .await;
    }
    repl.announce_stage();

    loop {
        match rl.readline(&repl.prompt()) {
            Ok(line) => {
                let input = input::parse(&line);
                if input == Input::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if matches!(input, Input::Text(_) | Input::Command(_)) {
                    let _ = rl.add_history_entry(line.trim());
                }

                repl.handle(input).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {err:?}").red());
                break;
            }
        }
    }

    Ok(())
}
