use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use hanzi_srs_algo::{Attribute, IntroductionDecision, Outcome, SystemClock, TaskKind};
use hanzi_srs_trainer::config::Config;
use hanzi_srs_trainer::logging::init_tracing;
use hanzi_srs_trainer::{Trainer, TrainerError};

#[derive(Debug, Parser)]
#[command(name = "hanzi-srs", version, about = "Spaced-repetition trainer for Chinese vocabulary")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show bucket counts, due items and the introduction decision
    Status,
    /// Introduce one unseen item if the policy allows it
    Introduce {
        /// Introduce even when the policy leaves the choice open
        #[arg(long)]
        force: bool,
    },
    /// Print the next batch of due items
    Batch,
    /// Apply one outcome (1 correct, 0 hint, -1 incorrect) to one task
    Review {
        id: String,
        source: Attribute,
        target: Attribute,
        #[arg(allow_hyphen_values = true)]
        outcome: Outcome,
    },
    /// Record a wrong answer and report which known items it matched
    Confuse {
        id: String,
        source: Attribute,
        target: Attribute,
        answer: String,
        /// Ignore tones when matching pinyin
        #[arg(long)]
        loose: bool,
    },
    /// Write the per-item level report
    Stats {
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = init_tracing(&config);

    match run(cli.command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: Config) -> Result<(), TrainerError> {
    let mut trainer = Trainer::open(config, SystemClock)?;

    match command {
        Command::Status => {
            let report = trainer.status();
            println!("known {}  unseen {}  due {}", report.known, report.unseen, report.due);
            for (gradation, count) in &report.buckets {
                println!("  {:<10} {count}", gradation.label());
            }
            let decision = match report.decision {
                IntroductionDecision::Introduce => "introduce a new item".to_string(),
                IntroductionDecision::AskCaller => "nothing due, new item optional".to_string(),
                IntroductionDecision::DoNotIntroduce(reason) => format!("hold back ({reason:?})"),
            };
            println!("decision: {decision}");
        }
        Command::Introduce { force } => match trainer.introduce(force)? {
            Some(id) => {
                if let Some(item) = trainer.scheduler().pool().get_known(&id) {
                    println!("{id}\t{}\t{}\t{}", item.hanzi, item.pinyin, item.translation);
                }
            }
            None => println!("no item introduced"),
        },
        Command::Batch => match trainer.batch() {
            Some(batch) => {
                for id in batch.ids() {
                    if let Some(item) = trainer.scheduler().pool().get_known(id) {
                        println!("{id}\t{}\tlevel {}", item.hanzi, item.global_level());
                    }
                }
            }
            None => println!("nothing to train"),
        },
        Command::Review {
            id,
            source,
            target,
            outcome,
        } => {
            let task = TaskKind::try_new(source, target)?;
            let event = trainer.review(&id, task, outcome)?;
            println!(
                "{id} {task}: level {} -> {} (strength {:.3})",
                event.level_old, event.level_new, event.memory_strength
            );
        }
        Command::Confuse {
            id,
            source,
            target,
            answer,
            loose,
        } => {
            let task = TaskKind::try_new(source, target)?;
            let matches = trainer.confuse(&id, task, &answer, loose)?;
            if matches.is_empty() {
                println!("no known item matches {answer:?}");
            } else {
                println!("confused with {}", matches.join(", "));
            }
        }
        Command::Stats { output } => {
            let rows = trainer.export_stats(output.as_deref())?;
            println!("{rows} items written");
        }
    }
    Ok(())
}
