//! Interactive wizard prompt

use super::catalog::{print_dataset, print_gpu, print_model};
use super::train::{print_results, train_with_progress, uploaded_file};
use crate::error::{CliError, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use spark::{
    LocalStorage, ModelId, ResultsExporter, StepState, TrainingStatus, WizardSession,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    Help,
    Status,
    Models,
    Model(String),
    Datasets,
    Dataset(String),
    Upload(PathBuf),
    Set { field: String, value: String },
    Clear,
    Gpus,
    Gpu(String),
    Next,
    Back,
    Goto(usize),
    Start,
    Results,
    Export(Option<PathBuf>),
    Reset,
    Quit,
}

/// Parse a prompt line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<WizardCommand>> {
    let line = line.trim();
    let Some((verb, rest)) = split_verb(line) else {
        return Ok(None);
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "help" | "?" => WizardCommand::Help,
        "status" | "show" => WizardCommand::Status,
        "models" => WizardCommand::Models,
        "model" => WizardCommand::Model(required(rest, "model <name>")?),
        "datasets" => WizardCommand::Datasets,
        "dataset" => WizardCommand::Dataset(required(rest, "dataset <id|name>")?),
        "upload" => WizardCommand::Upload(PathBuf::from(required(rest, "upload <path>")?)),
        "set" => {
            let (field, value) = rest
                .split_once('=')
                .or_else(|| rest.split_once(char::is_whitespace))
                .map(|(f, v)| (f.trim(), v.trim()))
                .or_else(|| (!rest.is_empty()).then_some((rest, "")))
                .ok_or_else(|| usage("set <field> <value>"))?;
            WizardCommand::Set {
                field: field.to_string(),
                value: value.to_string(),
            }
        }
        "clear" => WizardCommand::Clear,
        "gpus" => WizardCommand::Gpus,
        "gpu" => WizardCommand::Gpu(required(rest, "gpu <id|name>")?),
        "next" | "n" => WizardCommand::Next,
        "back" | "b" => WizardCommand::Back,
        "goto" | "step" => {
            let index = required(rest, "goto <0-4>")?
                .parse()
                .map_err(|_| usage("goto <0-4>"))?;
            WizardCommand::Goto(index)
        }
        "start" | "train" => WizardCommand::Start,
        "results" => WizardCommand::Results,
        "export" => WizardCommand::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
        "reset" => WizardCommand::Reset,
        "quit" | "exit" => WizardCommand::Quit,
        other => {
            return Err(CliError::InvalidInput(format!(
                "unknown command '{}', type 'help'",
                other
            )));
        }
    };
    Ok(Some(command))
}

fn split_verb(line: &str) -> Option<(&str, &str)> {
    if line.is_empty() {
        return None;
    }
    Some(match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    })
}

fn required(rest: &str, usage_text: &str) -> Result<String> {
    if rest.is_empty() {
        Err(usage(usage_text))
    } else {
        Ok(rest.to_string())
    }
}

fn usage(text: &str) -> CliError {
    CliError::InvalidInput(format!("usage: {}", text))
}

pub async fn run_wizard(session: &mut WizardSession, default_output: &Path) -> Result<()> {
    println!("⚡ Neural Spark wizard - type 'help' for commands, 'quit' to leave");
    println!("================================");
    print_status(session);

    let mut rl = DefaultEditor::new()?;

    loop {
        let prompt = format!("⚡ [{}] > ", session.current_step());
        match rl.readline(&prompt) {
            Ok(line) => {
                let command = match parse_command(&line) {
                    Ok(Some(command)) => command,
                    Ok(None) => continue,
                    Err(e) => {
                        println!("❌ {}", e);
                        continue;
                    }
                };
                rl.add_history_entry(&line).ok();

                if command == WizardCommand::Quit {
                    println!("Goodbye! 👋");
                    break;
                }
                if let Err(e) = execute(session, command, default_output).await {
                    println!("❌ {}", e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("\nCtrl-C received. Use 'quit' to leave.");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye! 👋");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Apply one command to the session
pub async fn execute(
    session: &mut WizardSession,
    command: WizardCommand,
    default_output: &Path,
) -> Result<()> {
    match command {
        WizardCommand::Help => print_help(),
        WizardCommand::Status => print_status(session),
        WizardCommand::Models => ModelId::all().into_iter().for_each(print_model),
        WizardCommand::Model(name) => {
            session.select_model_by_name(&name)?;
            print_status(session);
        }
        WizardCommand::Datasets => {
            for dataset in session.available_datasets().await? {
                print_dataset(&dataset);
            }
        }
        WizardCommand::Dataset(id) => {
            session.select_dataset_by_id(&id).await?;
            print_status(session);
        }
        WizardCommand::Upload(path) => {
            let file = uploaded_file(&path).await?;
            println!("📁 {} ({})", file.name, file.size_label());
            session.upload_file(file)?;
            print_status(session);
        }
        WizardCommand::Set { field, value } => {
            session.set_config_field(&field, &value)?;
            print_config(session);
        }
        WizardCommand::Clear => {
            session.clear_config();
            print_config(session);
        }
        WizardCommand::Gpus => {
            for gpu in session.available_gpus().await? {
                print_gpu(&gpu);
            }
        }
        WizardCommand::Gpu(id) => {
            let gpu = session.select_gpu_by_id(&id).await?;
            println!("🖥️  {} selected, est. ${:.2}", gpu.name, gpu.estimated_cost());
        }
        WizardCommand::Next => {
            let before = session.current_step();
            if session.go_next() == before {
                println!("⏸️  Next is not available here");
            }
            print_status(session);
        }
        WizardCommand::Back => {
            let before = session.current_step();
            if session.go_back() == before {
                println!("⏸️  Back is not available here");
            }
            print_status(session);
        }
        WizardCommand::Goto(index) => {
            if !session.click_step(index)? {
                println!("🔒 Step {} is locked", index);
            }
            print_status(session);
        }
        WizardCommand::Start => {
            session.ensure_can_start()?;
            let status = train_with_progress(session).await?;
            if status == TrainingStatus::Complete {
                print_results(session.results()?);
            } else {
                println!("❌ Training failed. Type 'start' to retry.");
            }
        }
        WizardCommand::Results => print_results(session.results()?),
        WizardCommand::Export(dir) => {
            let dir = dir.unwrap_or_else(|| default_output.to_path_buf());
            let exporter = ResultsExporter::new(Arc::new(LocalStorage::new(&dir)));
            let path = exporter.export(session.results()?).await?;
            println!("💾 Saved {}", dir.join(path).display());
        }
        WizardCommand::Reset => {
            session.reset();
            println!("🔄 Wizard reset");
            print_status(session);
        }
        WizardCommand::Quit => {}
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  status                 show the wizard");
    println!("  models                 list models");
    println!("  model <name>           select a model");
    println!("  datasets               list hosted datasets");
    println!("  dataset <id|name>      select a hosted dataset");
    println!("  upload <path>          attach a local dataset file");
    println!("  set <field> <value>    edit a hyperparameter (empty value clears it)");
    println!("  clear                  clear every hyperparameter");
    println!("  gpus | gpu <id|name>   list or pick a GPU");
    println!("  next | back            navigation buttons");
    println!("  goto <0-4>             click a step");
    println!("  start                  start training");
    println!("  results                show results");
    println!("  export [dir]           write training-results.json");
    println!("  reset                  start over");
    println!("  quit                   leave");
}

fn print_status(session: &WizardSession) {
    let line: Vec<String> = session
        .stepper()
        .iter()
        .map(|s| {
            let marker = match s.state {
                StepState::Completed => "✔",
                StepState::Current => "●",
                StepState::Upcoming if s.reachable => "○",
                StepState::Upcoming => "🔒",
            };
            format!("{} {}", marker, s.label)
        })
        .collect();
    println!("{}", line.join("  →  "));

    let state = session.state();
    println!(
        "   model: {} · dataset: {} · status: {}",
        state
            .selected_model
            .map(|m| m.to_string())
            .unwrap_or_else(|| "Not selected".to_string()),
        state.dataset_label(),
        state.training_status
    );
    if let Some(gpu) = session.selected_gpu() {
        println!("   gpu: {} (est. ${:.2})", gpu.name, gpu.estimated_cost());
    }
}

fn print_config(session: &WizardSession) {
    let state = session.state();
    match serde_json::to_string_pretty(&state.config) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("❌ {}", e),
    }
    if !state.is_generative() {
        println!("   (prompt, resolution and seed apply to GPT-2 and Stable Diffusion)");
    }
}
