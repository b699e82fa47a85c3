//! Interactive session over an in-memory tracker.
//!
//! Every change lives only as long as the process unless the user exports a
//! snapshot before leaving.

use anyhow::{Context, Result};
use chrono::Local;
use colored::Colorize;
use inquire::{Confirm, Editor, Select, Text};
use std::fmt;
use std::path::{Path, PathBuf};

use devtrack_core::mis::{MonthlyReportPatch, SECTIONS};
use devtrack_core::{new_documents, write_snapshot, Config, MonthKey, Tracker};

use crate::display;
use crate::prompts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Dashboard,
    ListRequests,
    ShowRequest,
    CreateRequest,
    EditPhase,
    ChangeStage,
    TrackedItems,
    MisSummary,
    EditReport,
    Export,
    Quit,
}

impl Action {
    const ALL: [Action; 11] = [
        Action::Dashboard,
        Action::ListRequests,
        Action::ShowRequest,
        Action::CreateRequest,
        Action::EditPhase,
        Action::ChangeStage,
        Action::TrackedItems,
        Action::MisSummary,
        Action::EditReport,
        Action::Export,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Dashboard => "View dashboard",
            Action::ListRequests => "List requests",
            Action::ShowRequest => "Show request details",
            Action::CreateRequest => "Create request",
            Action::EditPhase => "Edit phase details",
            Action::ChangeStage => "Change stage",
            Action::TrackedItems => "Manage bugs, tasks and issues",
            Action::MisSummary => "MIS summary",
            Action::EditReport => "Edit monthly report",
            Action::Export => "Export snapshot",
            Action::Quit => "Quit",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemAction {
    Add,
    Update,
    AttachDocuments,
    RemoveDocument,
    Delete,
    Back,
}

impl fmt::Display for ItemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ItemAction::Add => "Add item",
            ItemAction::Update => "Update item",
            ItemAction::AttachDocuments => "Attach documents",
            ItemAction::RemoveDocument => "Remove document",
            ItemAction::Delete => "Delete item",
            ItemAction::Back => "Back",
        };
        write!(f, "{}", label)
    }
}

/// Runs the session loop until the user quits.
pub fn run(tracker: &mut Tracker, config: &Config, export_path: Option<&Path>) -> Result<()> {
    println!("{}", "devtrack interactive session".blue().bold());
    println!(
        "{}",
        "Changes are kept in memory only; export a snapshot to keep them.".dimmed()
    );

    let user = prompts::prompt_user_name(config.user_name.as_deref())?;

    loop {
        let action = Select::new("What would you like to do?", Action::ALL.to_vec()).prompt()?;
        if action == Action::Quit {
            break;
        }

        // A failed action is reported and the session carries on.
        if let Err(e) = run_action(action, tracker, &user) {
            println!("{} {:#}", "✗".red(), e);
        }
        println!();
    }

    finish(tracker, export_path)
}

fn run_action(action: Action, tracker: &mut Tracker, user: &str) -> Result<()> {
    let today = Local::now().date_naive();

    match action {
        Action::Dashboard => display::print_dashboard(tracker.requests.all()),
        Action::ListRequests => {
            let filter = prompts::prompt_request_filter()?;
            display::print_request_table(&tracker.requests.list(&filter));
        }
        Action::ShowRequest => {
            let id = prompts::prompt_select_request(tracker.requests.all())?;
            let req = tracker
                .requests
                .get(&id)
                .with_context(|| format!("Request '{}' not found", id))?;
            display::print_request(req, &tracker.items);
        }
        Action::CreateRequest => {
            let draft = prompts::prompt_new_request(Some(user))?;
            let req = tracker.requests.create(draft)?;
            println!("{} Created request {}", "✓".green(), req.id.yellow());
        }
        Action::EditPhase => {
            let id = prompts::prompt_select_request(tracker.requests.all())?;
            let req = tracker
                .requests
                .get(&id)
                .with_context(|| format!("Request '{}' not found", id))?
                .clone();
            let stage = prompts::prompt_select_stage("Phase to edit:", req.current_stage)?;
            let edit = prompts::prompt_phase_edit(stage, &req)?;
            tracker.requests.apply_phase_edit(&id, edit)?;
            println!("{} Updated {} details for {}", "✓".green(), stage.label(), id);
        }
        Action::ChangeStage => {
            let id = prompts::prompt_select_request(tracker.requests.all())?;
            let current = tracker
                .requests
                .get(&id)
                .with_context(|| format!("Request '{}' not found", id))?
                .current_stage;
            let stage = prompts::prompt_select_stage("Move to stage:", current.next().unwrap_or(current))?;
            let req = tracker.requests.set_stage(&id, stage)?;
            println!(
                "{} {} is now in {}",
                "✓".green(),
                req.id,
                display::stage_colored(req.current_stage)
            );
        }
        Action::TrackedItems => manage_items(tracker, user, today)?,
        Action::MisSummary => {
            let default = MonthKey::from_date(today).previous();
            let month = prompts::prompt_month("Month (YYYY-MM):", default)?;
            display::print_mis(tracker.requests.all(), month);
        }
        Action::EditReport => edit_report(tracker, MonthKey::from_date(today))?,
        Action::Export => {
            let path = Text::new("Export to file (.json or .yaml):")
                .with_default("devtrack-snapshot.yaml")
                .prompt()?;
            export_to(tracker, Path::new(&path))?;
        }
        Action::Quit => {}
    }

    Ok(())
}

fn manage_items(tracker: &mut Tracker, user: &str, today: chrono::NaiveDate) -> Result<()> {
    let request_id = prompts::prompt_select_request(tracker.requests.all())?;
    let phase = prompts::prompt_select_item_phase()?;

    loop {
        display::print_tracked_items(&request_id, &tracker.items);

        let actions = vec![
            ItemAction::Add,
            ItemAction::Update,
            ItemAction::AttachDocuments,
            ItemAction::RemoveDocument,
            ItemAction::Delete,
            ItemAction::Back,
        ];
        let action = Select::new(&format!("{} {}:", phase, phase.item_noun()), actions).prompt()?;

        match action {
            ItemAction::Add => {
                let draft = prompts::prompt_new_item(phase, Some(user))?;
                let item = tracker.items.create(&request_id, phase, draft)?;
                println!("{} Added {}", "✓".green(), item.id.yellow());
            }
            ItemAction::Update => {
                let item = prompts::prompt_select_item(&tracker.items.list(&request_id, phase))?.clone();
                let patch = prompts::prompt_item_patch(&item)?;
                tracker.items.update(&item.id, patch)?;
                println!("{} Updated {}", "✓".green(), item.id);
            }
            ItemAction::AttachDocuments => {
                let item_id = prompts::prompt_select_item(&tracker.items.list(&request_id, phase))?
                    .id
                    .clone();
                let files = prompts::prompt_files()?;
                let documents = new_documents(user, files, today)?;
                let count = documents.len();
                tracker.items.attach_documents(&item_id, documents)?;
                println!("{} Attached {} document(s)", "✓".green(), count);
            }
            ItemAction::RemoveDocument => {
                let item = prompts::prompt_select_item(&tracker.items.list(&request_id, phase))?.clone();
                if item.documents.is_empty() {
                    println!("{}", "This item has no documents.".yellow());
                    continue;
                }
                let names: Vec<String> = item
                    .documents
                    .iter()
                    .map(|d| format!("{} ({})", d.name, d.id))
                    .collect();
                let selection = Select::new("Document to remove:", names.clone()).prompt()?;
                if let Some(index) = names.iter().position(|n| *n == selection) {
                    tracker
                        .items
                        .remove_document(&item.id, &item.documents[index].id)?;
                    println!("{} Removed {}", "✓".green(), item.documents[index].name);
                }
            }
            ItemAction::Delete => {
                let item_id = prompts::prompt_select_item(&tracker.items.list(&request_id, phase))?
                    .id
                    .clone();
                let confirm = Confirm::new(&format!("Delete {}?", item_id))
                    .with_default(false)
                    .prompt()?;
                if confirm {
                    tracker.items.delete(&item_id);
                    println!("{} Deleted {}", "✓".green(), item_id);
                }
            }
            ItemAction::Back => return Ok(()),
        }
    }
}

const ADD_PROJECT: &str = "Add ongoing project";

fn edit_report(tracker: &mut Tracker, current_month: MonthKey) -> Result<()> {
    let month = prompts::prompt_month("Report month (YYYY-MM):", current_month)?;

    let mut options: Vec<&str> = SECTIONS.to_vec();
    options.push(ADD_PROJECT);
    let choice = Select::new("Section to edit:", options).prompt()?;

    if choice == ADD_PROJECT {
        let (name, department, budget, timeline) = prompts::prompt_new_project()?;
        let mut projects = tracker.reports.get(month).projects.clone();
        let id = projects.add_ongoing(&name, &department, budget, &timeline);
        tracker.reports.save(
            month,
            MonthlyReportPatch {
                projects: Some(projects),
                ..Default::default()
            },
        );
        println!("{} Added project {} to {}", "✓".green(), id.yellow(), month.label());
        return Ok(());
    }

    let current = tracker.reports.get(month).section_yaml(choice)?;
    let edited = Editor::new(&format!("Edit {} for {}:", choice, month.label()))
        .with_predefined_text(&current)
        .with_file_extension(".yaml")
        .prompt()?;
    let patch = MonthlyReportPatch::from_section_yaml(choice, &edited)
        .with_context(|| format!("Failed to apply edited {} section", choice))?;
    tracker.reports.save(month, patch);
    println!("{} Saved {} for {}", "✓".green(), choice, month.label());

    Ok(())
}

fn export_to(tracker: &Tracker, path: &Path) -> Result<()> {
    write_snapshot(tracker, path)
        .with_context(|| format!("Failed to write snapshot to {:?}", path))?;
    println!("{} Exported snapshot to {}", "✓".green(), path.display());
    Ok(())
}

fn finish(tracker: &Tracker, export_path: Option<&Path>) -> Result<()> {
    if let Some(path) = export_path {
        return export_to(tracker, path);
    }

    let export = Confirm::new("Export a snapshot before exiting?")
        .with_default(false)
        .prompt()?;
    if export {
        let path = Text::new("Export to file (.json or .yaml):")
            .with_default("devtrack-snapshot.yaml")
            .prompt()?;
        export_to(tracker, &PathBuf::from(path))?;
    }

    Ok(())
}
