// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Kindred-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Kindred and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Kindred CLI entrypoint.
//!
//! Small maintenance commands over project archives. Logging goes to stderr and is filtered by
//! `KINDRED_LOG` (default `info`).

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use kindred::layout::{layout_family_tree, LayoutConfig, NodeMetricsTable};
use kindred::model::{Gender, Individual, IndividualId, Project};
use kindred::ops::{Command, History};
use kindred::query::kinship;
use kindred::store::{ProjectArchive, WriteDurability, DEFAULT_BACKUP_LIMIT};

const SUGGESTION_LIMIT: usize = 5;

#[derive(Parser, Debug)]
#[command(name = "kindred", about = "Inspect and edit Kindred family-tree projects", version)]
struct Cli {
    /// Backups kept per project file (0 disables rotation)
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_BACKUP_LIMIT)]
    backups: usize,

    /// Sync archive writes to disk before reporting success
    #[arg(long, global = true)]
    durable_writes: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Create an empty project archive
    New {
        file: PathBuf,
        /// Project name (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
    },
    /// Print project metadata and counts
    Info { file: PathBuf },
    /// Add one individual and save
    AddPerson {
        file: PathBuf,
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        #[arg(long, value_enum)]
        gender: Option<GenderArg>,
        #[arg(long)]
        birth_year: Option<i32>,
        #[arg(long)]
        death_year: Option<i32>,
    },
    /// Search individuals by name
    Search { file: PathBuf, query: String },
    /// Print ancestors and descendants of an individual
    Relatives { file: PathBuf, id: String },
    /// Compute the family-tree layout and print its bounds
    Layout {
        file: PathBuf,
        /// Store positions for nodes that have none and save
        #[arg(long)]
        store: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GenderArg {
    Male,
    Female,
    Unknown,
}

impl From<GenderArg> for Gender {
    fn from(value: GenderArg) -> Self {
        match value {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
            GenderArg::Unknown => Gender::Unknown,
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("KINDRED_LOG", "info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let durability =
        if cli.durable_writes { WriteDurability::Durable } else { WriteDurability::BestEffort };
    let archive = ProjectArchive::new().with_backup_limit(cli.backups).with_durability(durability);

    match cli.command {
        CliCommand::New { file, name } => {
            if file.exists() {
                return Err(format!("{} already exists", file.display()).into());
            }
            let name = name.unwrap_or_else(|| file_stem(&file));
            let mut project = Project::new(name);
            archive.save(&file, &mut project)?;
            println!("created {}", file.display());
        }
        CliCommand::Info { file } => {
            let project = open(&archive, &file)?;
            let metadata = project.metadata();
            let data = project.document().data();
            println!("name: {}", metadata.name());
            println!("format version: {}", metadata.format_version());
            println!("created at: {}", metadata.created_at());
            println!("modified at: {}", metadata.modified_at());
            println!("individuals: {}", data.individuals().len());
            println!("families: {}", data.families().len());
            println!("tags: {}", data.tags().len());
            println!("sources: {}", data.sources().len());
            println!("stored positions: {}", project.layout().positions().len());
        }
        CliCommand::AddPerson { file, first, last, gender, birth_year, death_year } => {
            let mut project = open(&archive, &file)?;
            let individual_id = project.document().next_individual_id();
            let mut individual = Individual::new(individual_id.clone(), first, last);
            individual.set_gender(gender.map(Gender::from));
            individual.set_birth_year(birth_year);
            individual.set_death_year(death_year);

            History::new().execute(&mut project, Command::AddIndividual { individual })?;
            archive.save(&file, &mut project)?;
            println!("{individual_id}");
        }
        CliCommand::Search { file, query } => {
            let project = open(&archive, &file)?;
            let document = project.document();
            let hits = document.search(&query);
            for individual in &hits {
                println!("{}\t{}", individual.individual_id(), individual.display_name());
            }
            if hits.is_empty() {
                let suggestions = document.name_index().suggest(&query, SUGGESTION_LIMIT);
                for (individual_id, score) in suggestions {
                    if let Some(individual) = document.individual(&individual_id) {
                        println!(
                            "did you mean {}\t{} ({score:.0})",
                            individual_id,
                            individual.display_name()
                        );
                    }
                }
            }
        }
        CliCommand::Relatives { file, id } => {
            let project = open(&archive, &file)?;
            let data = project.document().data();
            let individual_id = IndividualId::new(id)?;
            if !data.individuals().contains_key(&individual_id) {
                return Err(format!("unknown individual {individual_id}").into());
            }
            for (ancestor, generation) in kinship::ancestors(data, &individual_id) {
                println!("ancestor\t{generation}\t{ancestor}");
            }
            for (descendant, generation) in kinship::descendants(data, &individual_id) {
                println!("descendant\t{generation}\t{descendant}");
            }
        }
        CliCommand::Layout { file, store } => {
            let mut project = open(&archive, &file)?;
            let computed = layout_family_tree(
                project.document().data(),
                &LayoutConfig::default(),
                &NodeMetricsTable::new(),
            );
            println!("nodes: {}", computed.len());
            println!("generations: {}", computed.layers().len());
            if let Some(bounds) = computed.bounds() {
                println!(
                    "bounds: x {}..{} y {}..{} ({}x{})",
                    bounds.min_x,
                    bounds.max_x,
                    bounds.min_y,
                    bounds.max_y,
                    bounds.width(),
                    bounds.height()
                );
            }
            if store {
                let added = computed.fill_into(project.layout_mut());
                archive.save(&file, &mut project)?;
                println!("stored {added} new positions");
            }
        }
    }
    Ok(())
}

fn open(archive: &ProjectArchive, file: &Path) -> Result<Project, Box<dyn Error>> {
    let opened = archive.open(file)?;
    for issue in &opened.issues {
        eprintln!("warning: {issue}");
    }
    Ok(opened.project)
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_owned())
}
