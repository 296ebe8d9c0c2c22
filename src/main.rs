// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus CLI entrypoint.
//!
//! Reads a workspace directory in either layout and reports on it, rewrites it in the current
//! layout, or packs it into a zip archive.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use proteus::store::{LoadedWorkspace, SaveLayout, SaveMode, SaveOutcome, WriteDurability};
use proteus::{EngineConfig, WorkspaceFolder};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Load, migrate and save multi-domain data-model workspaces",
    after_help = "Examples:\n  proteus inspect ./acme\n  proteus migrate ./legacy/acme ./acme\n  proteus pack ./acme --out acme.zip"
)]
struct Cli {
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vvv reaches trace)")]
    verbose: u8,
    #[arg(long, value_parser = clap::value_parser!(PathBuf), help = "Engine config file (YAML)")]
    config: Option<PathBuf>,
    #[arg(long, help = "fsync files before renaming them into place")]
    durable_writes: bool,
    #[arg(long, value_enum, help = "Save layout (overrides the config file)")]
    layout: Option<LayoutArg>,
    #[arg(long, help = "Leave unmatched tables unassigned instead of using the only system")]
    no_fallback: bool,
    #[arg(long, help = "Do not write README.md")]
    no_readme: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Load a workspace and print what was found")]
    Inspect {
        dir: PathBuf,
        #[arg(long, help = "Print the workspace and load report as JSON")]
        json: bool,
    },
    #[command(about = "Load a workspace and save it to another directory")]
    Migrate { src: PathBuf, dest: PathBuf },
    #[command(about = "Load a workspace and save it back in place")]
    Resave { dir: PathBuf },
    #[command(about = "Load a workspace and write it as a zip archive")]
    Pack {
        dir: PathBuf,
        #[arg(long, short)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LayoutArg {
    Structured,
    Compact,
}

impl From<LayoutArg> for SaveLayout {
    fn from(value: LayoutArg) -> Self {
        match value {
            LayoutArg::Structured => Self::Structured,
            LayoutArg::Compact => Self::Compact,
        }
    }
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::default(),
    };
    if cli.durable_writes {
        config = config.with_durability(WriteDurability::Durable);
    }
    if let Some(layout) = cli.layout {
        config = config.with_layout(layout.into());
    }
    if cli.no_fallback {
        config = config.with_fallback_linkage(false);
    }
    if cli.no_readme {
        config = config.with_readme(false);
    }
    Ok(config)
}

async fn load(folder: &WorkspaceFolder, dir: &Path) -> Result<LoadedWorkspace> {
    let loaded = folder
        .load(&folder.open_fs(dir))
        .await
        .with_context(|| format!("cannot load workspace from {}", dir.display()))?;
    for issue in &loaded.report.issues {
        eprintln!("warning: {issue}");
    }
    Ok(loaded)
}

async fn save(folder: &WorkspaceFolder, loaded: &LoadedWorkspace, dest: &Path) -> Result<()> {
    let outcome = folder
        .save(&loaded.workspace, &folder.open_fs(dest), SaveMode::Manual)
        .await
        .with_context(|| format!("cannot save workspace to {}", dest.display()))?;
    let SaveOutcome::Saved(report) = outcome else {
        bail!("save to {} did not run: {outcome:?}", dest.display());
    };
    for path in &report.failed_deletions {
        eprintln!("warning: stale file not deleted: {path}");
    }
    for path in &report.failed_listings {
        eprintln!("warning: directory not listed: {path}");
    }
    println!(
        "saved {} to {} ({} written, {} deleted)",
        loaded.workspace.name,
        dest.display(),
        report.written,
        report.deleted.len()
    );
    Ok(())
}

fn print_summary(loaded: &LoadedWorkspace) {
    let workspace = &loaded.workspace;
    println!("{} ({})", workspace.name, workspace.id);
    println!("layout: {}", loaded.report.layout);
    for domain in &workspace.domains {
        let tables = workspace
            .tables
            .iter()
            .filter(|table| table.primary_domain_id == domain.id)
            .count();
        println!(
            "  {}: {} systems, {} tables",
            domain.name,
            domain.systems.len(),
            tables
        );
    }
    println!("relationships: {}", workspace.relationships.len());
    println!(
        "files read: {}, issues: {}",
        loaded.report.files_read,
        loaded.report.issues.len()
    );
}

async fn run(cli: Cli) -> Result<()> {
    let folder = WorkspaceFolder::new(engine_config(&cli)?);

    match &cli.command {
        Command::Inspect { dir, json } => {
            let loaded = load(&folder, dir).await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&loaded)?);
            } else {
                print_summary(&loaded);
            }
        }
        Command::Migrate { src, dest } => {
            let loaded = load(&folder, src).await?;
            save(&folder, &loaded, dest).await?;
        }
        Command::Resave { dir } => {
            let loaded = load(&folder, dir).await?;
            save(&folder, &loaded, dir).await?;
        }
        Command::Pack { dir, out } => {
            let loaded = load(&folder, dir).await?;
            let bytes = folder.export_archive(&loaded.workspace)?;
            tokio::fs::write(out, &bytes)
                .await
                .with_context(|| format!("cannot write {}", out.display()))?;
            println!("packed {} into {} ({} bytes)", loaded.workspace.name, out.display(), bytes.len());
        }
    }
    Ok(())
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    proteus::logging::init(cli.verbose);

    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::ExitCode::FAILURE
        }
    }
}
