//! CLI command definitions

use crate::cli::output::{format_columns, style, CHECK, INFO, WARN};
use crate::core::config::PipelineConfig;
use crate::core::{Pipeline, ScopeInfo};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::io::Write;

/// Compile a pipeline definition
#[derive(Debug, Args, Clone)]
pub struct CompileCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Team the pipeline is installed for
    #[arg(long, default_value = "main")]
    pub team: String,

    /// Installation the pipeline is installed on
    #[arg(long, default_value = "main")]
    pub installation: String,

    /// Write the pipeline to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Validate a pipeline definition
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show the column layering of a pipeline
#[derive(Debug, Args, Clone)]
pub struct ColumnsCommand {
    /// Path to pipeline YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

fn load_pipeline(file: &str) -> Result<Pipeline> {
    let config = PipelineConfig::from_file(file).context("Failed to load pipeline config")?;
    config.to_pipeline()
}

impl CompileCommand {
    /// Compile the pipeline, writing YAML to `out` unless an output file is set
    pub fn execute<W: Write>(&self, out: &mut W) -> Result<()> {
        let pipeline = load_pipeline(&self.file)?;

        match &self.output {
            Some(path) => {
                // Compile fully before touching the file
                let mut buffer = Vec::new();
                pipeline.save(&self.team, &self.installation, &mut buffer)?;
                std::fs::write(path, buffer)
                    .with_context(|| format!("Failed to write pipeline to {}", path))?;
                eprintln!(
                    "{} Wrote {} to {}",
                    CHECK,
                    style(&pipeline.name).bold(),
                    style(path).cyan()
                );
            }
            None => pipeline.save(&self.team, &self.installation, out)?,
        }

        Ok(())
    }
}

/// Summary printed by `validate --json`
#[derive(Debug, Serialize)]
struct ValidationSummary<'a> {
    name: &'a str,
    jobs: usize,
    resources: usize,
    closure: usize,
    columns: usize,
    groups: usize,
    unused_resources: Vec<&'a str>,
}

impl ValidateCommand {
    pub fn execute<W: Write>(&self, out: &mut W) -> Result<()> {
        let config = PipelineConfig::from_file(&self.file)?;
        let pipeline = config.to_pipeline()?;
        let closure = pipeline.closure()?;
        let columns = pipeline.columns()?;
        // Group ordering and resource checks only run in a full compile
        let document = pipeline.compile(&ScopeInfo::default())?;
        let unused: Vec<&str> = pipeline
            .resources
            .iter()
            .map(|resource| resource.name.as_str())
            .filter(|name| !document.resources.iter().any(|emitted| emitted.name == *name))
            .collect();

        if self.json {
            let summary = ValidationSummary {
                name: &config.name,
                jobs: config.jobs.len(),
                resources: config.resources.len(),
                closure: closure.len(),
                columns: columns.len(),
                groups: document.groups.len(),
                unused_resources: unused,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?;
        } else {
            writeln!(out, "{} Pipeline configuration is valid!", CHECK)?;
            writeln!(out, "  Name: {}", style(&config.name).bold())?;
            writeln!(
                out,
                "  Jobs: {} ({} compiled)",
                style(config.jobs.len()).cyan(),
                closure.len()
            )?;
            writeln!(out, "  Resources: {}", style(config.resources.len()).cyan())?;
            writeln!(out, "  Columns: {}", style(columns.len()).cyan())?;
            writeln!(out, "  Groups: {}", style(document.groups.len()).cyan())?;
            for name in unused {
                let name = style(name).yellow();
                writeln!(out, "{} Resource {} is not used by any job", WARN, name)?;
            }
        }
        Ok(())
    }
}

impl ColumnsCommand {
    pub fn execute<W: Write>(&self, out: &mut W) -> Result<()> {
        let pipeline = load_pipeline(&self.file)?;
        let names = pipeline.columns()?.names();

        if self.json {
            let data = serde_json::json!({ "pipeline": pipeline.name, "columns": names });
            writeln!(out, "{}", serde_json::to_string_pretty(&data)?)?;
        } else {
            writeln!(out, "{} Columns of {}:", INFO, style(&pipeline.name).bold())?;
            write!(out, "{}", format_columns(&names))?;
        }
        Ok(())
    }
}
