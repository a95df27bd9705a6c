use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Route Metadata Compiler - Generate route registrations and diagnostics from endpoint declarations
#[derive(Parser, Debug)]
#[command(name = "routegen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Rust project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Report format (text, yaml, or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Report file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Write the generated registration source to this file
    #[arg(short = 'g', long = "generated", value_name = "FILE")]
    pub generated_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Report format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one line per route and per diagnostic
    Text,
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!(
            "Project path does not exist: {}",
            args.project_path.display()
        );
    }

    if !args.project_path.is_dir() {
        anyhow::bail!(
            "Project path is not a directory: {}",
            args.project_path.display()
        );
    }

    info!("Project path: {}", args.project_path.display());
    info!("Report format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Report file: {}", output.display());
    } else {
        info!("Report: stdout");
    }
    if let Some(ref generated) = args.generated_path {
        info!("Generated source file: {}", generated.display());
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::cancel::CancelToken;
    use crate::diagnostics::Severity;
    use crate::pipeline::Pipeline;
    use crate::serializer::{
        build_report, serialize_json, serialize_text, serialize_yaml, write_to_file,
    };

    info!("Starting route metadata compilation...");
    info!("Project path: {}", args.project_path.display());

    // Step 1: Run the pipeline over the project
    let pipeline = Pipeline::new();
    let output = pipeline.run(&args.project_path, &CancelToken::new())?;

    if output.stats.files_scanned == 0 {
        anyhow::bail!("No Rust files found in the project directory");
    }

    // Step 2: Surface diagnostics through the logger
    for diagnostic in output.resolved.diagnostics.iter() {
        match diagnostic.severity() {
            Severity::Error => log::error!("{}", diagnostic),
            Severity::Warning => log::warn!("{}", diagnostic),
        }
    }

    // Step 3: Serialize the report to the requested format
    info!("Serializing report to {:?} format...", args.output_format);
    let report = build_report(&output.resolved);
    let content = match args.output_format {
        OutputFormat::Text => serialize_text(&report),
        OutputFormat::Yaml => serialize_yaml(&report)?,
        OutputFormat::Json => serialize_json(&report)?,
    };

    // Step 4: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing report to: {}", output_path.display());
        write_to_file(&content, output_path)?;
        info!("Successfully wrote report to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    // Step 5: Write the generated registration source when requested
    if let Some(generated_path) = &args.generated_path {
        info!("Writing generated source to: {}", generated_path.display());
        write_to_file(&output.generated.combined(), generated_path)?;
        info!(
            "Successfully wrote generated source to {}",
            generated_path.display()
        );
    }

    // Step 6: Display summary
    info!("Compilation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", output.stats.files_scanned);
    info!("  - Files reused from cache: {}", output.stats.files_reused);
    info!("  - Routes generated: {}", output.resolved.endpoints.len());
    info!("  - Groups mounted: {}", output.resolved.groups.len());
    info!(
        "  - Diagnostics: {} error(s), {} warning(s)",
        output.resolved.diagnostics.error_count(),
        output.resolved.diagnostics.warning_count()
    );

    let errors = output.resolved.diagnostics.error_count();
    if errors > 0 {
        anyhow::bail!("Analysis reported {} error(s); see the log above", errors);
    }

    Ok(())
}
