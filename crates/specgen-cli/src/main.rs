use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use specgen_core::config::{self, CONFIG_FILE_NAME, FallbackMode, SpecgenConfig};
use specgen_core::drift::{self, VerifyOptions};
use specgen_core::error::{DriftError, SelectionError};
use specgen_core::spec::processor;
use specgen_core::templates::validate_templates;
use specgen_core::{AdapterRegistry, AdapterSelector};
use specgen_postprocess::{PostprocessOptions, default_transforms};
use specgen_typescript::GenerateOptions;

/// Exit code of `verify` when the spec cannot be read or parsed.
const EXIT_UNREADABLE_SPEC: u8 = 2;

#[derive(Parser)]
#[command(name = "specgen", about = "Version-aware OpenAPI model generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GenerateArgs {
    /// Path to the OpenAPI spec (JSON)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fallback when no adapter supports the spec version: strict, warn or auto
    #[arg(long)]
    fallback: Option<FallbackMode>,

    /// Directory with custom templates and a manifest.yaml
    #[arg(long)]
    template_dir: Option<PathBuf>,

    /// Generate even if the template directory is incomplete
    #[arg(long)]
    force: bool,

    /// Do not stamp checksums into the spec before generating
    #[arg(long)]
    no_stamp: bool,

    /// Skip the enum postprocessing pass
    #[arg(long)]
    no_postprocess: bool,

    /// Omit JSDoc comments
    #[arg(long)]
    no_jsdoc: bool,

    /// Run `tsc --noEmit` over the output
    #[arg(long)]
    typecheck: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate TypeScript models from an OpenAPI spec
    Generate(GenerateArgs),

    /// Print the detected version and the adapter that would be used, as JSON
    Detect {
        /// Path to the OpenAPI spec
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Fallback when no adapter supports the spec version: strict, warn or auto
        #[arg(long)]
        fallback: Option<FallbackMode>,
    },

    /// Compare the spec against its stored checksums
    Verify {
        /// Path to the OpenAPI spec
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Rewrite the stored checksums when they do not match
        #[arg(long)]
        update: bool,

        /// Report drift without failing
        #[arg(long)]
        no_fail: bool,

        /// Only check the raw checksum
        #[arg(long, conflicts_with = "processed_only")]
        raw_only: bool,

        /// Only check the processed checksum
        #[arg(long)]
        processed_only: bool,
    },

    /// Compute and store the processed checksum of a spec
    Process {
        /// Path to the OpenAPI spec
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Store both the raw and the processed checksum
        #[arg(long)]
        stamp: bool,
    },

    /// Check that a template directory has every template its manifest requires
    ValidateTemplates {
        /// Template directory (defaults to `template_dir` from the config)
        dir: Option<PathBuf>,
    },

    /// Run the enum postprocessing pass over an existing output directory
    Postprocess {
        /// Directory to rewrite (defaults to `output` from the config)
        dir: Option<PathBuf>,
    },

    /// Initialize a new specgen configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => cmd_generate(args),

        Commands::Detect { input, fallback } => cmd_detect(input, fallback),

        Commands::Verify {
            input,
            update,
            no_fail,
            raw_only,
            processed_only,
        } => {
            let options = VerifyOptions {
                fail_on_mismatch: !no_fail,
                update_on_mismatch: update,
                verify_raw_checksum: !processed_only,
                verify_processed_checksum: !raw_only,
            };
            cmd_verify(input, &options)
        }

        Commands::Process { input, stamp } => cmd_process(input, stamp),

        Commands::ValidateTemplates { dir } => cmd_validate_templates(dir),

        Commands::Postprocess { dir } => cmd_postprocess(dir),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "specgen", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Load `.specgen.yaml` from the current directory, then apply environment overrides.
fn load_config() -> Result<SpecgenConfig> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    let mut cfg = config::load_config(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?
        .unwrap_or_default();
    cfg.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(cfg)
}

fn input_or_default(input: Option<PathBuf>, cfg: &SpecgenConfig) -> PathBuf {
    input.unwrap_or_else(|| PathBuf::from(&cfg.input))
}

fn cmd_generate(args: GenerateArgs) -> Result<ExitCode> {
    let cfg = load_config()?;
    let input = input_or_default(args.input, &cfg);
    let output_dir = args.output.unwrap_or_else(|| PathBuf::from(&cfg.output));

    let selector = AdapterSelector::new(
        AdapterRegistry::default(),
        args.fallback.unwrap_or(cfg.fallback),
    );
    let decision = selector.detect_adapter(&input)?;
    for warning in &decision.warnings {
        eprintln!("warning: {warning}");
    }
    eprintln!(
        "Generating {} (OpenAPI {}) with {} → {}",
        input.display(),
        decision.version,
        decision.adapter,
        output_dir.display()
    );

    let template_dir = args
        .template_dir
        .or_else(|| cfg.template_dir.as_ref().map(PathBuf::from));
    if let Some(dir) = &template_dir {
        let validation = validate_templates(dir);
        if !validation.valid {
            let missing = validation.missing_templates.join(", ");
            if !args.force {
                anyhow::bail!(
                    "template directory {} is missing: {missing}. Use --force to generate anyway.",
                    dir.display()
                );
            }
            eprintln!("warning: template directory {} is missing: {missing}", dir.display());
        }
    }

    if cfg.checksums.stamp && !args.no_stamp {
        let checksums = processor::stamp_checksums(&input)
            .with_context(|| format!("failed to stamp checksums into {}", input.display()))?;
        eprintln!("  stamped raw checksum {}", checksums.raw_checksum);
        eprintln!("  stamped processed checksum {}", checksums.processed_checksum);
    }

    fs::create_dir_all(&output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    let options = GenerateOptions {
        template_dir,
        no_jsdoc: args.no_jsdoc,
    };
    let written = specgen_typescript::generate(decision.adapter, &input, &output_dir, &options)?;
    for path in &written {
        eprintln!("  wrote {}", path.display());
    }

    let readme_path = output_dir.join("README.md");
    fs::write(&readme_path, readme_content())
        .with_context(|| format!("failed to write {}", readme_path.display()))?;
    eprintln!("  wrote {}", readme_path.display());

    if cfg.postprocess.enabled && !args.no_postprocess {
        run_postprocess(&output_dir, &cfg)?;
    }

    eprintln!(
        "Generated {} files in {}",
        written.len() + 1, // +1 for README
        output_dir.display()
    );

    if (args.typecheck || cfg.postprocess.typecheck) && !try_run_typecheck(&output_dir) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_detect(input: Option<PathBuf>, fallback: Option<FallbackMode>) -> Result<ExitCode> {
    let cfg = load_config()?;
    let input = input_or_default(input, &cfg);
    let selector = AdapterSelector::new(AdapterRegistry::default(), fallback.unwrap_or(cfg.fallback));

    match selector.detect_adapter(&input) {
        Ok(decision) => {
            println!("{}", serde_json::to_string_pretty(&decision)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ SelectionError::NoAdapterForVersion { .. }) => {
            eprintln!("error: {err}");
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_verify(input: Option<PathBuf>, options: &VerifyOptions) -> Result<ExitCode> {
    let cfg = load_config()?;
    let input = input_or_default(input, &cfg);

    match drift::verify_spec(&input, options) {
        Ok(result) => {
            for message in &result.messages {
                eprintln!("  {message}");
            }
            match (result.has_mismatch(), options.update_on_mismatch) {
                (false, _) => eprintln!("{}: checksums verified", input.display()),
                (true, true) => eprintln!("{}: stored checksums updated", input.display()),
                (true, false) => {
                    eprintln!("warning: checksum drift detected in {}", input.display())
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ DriftError::Mismatch { .. }) => {
            eprintln!("error: {err}");
            Ok(ExitCode::FAILURE)
        }
        Err(DriftError::Spec(err)) => {
            eprintln!("error: {err}");
            Ok(ExitCode::from(EXIT_UNREADABLE_SPEC))
        }
    }
}

fn cmd_process(input: Option<PathBuf>, stamp: bool) -> Result<ExitCode> {
    let cfg = load_config()?;
    let input = input_or_default(input, &cfg);

    let summary = if stamp {
        let checksums = processor::stamp_checksums(&input)?;
        serde_json::to_value(&checksums)?
    } else {
        let outcome = processor::process(&input)?;
        serde_json::json!({
            "priorRawChecksum": outcome.prior_raw_checksum,
            "processedChecksum": outcome.processed_checksum,
        })
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_validate_templates(dir: Option<PathBuf>) -> Result<ExitCode> {
    let dir = match dir {
        Some(dir) => dir,
        None => {
            let cfg = load_config()?;
            let Some(dir) = cfg.template_dir else {
                anyhow::bail!("no template directory given and none set in {CONFIG_FILE_NAME}");
            };
            PathBuf::from(dir)
        }
    };

    let validation = validate_templates(&dir);
    println!("{}", serde_json::to_string_pretty(&validation)?);
    if validation.valid {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_postprocess(dir: Option<PathBuf>) -> Result<ExitCode> {
    let cfg = load_config()?;
    let dir = dir.unwrap_or_else(|| PathBuf::from(&cfg.output));
    run_postprocess(&dir, &cfg)?;
    Ok(ExitCode::SUCCESS)
}

fn run_postprocess(output_dir: &Path, cfg: &SpecgenConfig) -> Result<()> {
    let transforms = default_transforms(&cfg.enums);
    let options = PostprocessOptions::from(&cfg.postprocess);
    let report = specgen_postprocess::run(output_dir, &transforms, &options)
        .with_context(|| format!("failed to postprocess {}", output_dir.display()))?;

    for path in &report.files_changed {
        eprintln!("  rewrote {}", path.display());
    }
    for path in &report.support_files {
        eprintln!("  wrote {}", output_dir.join(path).display());
    }
    for path in &report.files_failed {
        eprintln!("  warning: left {} unchanged (see log)", path.display());
    }
    if report.formatted {
        eprintln!("  formatted with {}", options.formatter.join(" "));
    }
    log::info!(
        "postprocess: {} files scanned, {} changed, hits {:?}",
        report.files_scanned,
        report.files_changed.len(),
        report.hits
    );
    Ok(())
}

/// Run `tsc --noEmit` over the output. Returns false only when the type-checker ran and
/// reported errors.
fn try_run_typecheck(output_dir: &Path) -> bool {
    let mut cmd = Command::new("npx");
    cmd.args(["tsc", "--noEmit"]);
    if output_dir.join("tsconfig.json").exists() {
        cmd.args(["-p", "."]);
    } else {
        cmd.args(["--strict", "--skipLibCheck", "models/index.ts"]);
    }

    match cmd.current_dir(output_dir).output() {
        Ok(result) if result.status.success() => {
            eprintln!("  type-checked with tsc");
            true
        }
        Ok(result) => {
            eprintln!("error: tsc reported errors in {}", output_dir.display());
            eprint!("{}", String::from_utf8_lossy(&result.stdout));
            false
        }
        Err(_) => {
            eprintln!(
                "  note: tsc not found, run `npx tsc --noEmit` in {} to type-check",
                output_dir.display()
            );
            true
        }
    }
}

/// Generate the "do not edit" README.
fn readme_content() -> &'static str {
    r#"# Generated Code, Do Not Edit

This directory is **auto-generated** by specgen.
Any manual changes will be overwritten the next time `specgen generate` is run.

To regenerate, run:
```
specgen generate
```

The spec's checksums are stamped into its `x-spec-content-sha` and
`x-spec-processed-checksum` extensions. Run `specgen verify` in CI to catch drift.
"#
}

fn cmd_init(force: bool) -> Result<ExitCode> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(ExitCode::SUCCESS)
}
