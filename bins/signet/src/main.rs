//! signet CLI
//!
//! Resolves Android release-signing credentials from the environment and
//! `key.properties`, and hands them to Gradle.

use anyhow::Result;
use clap::{Parser, Subcommand};
use signet_android::gradle::{self, BuildType};
use signet_android::{AndroidProject, CredentialResolver, Field, ProcessEnv, Properties, SigningCredentials};
use signet_cli::output::{format_count, mask, Status};
use signet_core::config::Config;
use signet_core::error::exit_codes;
use signet_telemetry::TelemetryConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signet")]
#[command(about = "Resolve Android release-signing credentials and hand them to Gradle")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Android root project directory (overrides the config file)
    #[arg(long, global = true)]
    android_dir: Option<PathBuf>,

    /// Signing properties file, relative to the Android root unless absolute
    #[arg(long, global = true)]
    properties: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Write logs to stderr as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show each resolved credential and where it came from
    Resolve {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Print passwords instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Check that a release build has everything it needs to sign
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the Gradle injected-signing arguments, one per line
    #[command(name = "gradle-args")]
    GradleArgs {
        /// Print passwords instead of masking them
        #[arg(long)]
        reveal: bool,
    },

    /// Build through the Gradle wrapper with injected signing
    Build {
        /// Build type: debug, release
        #[arg(long, default_value = "release")]
        build_type: BuildType,
        /// Build bundle (AAB) instead of APK
        #[arg(long)]
        bundle: bool,
    },
}

impl Commands {
    /// Commands whose output is JSON also report failures as JSON
    fn json_output(&self) -> bool {
        match self {
            Commands::Resolve { json, .. } | Commands::Check { json } => *json,
            Commands::GradleArgs { .. } | Commands::Build { .. } => false,
        }
    }
}

/// Everything a command needs, assembled once from CLI flags and config
struct Context {
    project: AndroidProject,
    resolver: CredentialResolver,
    config_name: String,
    quiet: bool,
}

impl Context {
    fn new(cli: &Cli, config: &Config) -> Self {
        let mut project = AndroidProject::from_config(&config.schema.general);
        if let Some(dir) = &cli.android_dir {
            project = AndroidProject::new(dir)
                .with_app_module(&config.schema.general.app_module)
                .with_properties_file(&config.schema.general.properties_file);
        }
        if let Some(file) = &cli.properties {
            project = project.with_properties_file(file);
        }

        Self {
            project,
            resolver: CredentialResolver::from_settings(&config.schema.signing),
            config_name: config.schema.signing.config_name.clone(),
            quiet: cli.quiet,
        }
    }

    fn resolve(&self) -> signet_core::Result<(Properties, SigningCredentials)> {
        let properties = self.project.load_properties()?;
        let credentials = self.resolver.resolve(&ProcessEnv, &properties);
        Ok((properties, credentials))
    }

    fn info(&self, message: &str) {
        if !self.quiet {
            Status::info(message);
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }

    signet_telemetry::init_with_config(TelemetryConfig {
        json: cli.log_json,
        ..TelemetryConfig::from_verbosity(cli.verbose, cli.quiet)
    })?;

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(code = %e.code, "command failed");
            if cli.command.json_output() {
                println!("{}", serde_json::to_string_pretty(&e.to_report())?);
            } else {
                Status::error(&e.to_string());
            }
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> signet_core::Result<i32> {
    let config = Config::load(cli.config.as_deref())?;
    let ctx = Context::new(cli, &config);

    match &cli.command {
        Commands::Resolve { json, reveal } => run_resolve(&ctx, *json, *reveal),
        Commands::Check { json } => run_check(&ctx, *json),
        Commands::GradleArgs { reveal } => run_gradle_args(&ctx, *reveal),
        Commands::Build { build_type, bundle } => run_build(&ctx, *build_type, *bundle),
    }
}

fn shown_value(field: Field, value: Option<&str>, reveal: bool) -> Option<String> {
    value.map(|v| {
        if field.is_secret() && !reveal {
            mask(v)
        } else {
            v.to_string()
        }
    })
}

fn run_resolve(ctx: &Context, json: bool, reveal: bool) -> signet_core::Result<i32> {
    let (properties, credentials) = ctx.resolve()?;
    let store_file = signet_android::signing::materialize_store_file(
        credentials.store_file_path.as_deref(),
        &ctx.project.app_dir(),
    );

    if json {
        let fields: serde_json::Map<String, serde_json::Value> = Field::ALL
            .into_iter()
            .map(|field| {
                let entry = serde_json::json!({
                    "value": shown_value(field, credentials.value(field), reveal),
                    "source": credentials.source(field),
                });
                (field.name().to_string(), entry)
            })
            .collect();

        let report = serde_json::json!({
            "signing_config": ctx.config_name,
            "properties_file": ctx.project.properties_path(),
            "properties_loaded": properties.is_loaded(),
            "fields": fields,
            "store_file": store_file,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_codes::SUCCESS);
    }

    Status::header(&format!("Signing config '{}'", ctx.config_name));
    if properties.is_loaded() {
        ctx.info(&format!(
            "{} ({})",
            ctx.project.properties_path().display(),
            format_count(properties.len(), "entry", "entries")
        ));
    } else {
        ctx.info(&format!(
            "{} not found; using environment only",
            ctx.project.properties_path().display()
        ));
    }

    for field in Field::ALL {
        let value = shown_value(field, credentials.value(field), reveal);
        Status::field(
            field.name(),
            value.as_deref().unwrap_or("-"),
            &credentials.source(field).to_string(),
        );
    }
    if let Some(path) = store_file {
        Status::field("keystore path", &path.display().to_string(), "resolved");
    }

    Ok(exit_codes::SUCCESS)
}

fn run_check(ctx: &Context, json: bool) -> signet_core::Result<i32> {
    let (_, credentials) = ctx.resolve()?;
    let config = credentials.into_signing_config(&ctx.config_name, &ctx.project.app_dir());
    let report = config.check();
    let exit_code = if report.is_ready() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_ERROR
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(exit_code);
    }

    for field in &report.missing {
        Status::error(&format!("{} is not configured", field));
    }
    if let Some(path) = &report.store_file {
        if report.store_file_exists {
            if !ctx.quiet {
                Status::success(&format!("keystore found: {}", path.display()));
            }
        } else {
            Status::error(&format!("keystore not found: {}", path.display()));
        }
    }

    if report.is_ready() {
        if !ctx.quiet {
            Status::success(&format!("Signing config '{}' is ready", ctx.config_name));
        }
    } else {
        Status::error(&format!(
            "Signing config '{}' is incomplete ({} missing)",
            ctx.config_name,
            format_count(report.missing.len(), "field", "fields")
        ));
    }

    Ok(exit_code)
}

fn run_gradle_args(ctx: &Context, reveal: bool) -> signet_core::Result<i32> {
    let (_, credentials) = ctx.resolve()?;
    let config = credentials.into_signing_config(&ctx.config_name, &ctx.project.app_dir());
    let props = gradle::injected_properties(&config);

    if props.is_empty() && !ctx.quiet {
        Status::warning("No signing credentials configured");
    }
    for prop in &props {
        println!("{}", prop.display_arg(reveal));
    }

    Ok(exit_codes::SUCCESS)
}

fn run_build(ctx: &Context, build_type: BuildType, bundle: bool) -> signet_core::Result<i32> {
    let (_, credentials) = ctx.resolve()?;
    let config = credentials.into_signing_config(&ctx.config_name, &ctx.project.app_dir());

    if build_type == BuildType::Release && !config.check().is_ready() && !ctx.quiet {
        Status::warning("Signing config is incomplete; Gradle will decide whether that is fatal");
    }

    ctx.info(&format!(
        "Running {} in {}...",
        build_type.task(bundle),
        ctx.project.root().display()
    ));

    let code = gradle::build(ctx.project.root(), build_type, bundle, &config)?;
    if code == 0 {
        if !ctx.quiet {
            Status::success("Build succeeded");
        }
        Ok(exit_codes::SUCCESS)
    } else {
        Status::error(&format!("Gradle exited with code {}", code));
        Ok(exit_codes::FAILURE)
    }
}
