//! Model repository CLI
//!
//! Resolve, validate, import and index DTMI-addressed model repositories.
//!
//! Exit codes: 0 success, 1 invalid arguments, 3 resolution error,
//! 4 validation error, 5 processing error. Code 2 is reserved for the
//! external DTDL grammar validator.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use models_repository::{
    build_index, convention, metadata, DependencyResolution, Dtmi, RepoConfig, RepositoryClient,
    RepositoryLocation, ResolverError, StrictValidator,
};

#[derive(Parser)]
#[command(name = "dmr")]
#[command(about = "Resolve, validate, import and index DTMI model repositories")]
struct Cli {
    /// Path to a config file (otherwise dmr.toml and DMR_* environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a model and its dependency closure to a JSON array
    Export {
        /// DTMI to resolve
        #[arg(long)]
        dtmi: Option<String>,

        /// Model file whose root id is resolved instead of --dtmi
        #[arg(long)]
        model_file: Option<PathBuf>,

        /// Repository directory or base URL
        #[arg(long)]
        repo: Option<String>,

        /// Dependency handling
        #[arg(long, value_enum)]
        deps: Option<DepsArg>,

        /// Also write the result to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a model file against a repository
    Validate {
        /// Model file to validate
        model_file: PathBuf,

        /// Repository directory or base URL
        #[arg(long)]
        repo: Option<String>,

        /// Dependency handling
        #[arg(long, value_enum)]
        deps: Option<DepsArg>,

        /// Enforce namespace, reserved-word and path conventions
        #[arg(long)]
        strict: bool,
    },

    /// Import models from a file into a local repository
    Import {
        /// Model file to import (single model or array of models)
        model_file: PathBuf,

        /// Local repository directory
        #[arg(long, default_value = ".")]
        local_repo: PathBuf,

        /// Enforce namespace conformance before importing
        #[arg(long)]
        strict: bool,
    },

    /// Build a paged index for a local repository
    Index {
        /// Local repository directory
        local_repo: PathBuf,

        /// Path of the first index page (default: <repo>/index.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum entries per page
        #[arg(long)]
        page_limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DepsArg {
    Disabled,
    Enabled,
    FromExpanded,
}

impl From<DepsArg> for DependencyResolution {
    fn from(value: DepsArg) -> Self {
        match value {
            DepsArg::Disabled => Self::Disabled,
            DepsArg::Enabled => Self::Enabled,
            DepsArg::FromExpanded => Self::FromExpanded,
        }
    }
}

enum CliError {
    Usage(String),
    Resolver(ResolverError),
}

impl From<ResolverError> for CliError {
    fn from(err: ResolverError) -> Self {
        Self::Resolver(err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "{}", msg),
            Self::Resolver(err) => write!(f, "{}", err),
        }
    }
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 1,
            Self::Resolver(err) => match err {
                ResolverError::NamespaceViolation { .. }
                | ResolverError::ReservedWordViolation { .. }
                | ResolverError::PathConventionViolation { .. }
                | ResolverError::StrictModeArrayInput => 4,
                ResolverError::ProcessingError { .. } => 5,
                _ => 3,
            },
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = RepoConfig::load_from(cli.config.as_deref())
        .map_err(|e| CliError::Usage(format!("invalid configuration: {}", e)))?;

    match cli.command {
        Commands::Export {
            dtmi,
            model_file,
            repo,
            deps,
            output,
        } => export(&config, dtmi, model_file, repo, deps, output),
        Commands::Validate {
            model_file,
            repo,
            deps,
            strict,
        } => validate(&config, &model_file, repo, deps, strict),
        Commands::Import {
            model_file,
            local_repo,
            strict,
        } => import(&config, &model_file, &local_repo, strict),
        Commands::Index {
            local_repo,
            output,
            page_limit,
        } => index(&config, &local_repo, output, page_limit),
    }
}

fn export(
    config: &RepoConfig,
    dtmi: Option<String>,
    model_file: Option<PathBuf>,
    repo: Option<String>,
    deps: Option<DepsArg>,
    output: Option<PathBuf>,
) -> Result<(), CliError> {
    let dtmi = match (dtmi, model_file) {
        (Some(dtmi), _) => dtmi,
        (None, Some(file)) => {
            let content = read_model_file(&file)?;
            metadata::get_root_id(&content)?
        }
        (None, None) => {
            return Err(CliError::Usage(
                "please specify a value for --dtmi or --model-file".to_string(),
            ))
        }
    };

    let client = client_for(config, repo, deps);
    let resolved = client.resolve(&[dtmi.as_str()])?;

    // Render the result map as a JSON array of model objects.
    let models = resolved
        .values()
        .map(|definition| serde_json::from_str::<serde_json::Value>(definition))
        .collect::<Result<Vec<_>, _>>()
        .map_err(ResolverError::from)?;
    let payload =
        serde_json::to_string_pretty(&models).map_err(ResolverError::from)?;

    println!("{}", payload);
    if let Some(path) = output {
        fs::write(&path, &payload).map_err(ResolverError::from)?;
        info!(path = %path.display(), "export written");
    }

    Ok(())
}

fn validate(
    config: &RepoConfig,
    model_file: &Path,
    repo: Option<String>,
    deps: Option<DepsArg>,
    strict: bool,
) -> Result<(), CliError> {
    let content = read_model_file(model_file)?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| CliError::Usage(format!("invalid JSON in {}: {}", model_file.display(), e)))?;

    if strict && value.is_array() {
        return Err(ResolverError::StrictModeArrayInput.into());
    }

    let client = client_for(config, repo, deps);

    for model in extract_models(&content, &value)? {
        let meta = metadata::extract(&model)?;
        Dtmi::new(meta.id.as_str())?;
        println!("- Validating model \"{}\"...", meta.id);

        if client.resolution() != DependencyResolution::Disabled && !meta.dependencies.is_empty() {
            println!("- Resolving {} dependencies...", meta.dependencies.len());
            let refs: Vec<&str> = meta.dependencies.iter().map(String::as_str).collect();
            client.resolve(&refs)?;
        }
    }

    if strict {
        let validator = StrictValidator::new(&config.validation.reserved_words);

        println!("- Ensuring ids conform to the root namespace...");
        validator.ensure_namespace(&content)?;

        println!("- Scanning ids for reserved words...");
        validator.scan_reserved_words(&content)?;

        if let Some(root) = client.location().as_local_dir() {
            println!("- Ensuring model file path adheres to conventions...");
            let file = fs::canonicalize(model_file).map_err(ResolverError::from)?;
            let root = fs::canonicalize(root).map_err(ResolverError::from)?;
            validator.ensure_path_convention(&content, &file, &root)?;
        }
    }

    println!("Validation passed for {}", model_file.display());
    Ok(())
}

fn import(
    config: &RepoConfig,
    model_file: &Path,
    local_repo: &Path,
    strict: bool,
) -> Result<(), CliError> {
    let content = read_model_file(model_file)?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| CliError::Usage(format!("invalid JSON in {}: {}", model_file.display(), e)))?;

    if strict {
        if value.is_array() {
            return Err(ResolverError::StrictModeArrayInput.into());
        }
        let validator = StrictValidator::new(&config.validation.reserved_words);
        validator.ensure_namespace(&content)?;
    }

    for model in extract_models(&content, &value)? {
        import_model(&model, local_repo)?;
    }

    Ok(())
}

fn import_model(content: &str, repo: &Path) -> Result<(), CliError> {
    let root_id = metadata::get_root_id(content)?;
    let dtmi = Dtmi::new(root_id)?;

    let target = convention::dtmi_to_qualified_path(&dtmi, &repo.display().to_string(), false);
    let target = Path::new(&target);
    if target.exists() {
        println!(
            "- Skipping \"{}\". Model file already exists in repository.",
            dtmi
        );
        return Ok(());
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(ResolverError::from)?;
    }
    fs::write(target, content).map_err(ResolverError::from)?;
    println!("- Imported model \"{}\".", dtmi);
    Ok(())
}

fn index(
    config: &RepoConfig,
    local_repo: &Path,
    output: Option<PathBuf>,
    page_limit: Option<usize>,
) -> Result<(), CliError> {
    if !local_repo.is_dir() {
        return Err(CliError::Usage(format!(
            "{} is not a directory",
            local_repo.display()
        )));
    }

    let first_page = output.unwrap_or_else(|| local_repo.join("index.json"));
    let limit = page_limit.unwrap_or(config.index.page_limit);
    if limit == 0 {
        return Err(CliError::Usage("--page-limit must be at least 1".to_string()));
    }

    let stats = build_index(local_repo, &first_page, limit)?;
    println!(
        "Indexed {} models across {} page(s), first page at {}",
        stats.models,
        stats.pages,
        first_page.display()
    );
    Ok(())
}

fn client_for(config: &RepoConfig, repo: Option<String>, deps: Option<DepsArg>) -> RepositoryClient {
    let location = RepositoryLocation::parse(
        repo.as_deref().unwrap_or(config.repository.location.as_str()),
    );
    let resolution = deps
        .map(DependencyResolution::from)
        .unwrap_or(config.resolution.dependencies);
    RepositoryClient::new(location, resolution)
}

fn read_model_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path)
        .map_err(|e| CliError::Usage(format!("cannot read {}: {}", path.display(), e)))
}

/// A model file holds either a single model object or an array of models;
/// arrays are flattened to their serialized members.
fn extract_models(content: &str, value: &serde_json::Value) -> Result<Vec<String>, CliError> {
    match value {
        serde_json::Value::Array(members) => members
            .iter()
            .map(|member| {
                serde_json::to_string_pretty(member)
                    .map_err(|e| CliError::Resolver(ResolverError::from(e)))
            })
            .collect(),
        _ => Ok(vec![content.to_string()]),
    }
}
