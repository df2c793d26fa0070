use anyhow::Context;
use clap::Parser;
use provis_kernel::prelude::{ScopeId, ScopeTree};
use provis_logger::{
    Diagnostics, FeatureSpec, LogLevel, Logger, LoggerSettings, PartialLoggerConfig,
    feature_by_name, provide_logger,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "provis", about = "Compose logger scopes from settings and features", version)]
struct Args {
    /// Logger settings file (TOML, JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the root logger level
    #[arg(short, long)]
    level: Option<LogLevel>,

    /// Feature enabled on the root logger (repeatable)
    #[arg(short, long = "feature", value_name = "NAME")]
    features: Vec<String>,

    /// Feature enabled on a nested logger scope (repeatable)
    #[arg(long = "child-feature", value_name = "NAME")]
    child_features: Vec<String>,

    /// Show the library's own diagnostics
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _diagnostics = Diagnostics::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(if args.verbose { LogLevel::Debug } else { LogLevel::Warn })
        .init()?;

    let mut settings = match &args.config {
        Some(path) => LoggerSettings::load(path)
            .with_context(|| format!("Critical: settings file {} is malformed", path.display()))?,
        None => LoggerSettings::default(),
    };
    if args.level.is_some() {
        settings.level = args.level;
    }
    settings.features.extend(args.features.into_iter().map(FeatureSpec::Named));

    let mut tree = ScopeTree::new(settings.into_registrations()?);

    let child = if args.child_features.is_empty() {
        tree.add_scope(ScopeId::ROOT, [])?
    } else {
        let features = args
            .child_features
            .iter()
            .map(|name| feature_by_name(name))
            .collect::<Result<Vec<_>, _>>()?;
        tree.add_scope(ScopeId::ROOT, provide_logger(PartialLoggerConfig::default(), features)?)?
    };
    info!(scopes = tree.len(), "Scope tree ready");

    let root = Logger::from_scope(&tree, ScopeId::ROOT)?;
    root.info("root scope ready");
    root.debug("root scope details");

    let nested = Logger::from_scope(&tree, child)?;
    nested.info("nested scope ready");
    nested.warn("nested scope warning");

    root.flush();
    nested.flush();
    Ok(())
}
