//! CLI: resolve the attributes of one principal against a JSON resolver configuration.
//!
//! Usage: `resolve_attributes --config <resolver.json> --principal <name> [--attribute <id>]...`
//!
//! Prints the released attributes as pretty JSON on stdout. Logs go to stderr;
//! set RUST_LOG=attribute_resolver=trace for span enter/exit and per-plugin events.

use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::process;

use attribute_resolver::{ResolutionContext, ResolverConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

/// Resolve identity attributes for a principal.
#[derive(Parser, Debug)]
#[command(name = "resolve_attributes")]
#[command(
  after_help = r#"Environment variables (override --config and --principal when set):
  ATTRIBUTE_RESOLVER_CONFIG     Path to the resolver configuration (JSON).
  ATTRIBUTE_RESOLVER_PRINCIPAL  Principal to resolve attributes for.

Examples:
  resolve_attributes --config resolver.json --principal alice
  resolve_attributes --config resolver.json --principal alice --attribute mail --attribute eppn"#
)]
struct Args {
  /// Resolver configuration file. Overridden by ATTRIBUTE_RESOLVER_CONFIG if set.
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Principal name. Overridden by ATTRIBUTE_RESOLVER_PRINCIPAL if set.
  #[arg(long, value_name = "NAME")]
  principal: Option<String>,

  /// Issuer (identity provider) entity id.
  #[arg(long, value_name = "ENTITY_ID")]
  issuer: Option<String>,

  /// Recipient (relying party) entity id.
  #[arg(long, value_name = "ENTITY_ID")]
  recipient: Option<String>,

  /// Attribute id to resolve; repeat for several. Resolves everything when omitted.
  #[arg(long = "attribute", value_name = "ID")]
  attributes: Vec<String>,
}

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Env vars override flags.
  let config_path = env::var("ATTRIBUTE_RESOLVER_CONFIG")
    .ok()
    .map(PathBuf::from)
    .or_else(|| args.config.clone());
  let principal = env::var("ATTRIBUTE_RESOLVER_PRINCIPAL")
    .ok()
    .or_else(|| args.principal.clone());

  let Some(config_path) = config_path else {
    eprintln!("Error: no configuration given (use --config or ATTRIBUTE_RESOLVER_CONFIG)");
    process::exit(1);
  };
  info!(config = %config_path.display(), principal = ?principal, "resolve_attributes starting");

  let config = match ResolverConfig::load(&config_path) {
    Ok(c) => c,
    Err(e) => {
      eprintln!("Error loading {}: {}", config_path.display(), e);
      process::exit(1);
    }
  };

  let resolver = match config.build() {
    Ok(r) => r,
    Err(e) => {
      eprintln!("Configuration error: {}", e);
      process::exit(1);
    }
  };

  let mut context = match principal {
    Some(p) => ResolutionContext::new(p),
    None => ResolutionContext::anonymous(),
  }
  .with_requested_attributes(args.attributes);
  if let Some(issuer) = args.issuer {
    context = context.with_issuer(issuer);
  }
  if let Some(recipient) = args.recipient {
    context = context.with_recipient(recipient);
  }

  if let Err(e) = resolver.resolve_attributes(&mut context).await {
    eprintln!("Resolution error: {}", e);
    process::exit(1);
  }

  match serde_json::to_string_pretty(&context.resolved_attributes) {
    Ok(json) => println!("{}", json),
    Err(e) => {
      eprintln!("Error encoding attributes: {}", e);
      process::exit(1);
    }
  }
}
