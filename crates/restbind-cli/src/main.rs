//! restbind CLI entrypoint
//! Parses command-line arguments and dispatches described operations.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use restbind_core::{
    ApiClient, ApiDescription, ApiManifest, CallArg, Config, DryRunTransport, HttpTransport,
    NewTodo, TodoApi,
};
use serde_json::Value as JsonValue;
use url::Url;

#[derive(Parser)]
#[command(name = "restbind")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML, JSON or TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Base URL of the API; overrides the configuration file
    #[arg(long, global = true)]
    base_url: Option<Url>,
    /// Bearer token; overrides the configuration file
    #[arg(long, global = true)]
    token: Option<String>,
    /// API manifest used by `call` and `describe` instead of the Todo API
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,
    /// Print the resolved request instead of sending it
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// List todos
    List {
        /// Only todos with this completion state
        #[arg(long)]
        done: Option<bool>,
    },
    /// Fetch one todo
    Get { id: String },
    /// Create a todo
    Create { name: String },
    /// Mark a todo as done
    Done { id: String },
    /// Delete a todo
    Delete { id: String },
    /// Call any described operation
    ///
    /// Arguments fill the non-transport positions in order. Each one is
    /// parsed as JSON and falls back to a plain string.
    /// Example: restbind --manifest api.yaml call todo 42
    Call {
        operation: String,
        args: Vec<String>,
    },
    /// Print the API description as a YAML manifest
    Describe,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config = load_config(&cli).await?;
    let todo_api = TodoApi::new().context("Failed to describe the Todo API")?;
    let manifest_api = match &cli.manifest {
        Some(path) => {
            let policy = config
                .as_ref()
                .map(|c| c.unresolved_tokens)
                .unwrap_or_default();
            let manifest = ApiManifest::from_file(path)
                .await
                .with_context(|| format!("Failed to load manifest {}", path.display()))?;
            Some(manifest.into_description(policy)?)
        }
        None => None,
    };
    let description = manifest_api
        .as_ref()
        .unwrap_or_else(|| todo_api.description());

    if let Commands::Describe = cli.command {
        print!("{}", ApiManifest::from_description(description).to_yaml()?);
        return Ok(());
    }

    if cli.dry_run {
        let request = dispatch(&todo_api, description, &cli.command, &DryRunTransport)?;
        println!("{}", request);
        return Ok(());
    }

    let config = config.context("Either --config or --base-url is required")?;
    let client = ApiClient::new(&config)?;
    tracing::info!(base_url = %config.base_url, "sending request");
    let value = dispatch(&todo_api, description, &cli.command, &client)?
        .await
        .context("Request failed")?;
    if !value.is_null() {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

/// Configuration file merged with command-line overrides. `None` when no
/// base URL is known.
async fn load_config(cli: &Cli) -> anyhow::Result<Option<Config>> {
    let mut config = match &cli.config {
        Some(path) => Some(
            Config::from_file(path)
                .await
                .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        ),
        None => cli.base_url.clone().map(Config::new),
    };
    if let Some(config) = config.as_mut() {
        if let Some(base_url) = &cli.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(token) = &cli.token {
            config.bearer_token = Some(token.clone());
        }
    }
    Ok(config)
}

fn dispatch<T: HttpTransport>(
    todo: &TodoApi,
    description: &ApiDescription,
    command: &Commands,
    transport: &T,
) -> restbind_core::Result<T::Output> {
    match command {
        Commands::List { done } => todo.list(transport, *done),
        Commands::Get { id } => todo.todo(transport, id),
        Commands::Create { name } => todo.create(transport, &NewTodo { name: name.clone() }),
        Commands::Done { id } => todo.done(transport, id),
        Commands::Delete { id } => todo.delete(transport, id),
        Commands::Call { operation, args } => {
            let dispatcher = description.operation(operation)?;
            let transport_position = dispatcher.bindings()?.transport_position;
            let values = args.iter().map(|a| parse_arg(a)).collect();
            dispatcher.invoke(&call_args(transport, transport_position, values))
        }
        Commands::Describe => Err(restbind_core::Error::config(
            "describe does not dispatch a request",
        )),
    }
}

fn parse_arg(raw: &str) -> JsonValue {
    serde_json::from_str(raw).unwrap_or_else(|_| JsonValue::String(raw.to_string()))
}

/// Place `transport` at its bound position and the values around it,
/// padding with nulls when the position lies past the last value.
fn call_args<T: ?Sized>(
    transport: &T,
    transport_position: Option<usize>,
    values: Vec<JsonValue>,
) -> Vec<CallArg<'_, T>> {
    let mut args: Vec<CallArg<'_, T>> = values.into_iter().map(CallArg::Value).collect();
    if let Some(position) = transport_position {
        while args.len() < position {
            args.push(CallArg::null());
        }
        args.insert(position, CallArg::Transport(transport));
    }
    args
}
