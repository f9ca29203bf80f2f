//! Command handlers
//!
//! Each handler builds on the same [`Context`]: an `Extension` wired to the
//! chosen secret store, a file-backed settings provider and a stderr logger.
//! Command output goes to stdout; logs and notifications go to stderr.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context as _, Result};
use serde_json::{Map, Value};

use testrail_mcp_core::config::{ConfigLevel, FileSettingsProvider, SettingsProvider};
use testrail_mcp_core::facade::ERROR_PREFIX;
use testrail_mcp_core::logging::{file_logger, log_file_path, ConsoleLogger, SharedLogger};
use testrail_mcp_core::router::action_table;
use testrail_mcp_core::{
    create_secret_store, list_secret_stores, tool_input_schema, validate_api_key,
    validate_username, CancellationToken, ChildProcessLauncher, ConnectionStatus,
    CredentialStore, Extension, LogNotifier, SECRET_KEY_API_KEY, SECRET_KEY_USERNAME,
};

use crate::parser::{Cli, Commands};
use crate::prompt::TerminalPrompter;

/// Everything a command needs, built once from the global flags
pub struct Context {
    pub extension: Extension,
    pub credentials: Arc<CredentialStore>,
    pub settings: Arc<FileSettingsProvider>,
    pub store_name: String,
}

impl Context {
    pub async fn from_cli(cli: &Cli) -> Result<Self> {
        let secrets = create_secret_store(&cli.secrets).ok_or_else(|| {
            let known: Vec<_> = list_secret_stores().into_iter().map(|(name, _)| name).collect();
            anyhow!(
                "Unknown secret store '{}' (available: {})",
                cli.secrets,
                known.join(", ")
            )
        })?;

        let settings = Arc::new(match &cli.config {
            Some(path) => FileSettingsProvider::new(path.clone(), ConfigLevel::User),
            None => FileSettingsProvider::user(),
        });

        let console = Arc::new(ConsoleLogger::new());
        let debug = settings
            .get_settings()
            .await
            .map(|s| s.debug)
            .unwrap_or(false);
        console.set_verbose(cli.verbose || debug);
        let logger: SharedLogger = console;

        let credentials = Arc::new(CredentialStore::new(
            secrets,
            settings.clone(),
            logger.clone(),
        ));
        let extension = Extension::new(
            credentials.clone(),
            ChildProcessLauncher::shared(logger.clone()),
            Arc::new(LogNotifier::new(logger.clone())),
            logger,
        );

        Ok(Self {
            extension,
            credentials,
            settings,
            store_name: cli.secrets.clone(),
        })
    }
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    // These two never touch secrets or settings
    match &cli.command {
        Commands::Schema => return handle_schema(),
        Commands::Actions => {
            handle_actions();
            return Ok(());
        }
        _ => {}
    }

    let ctx = Context::from_cli(&cli).await?;
    match cli.command {
        Commands::Configure {
            url,
            username,
            api_key,
        } => handle_configure(&ctx, url, username, api_key).await,
        Commands::ClearCredentials => handle_clear_credentials(&ctx),
        Commands::TestConnection => handle_test_connection(&ctx).await,
        Commands::Tools { json } => handle_tools(&ctx, json).await,
        Commands::Invoke {
            action,
            params,
            json,
        } => handle_invoke(&ctx, action, params, json).await,
        Commands::Status => handle_status(&ctx).await,
        Commands::Schema | Commands::Actions => Ok(()),
    }
}

async fn handle_configure(
    ctx: &Context,
    url: Option<String>,
    username: Option<String>,
    api_key: Option<String>,
) -> Result<()> {
    if prompts_for_credentials(&url, &username, &api_key) {
        let prompter = TerminalPrompter::new();
        let configured = ctx.extension.configure_credentials(&prompter).await?;
        if !configured {
            println!("Configuration cancelled");
            ctx.extension.deactivate().await;
            return Ok(());
        }
    } else {
        if let Some(url) = &url {
            ctx.credentials.set_server_url(url).await?;
        }
        match (username, api_key) {
            (Some(username), Some(api_key)) => {
                validate_username(&username).map_err(|msg| anyhow!(msg))?;
                validate_api_key(&api_key).map_err(|msg| anyhow!(msg))?;
                ctx.credentials.set(&username, &api_key)?;
            }
            (None, None) => {}
            _ => bail!("--username and --api-key must be given together"),
        }
        ctx.extension.reconnect().await;
    }

    let connected = ctx.extension.status() == ConnectionStatus::Connected;
    ctx.extension.deactivate().await;

    if connected {
        println!("Configured and connected");
        Ok(())
    } else if ctx.credentials.is_configured().await {
        bail!("Credentials saved, but connecting to the worker failed")
    } else {
        println!("Saved; server URL, username and API key are all needed to connect");
        Ok(())
    }
}

/// `configure` with no flags at all walks through the prompts
fn prompts_for_credentials(
    url: &Option<String>,
    username: &Option<String>,
    api_key: &Option<String>,
) -> bool {
    url.is_none() && username.is_none() && api_key.is_none()
}

fn handle_clear_credentials(ctx: &Context) -> Result<()> {
    ctx.credentials.clear()?;
    println!("Credentials cleared from '{}'", ctx.store_name);
    Ok(())
}

async fn handle_test_connection(ctx: &Context) -> Result<()> {
    ctx.extension.activate().await;
    let ok = ctx.extension.test_connection().await;
    ctx.extension.deactivate().await;

    if !ok {
        bail!("Connection test failed");
    }
    println!("Connection test successful");
    Ok(())
}

async fn handle_tools(ctx: &Context, json: bool) -> Result<()> {
    ctx.extension.activate().await;
    let status = ctx.extension.status();
    let tools = ctx.extension.tools();
    ctx.extension.deactivate().await;

    if status != ConnectionStatus::Connected {
        bail!("Not connected to MCP server");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(tools.as_slice())?);
        return Ok(());
    }

    let width = tools.iter().map(|t| t.name.len()).max().unwrap_or(0);
    for tool in tools.iter() {
        let summary = tool.description.lines().next().unwrap_or("");
        println!("{:<width$}  {}", tool.name, summary, width = width);
    }
    println!("\n{} tools", tools.len());
    Ok(())
}

async fn handle_invoke(
    ctx: &Context,
    action: String,
    params: Vec<(String, Value)>,
    json: Option<String>,
) -> Result<()> {
    let input = build_invocation(&action, params, json.as_deref())?;

    ctx.extension.activate().await;
    let text = ctx.extension.invoke(&input, &CancellationToken::new()).await;
    ctx.extension.deactivate().await;

    if text.starts_with(ERROR_PREFIX) {
        bail!("{}", text);
    }
    println!("{}", text);
    Ok(())
}

/// Assemble the tool input: `--json` first, then each `--param`, then the action
pub fn build_invocation(
    action: &str,
    params: Vec<(String, Value)>,
    json: Option<&str>,
) -> Result<Value> {
    let mut input = match json {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("Invalid --json")? {
            Value::Object(map) => map,
            _ => bail!("--json must be a JSON object"),
        },
        None => Map::new(),
    };
    for (key, value) in params {
        input.insert(key, value);
    }
    input.insert("action".to_string(), Value::String(action.to_string()));
    Ok(Value::Object(input))
}

fn handle_schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&tool_input_schema())?);
    Ok(())
}

fn handle_actions() {
    let table = action_table();
    let width = table.iter().map(|(alias, _)| alias.len()).max().unwrap_or(0);
    for (alias, tool) in table {
        println!("{:<width$}  -> {}", alias, tool, width = width);
    }
}

async fn handle_status(ctx: &Context) -> Result<()> {
    let settings = ctx.settings.get_settings().await?;
    let configured = ctx.credentials.is_configured().await;
    let store = ctx.credentials.secret_store();

    let server_url = if settings.server_url.is_empty() {
        "(not set)"
    } else {
        settings.server_url.as_str()
    };
    let worker = std::iter::once(settings.worker_path.as_str())
        .chain(settings.worker_args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    println!("Configured:    {}", if configured { "yes" } else { "no" });
    println!("Server URL:    {}", server_url);
    println!("Worker:        {}", worker);
    println!(
        "Secret store:  {}{}",
        store.name(),
        if store.is_available() { "" } else { " (unavailable)" }
    );
    for (label, key) in [("Username from:", SECRET_KEY_USERNAME), ("API key from: ", SECRET_KEY_API_KEY)] {
        let source = store.source_of(key);
        println!("{} {}", label, source.as_deref().unwrap_or("(not stored)"));
    }
    println!("Settings file: {}", ctx.settings.path().display());
    println!(
        "Debug log:     {} ({})",
        log_file_path().display(),
        if file_logger::is_enabled() {
            "on"
        } else {
            "off; set TESTRAIL_MCP_DEBUG=1"
        }
    );
    Ok(())
}
