//! Command-line definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::Value;

/// Talk to a TestRail MCP server from the terminal
#[derive(Parser, Debug)]
#[command(name = "testrail-mcp")]
#[command(about = "Run TestRail MCP tool invocations outside an editor")]
#[command(version)]
pub struct Cli {
    /// Secret store holding the username and API key
    #[arg(long, global = true, default_value = "chain", env = "TESTRAIL_MCP_SECRETS")]
    pub secrets: String,

    /// Settings file (default: user-level config.yaml)
    #[arg(long, global = true, env = "TESTRAIL_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print debug output, including worker traffic
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store the server URL and credentials, then connect to verify them
    Configure {
        /// TestRail server URL
        #[arg(long)]
        url: Option<String>,

        /// TestRail username (email)
        #[arg(long)]
        username: Option<String>,

        /// TestRail API key (prompted for, masked, when no flag is given)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Remove the stored username and API key
    ClearCredentials,

    /// Connect and call get_projects
    TestConnection,

    /// List the tools the worker advertises
    Tools {
        /// Print the raw descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invoke the TestRail tool once and print the result
    Invoke {
        /// Action name, e.g. list_projects or create_case
        action: String,

        /// Parameter as key=value; values that parse as JSON are sent as JSON
        #[arg(short, long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,

        /// Parameters as a JSON object, applied before --param
        #[arg(long)]
        json: Option<String>,
    },

    /// Print the tool's input schema
    Schema,

    /// Print the action synonym table
    Actions,

    /// Show configuration without connecting
    Status,
}

/// Parse `key=value`; the value is JSON if it parses, otherwise a string
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "testrail-mcp",
            "--secrets",
            "memory",
            "--config",
            "/tmp/testrail.yaml",
            "-v",
            "status",
        ]);
        assert_eq!(cli.secrets, "memory");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/testrail.yaml")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_invoke_params() {
        let cli = Cli::parse_from([
            "testrail-mcp",
            "invoke",
            "create_case",
            "--param",
            "title=Login works",
            "-p",
            "section_id=12",
        ]);
        match cli.command {
            Commands::Invoke { action, params, json } => {
                assert_eq!(action, "create_case");
                assert_eq!(params[0], ("title".to_string(), json!("Login works")));
                assert_eq!(params[1], ("section_id".to_string(), json!(12)));
                assert!(json.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_configure_ignores_exported_api_key() {
        // The worker reads TESTRAIL_API_KEY; exporting it must not suppress the prompts
        std::env::set_var("TESTRAIL_API_KEY", "exported-key");
        let cli = Cli::parse_from(["testrail-mcp", "configure"]);
        std::env::remove_var("TESTRAIL_API_KEY");

        match cli.command {
            Commands::Configure {
                url,
                username,
                api_key,
            } => {
                assert_eq!((url, username, api_key), (None, None, None));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("comment=").unwrap(), ("comment".to_string(), json!("")));
        assert_eq!(parse_param("flag=true").unwrap().1, json!(true));
        assert_eq!(parse_param("a=b=c").unwrap(), ("a".to_string(), json!("b=c")));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=1").is_err());
    }
}
