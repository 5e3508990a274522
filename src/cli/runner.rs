//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::FeedConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClient;
use crate::pagination::PageState;
use crate::poller::PollingPaginator;
use crate::source::{ContractViewSource, PageSource, RecordFamily};
use crate::types::RecordSet;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// A paging command typed on stdin while watching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Next page
    Next,
    /// Previous page
    Prev,
    /// Jump to a page
    Goto(i64),
    /// Show the current page number
    Show,
    /// Stop watching
    Quit,
}

impl ConsoleCommand {
    /// Parse one input line. Returns None for anything unrecognized.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?.to_ascii_lowercase();
        let arg = parts.next();

        match (command.as_str(), arg) {
            ("n" | "next" | ">", None) => Some(Self::Next),
            ("p" | "prev" | "<", None) => Some(Self::Prev),
            ("g" | "goto", Some(page)) => page.parse().ok().map(Self::Goto),
            ("s" | "show", None) => Some(Self::Show),
            ("q" | "quit" | "exit", None) => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Render a page of records for the console
pub fn render_page(records: &RecordSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(records)?),
        OutputFormat::Text => {
            if records.is_empty() {
                return Ok("(no records)".to_string());
            }
            let lines: Vec<String> = records
                .iter()
                .map(|record| {
                    format!(
                        "{}. {} - {}",
                        record.id,
                        record.content,
                        record.created_at().format("%Y-%m-%d %H:%M:%S UTC")
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Watch { page } => self.watch(*page).await,
            Commands::Fetch { page } => self.fetch(*page).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Resolve the feed config from the file and flag overrides
    pub fn feed_config(&self) -> Result<FeedConfig> {
        let mut config = match &self.cli.config {
            Some(path) => FeedConfig::load(path)?,
            None => {
                let rpc_url = self
                    .cli
                    .rpc_url
                    .clone()
                    .ok_or_else(|| Error::config("No config file given; --rpc-url is required"))?;
                let contract = self
                    .cli
                    .contract
                    .clone()
                    .ok_or_else(|| Error::config("No config file given; --contract is required"))?;
                FeedConfig::new(rpc_url, contract)
            }
        };

        if let Some(rpc_url) = &self.cli.rpc_url {
            config.rpc_url.clone_from(rpc_url);
        }
        if let Some(contract) = &self.cli.contract {
            config.contract.clone_from(contract);
        }
        if let Some(family) = &self.cli.family {
            config.family = family.parse::<RecordFamily>()?;
        }
        if let Some(page_size) = self.cli.page_size {
            config.page_size = page_size;
        }
        if let Some(interval_ms) = self.cli.interval_ms {
            config.interval_ms = interval_ms;
        }

        config.validate()?;
        Ok(config)
    }

    fn build_source(config: &FeedConfig) -> Result<ContractViewSource> {
        let client = HttpClient::with_config(config.http_client_config())?;
        Ok(
            ContractViewSource::new(client, &config.rpc_url, &config.contract, config.family)
                .with_finality(config.finality),
        )
    }

    /// Poll until quit or Ctrl-C
    async fn watch(&self, page: Option<u64>) -> Result<()> {
        let mut config = self.feed_config()?;
        if let Some(page) = page {
            config.initial_page = page.max(1);
        }
        let source = Self::build_source(&config)?;
        let format = self.cli.format;

        let paginator = PollingPaginator::builder()
            .config(config.paginator_config())
            .source(source)
            .on_update(move |records| match render_page(records, format) {
                Ok(rendered) => println!("{rendered}"),
                Err(e) => eprintln!("Error: {e}"),
            })
            .build()?;

        paginator.start()?;
        eprintln!(
            "Watching {} ({}), page {}. Commands: n, p, g <page>, s, q",
            config.contract,
            config.family,
            paginator.page()
        );

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        loop {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    result?;
                    break;
                }
                line = lines.next_line(), if stdin_open => {
                    let Some(line) = line? else {
                        debug!("stdin closed, polling until Ctrl-C");
                        stdin_open = false;
                        continue;
                    };
                    match ConsoleCommand::parse(&line) {
                        Some(ConsoleCommand::Quit) => break,
                        Some(command) => {
                            match command {
                                ConsoleCommand::Next => paginator.next_page(),
                                ConsoleCommand::Prev => paginator.prev_page(),
                                ConsoleCommand::Goto(page) => paginator.set_page(page),
                                ConsoleCommand::Show | ConsoleCommand::Quit => {}
                            }
                            eprintln!("Current page: {}", paginator.page());
                        }
                        None if line.trim().is_empty() => {}
                        None => eprintln!("Unknown command '{}' (n, p, g <page>, s, q)", line.trim()),
                    }
                }
            }
        }

        paginator.stop();
        info!("Stopped watching {}", config.contract);
        Ok(())
    }

    /// One-shot fetch of a single page
    async fn fetch(&self, page: u64) -> Result<()> {
        let config = self.feed_config()?;
        let source = Self::build_source(&config)?;

        let pages = PageState::with_page(config.page_size, page);
        let (page, offset) = (pages.page(), pages.offset());
        debug!("Fetching page {} at offset {}", page, offset);
        let records = source
            .fetch_page(offset, config.page_size)
            .await
            .with_context(|| format!("Fetching page {page} of {}", config.contract))?;

        println!("{}", render_page(&records, self.cli.format)?);
        Ok(())
    }

    /// Load, validate and summarize the config
    fn validate(&self) -> Result<()> {
        let config = self.feed_config()?;
        println!("✓ Feed configuration is valid");
        println!("  RPC URL: {}", config.rpc_url);
        println!("  Contract: {}", config.contract);
        println!(
            "  Family: {} ({})",
            config.family,
            config.family.method_name()
        );
        println!("  Page size: {}", config.page_size);
        println!("  Interval: {}ms", config.interval_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use clap::Parser;
    use serde_json::json;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn runner(args: &[&str]) -> Runner {
        let mut argv = vec!["feedpoll"];
        argv.extend_from_slice(args);
        Runner::new(Cli::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_console_command_parse() {
        assert_eq!(ConsoleCommand::parse("n"), Some(ConsoleCommand::Next));
        assert_eq!(ConsoleCommand::parse(" NEXT "), Some(ConsoleCommand::Next));
        assert_eq!(ConsoleCommand::parse("<"), Some(ConsoleCommand::Prev));
        assert_eq!(ConsoleCommand::parse("g 4"), Some(ConsoleCommand::Goto(4)));
        assert_eq!(ConsoleCommand::parse("goto -1"), Some(ConsoleCommand::Goto(-1)));
        assert_eq!(ConsoleCommand::parse("q"), Some(ConsoleCommand::Quit));
        assert_eq!(ConsoleCommand::parse("s"), Some(ConsoleCommand::Show));

        assert_eq!(ConsoleCommand::parse(""), None);
        assert_eq!(ConsoleCommand::parse("g"), None);
        assert_eq!(ConsoleCommand::parse("g x"), None);
        assert_eq!(ConsoleCommand::parse("n 2"), None);
        assert_eq!(ConsoleCommand::parse("jump"), None);
    }

    #[test]
    fn test_render_page_text() {
        let records = vec![
            Record::new(1, "Great team").with_created_at_ns(1_650_000_000_000_000_000),
            Record::new(2, "Slow reviews"),
        ];

        let rendered = render_page(&records, OutputFormat::Text).unwrap();
        assert_eq!(
            rendered,
            "1. Great team - 2022-04-15 05:20:00 UTC\n2. Slow reviews - 1970-01-01 00:00:00 UTC"
        );
    }

    #[test]
    fn test_render_page_empty_and_json() {
        assert_eq!(
            render_page(&Vec::new(), OutputFormat::Text).unwrap(),
            "(no records)"
        );

        let rendered = render_page(&vec![Record::new(3, "x")], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value, json!([{"id": 3, "content": "x", "create_at": 0}]));
    }

    #[test]
    fn test_feed_config_from_flags() {
        let runner = runner(&[
            "--rpc-url",
            "http://localhost:3030",
            "--contract",
            "feedback.test.near",
            "--family",
            "user:8",
            "--interval-ms",
            "250",
            "validate",
        ]);

        let config = runner.feed_config().unwrap();
        assert_eq!(config.rpc_url, "http://localhost:3030");
        assert_eq!(config.family, RecordFamily::ByUser(8));
        assert_eq!(config.interval_ms, 250);
        assert_eq!(config.page_size, 3);
    }

    #[test]
    fn test_feed_config_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.yaml");
        std::fs::write(
            &path,
            "rpc_url: https://rpc.testnet.near.org\ncontract: feedback.testnet\npage_size: 10\n",
        )
        .unwrap();

        let runner = runner(&[
            "--config",
            path.to_str().unwrap(),
            "--page-size",
            "4",
            "validate",
        ]);
        let config = runner.feed_config().unwrap();
        assert_eq!(config.contract, "feedback.testnet");
        assert_eq!(config.page_size, 4);
    }

    #[test]
    fn test_feed_config_requires_endpoint() {
        let err = runner(&["validate"]).feed_config().unwrap_err();
        assert!(err.to_string().contains("--rpc-url"));

        let err = runner(&["--rpc-url", "http://localhost:3030", "validate"])
            .feed_config()
            .unwrap_err();
        assert!(err.to_string().contains("--contract"));
    }

    #[test]
    fn test_feed_config_rejects_bad_family_flag() {
        let err = runner(&[
            "--rpc-url",
            "http://localhost:3030",
            "--contract",
            "c",
            "--family",
            "nobody",
            "validate",
        ])
        .feed_config()
        .unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_fetch_command() {
        let mock_server = MockServer::start().await;
        let payload = json!([{"id": 4, "content": "four", "create_at": 0}]);

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "feedpoll",
                "result": {"result": payload.to_string().into_bytes(), "logs": []}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let runner = runner(&["--rpc-url", &uri, "--contract", "c", "fetch", "--page", "2"]);
        runner.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_command_past_last_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "feedpoll",
                "result": {"result": b"[]".to_vec(), "logs": []}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let uri = mock_server.uri();
        let runner = runner(&[
            "--rpc-url",
            &uri,
            "--contract",
            "c",
            "fetch",
            "--page",
            "18446744073709551615",
        ]);
        runner.run().await.unwrap();
    }
}
