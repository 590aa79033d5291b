use std::path::PathBuf;
use std::process::ExitCode;

use centre_extract::credentials::{
    ChainedCredentials, EnvCredentials, FileCredentials, PromptCredentials,
};
use centre_extract::mailbox::ImapConnector;
use centre_extract::report::{OutputFormat, open_sink};
use centre_extract::{Config, Driver, ErrorPolicy, ExtractError, Result, RunSummary};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "centre-extract",
    about = "Export booking dates and test centres from an IMAP folder",
    version
)]
struct Cli {
    /// Config file (defaults to ~/.config/centre-extract/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, help = "IMAP server hostname")]
    host: Option<String>,

    #[arg(long, help = "IMAP server port")]
    port: Option<u16>,

    #[arg(short, long, help = "Folder to scan")]
    folder: Option<String>,

    #[arg(long, help = "IMAP search criterion, e.g. ALL or UNSEEN")]
    search: Option<String>,

    /// Open the folder read-only (EXAMINE)
    #[arg(long)]
    read_only: bool,

    #[arg(short, long, help = "Report file")]
    output: Option<PathBuf>,

    /// Report format: xlsx or csv (guessed from the output extension)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// What to do with undecodable messages: skip or abort
    #[arg(long)]
    on_error: Option<ErrorPolicy>,

    #[arg(short, long, help = "Mailbox address")]
    user: Option<String>,

    /// File whose first line is the password
    #[arg(long)]
    password_file: Option<PathBuf>,

    #[arg(long, help = "Network timeout in seconds")]
    timeout: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(folder) = self.folder {
            config.folder = folder;
        }
        if let Some(search) = self.search {
            config.search = search;
        }
        if self.read_only {
            config.read_only = true;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if self.format.is_some() {
            config.format = self.format;
        }
        if let Some(policy) = self.on_error {
            config.on_error = policy;
        }
        if self.user.is_some() {
            config.username = self.user;
        }
        if self.password_file.is_some() {
            config.password_file = self.password_file;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(config: &Config) -> Result<(RunSummary, PathBuf)> {
    let mut sink = open_sink(config.output_format(), config.output.clone(), &config.folder)?;

    let mut credentials = ChainedCredentials::new().with(EnvCredentials);
    if let Some(path) = &config.password_file {
        credentials = credentials.with(FileCredentials {
            username: config.username.clone(),
            path: path.clone(),
        });
    }
    let credentials = credentials
        .with(PromptCredentials {
            username: config.username.clone(),
        })
        .resolve()?;

    let connector = ImapConnector::new(&config.host, config.port, config.timeout());
    let summary = Driver::from_config(config).run(&connector, &credentials, sink.as_mut())?;
    let path = sink.finish()?;

    Ok((summary, path))
}

fn report_error(err: &ExtractError) {
    tracing::error!("{err}");
    if matches!(err, ExtractError::Auth(_)) {
        eprintln!("This could be due to:");
        eprintln!("1. Incorrect email or password");
        eprintln!("2. IMAP access is disabled for the account");
        eprintln!("3. The provider requires an app password (accounts with 2-factor authentication)");
        eprintln!("\nPlease check your credentials and mail provider settings.");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = cli.into_config().and_then(|config| run(&config));
    match result {
        Ok((summary, path)) => {
            println!(
                "Data has been saved to {} ({} rows, {} skipped)",
                path.display(),
                summary.written,
                summary.skipped
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            report_error(&e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
