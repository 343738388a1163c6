//! ts3query CLI Client
//!
//! Command-line interface for running ServerQuery commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ts3query::config::SshConfig;
use ts3query::{Client, Command, Config, RecordSet};
use tracing_subscriber::{fmt, EnvFilter};

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info,ts3query=debug";

/// ts3query CLI
#[derive(Parser, Debug)]
#[command(name = "ts3query-cli")]
#[command(about = "Run ServerQuery commands against a voice server")]
#[command(version)]
struct Args {
    /// Server address; the port defaults to 10011, or 10022 with --ssh-user
    #[arg(short, long, default_value = "127.0.0.1")]
    server: String,

    /// Connect through ssh as this user
    #[arg(long)]
    ssh_user: Option<String>,

    /// Private key for the ssh transport
    #[arg(short, long, requires = "ssh_user")]
    identity: Option<PathBuf>,

    /// Do not expect the header line on connect
    #[arg(long)]
    no_header: bool,

    /// Do not expect the welcome banner on connect
    #[arg(long)]
    no_banner: bool,

    /// Per-command timeout in milliseconds (0 waits forever)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Query login name
    #[arg(short, long, requires = "password")]
    login: Option<String>,

    /// Query login password
    #[arg(short, long, requires = "login")]
    password: Option<String>,

    /// Select the virtual server listening on this port
    #[arg(short = 'u', long)]
    use_port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a raw command: `k=v` becomes an option, `-x` a flag, anything
    /// else a positional argument
    Exec {
        /// Command name
        name: String,

        /// Arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Show the server version
    Version,

    /// Show the current session
    Whoami,

    /// List virtual servers
    ServerList,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> ts3query::Result<()> {
    let mut builder = Config::builder()
        .command_timeout_ms(args.timeout_ms)
        .verify_header(!args.no_header)
        .skip_banner(!args.no_banner);

    if let Some(user) = &args.ssh_user {
        builder = builder.ssh(SshConfig {
            user: user.clone(),
            identity_file: args.identity.clone(),
            ..SshConfig::default()
        });
    }

    let client = Client::connect(&args.server, builder.build())?;

    if let (Some(login), Some(password)) = (&args.login, &args.password) {
        client.login(login, password)?;
    }
    if let Some(port) = args.use_port {
        client.use_port(port)?;
    }

    match args.command {
        Commands::Exec { name, tokens } => {
            let records = client.exec(&parse_command(name, &tokens))?;
            print_records(&records);
        }
        Commands::Version => {
            let version = client.version()?;
            println!(
                "{} (build {}) on {}",
                version.version, version.build, version.platform
            );
        }
        Commands::Whoami => {
            let me = client.whoami()?;
            println!("{:#?}", me);
        }
        Commands::ServerList => {
            for server in client.server().list()? {
                println!(
                    "{:>4} {:>6} {:<8} {}/{} {}",
                    server.id,
                    server.port,
                    server.status,
                    server.clients_online,
                    server.max_clients,
                    server.name
                );
            }
        }
    }

    client.close()
}

/// Build a command from shell tokens
fn parse_command(name: String, tokens: &[String]) -> Command {
    tokens.iter().fold(Command::new(name), |cmd, token| {
        if token.starts_with('-') {
            cmd.flag(token.as_str())
        } else if let Some((key, value)) = token.split_once('=') {
            cmd.option(key, value)
        } else {
            cmd.arg(token.as_str())
        }
    })
}

fn print_records(records: &RecordSet) {
    for record in records {
        println!("{}", record);
    }
}
