//! ThemeFTP CLI - drive the theme filesystem without an FTP front-end
//!
//! Usage:
//!   themeftp-cli --login <key@store> --secret <secret> connect
//!   themeftp-cli ... ls [path]             List a directory
//!   themeftp-cli ... stat <path>           Show metadata as JSON
//!   themeftp-cli ... get <remote> [local]  Download an asset
//!   themeftp-cli ... put <local> <remote>  Upload an asset
//!   themeftp-cli ... mv <from> <to>        Rename an asset within a theme
//!   themeftp-cli ... rm <path>             Delete an asset

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use themeftp::{initial_cwd, load_config, path, FsError, HttpGatewayFactory, Login, ThemeFs, VirtualFs};

#[derive(Parser)]
#[command(
    name = "themeftp-cli",
    about = "ThemeFTP CLI - browse and edit store themes as files",
    version,
    long_about = "Login tokens carry the API key and the store name: <api_key>@<store> or <api_key>#<store>.\nThe secret is the API password."
)]
struct Cli {
    /// Login token (<api_key>@<store>)
    #[arg(long, env = "THEMEFTP_LOGIN", global = true)]
    login: Option<String>,

    /// API secret
    #[arg(long, env = "THEMEFTP_SECRET", hide_env_values = true, global = true)]
    secret: Option<String>,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the platform host suffix (default: myshopify.com)
    #[arg(long, global = true)]
    platform_host: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and report the theme count
    Connect,
    /// List a directory
    Ls {
        /// Remote path (default: /)
        #[arg(default_value = "/")]
        path: String,
    },
    /// Show metadata of a path as JSON
    Stat {
        path: String,
    },
    /// Download an asset
    Get {
        /// Remote asset path
        remote: String,
        /// Local destination (default: asset file name)
        local: Option<PathBuf>,
    },
    /// Upload a file as an asset
    Put {
        /// Local file path
        local: PathBuf,
        /// Remote asset path
        remote: String,
    },
    /// Rename an asset within its theme
    Mv {
        from: String,
        to: String,
    },
    /// Delete an asset
    Rm {
        path: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn login(cli: &Cli) -> anyhow::Result<ThemeFs> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(ref host) = cli.platform_host {
        config.platform_host = host.clone();
        themeftp::config::validate_config(&config)?;
    }

    let token = cli.login.as_deref().context("missing --login (or THEMEFTP_LOGIN)")?;
    let secret = cli.secret.clone().context("missing --secret (or THEMEFTP_SECRET)")?;

    let factory = HttpGatewayFactory::new(config.clone())?;
    let mut handshake = Login::new();
    handshake.user(token);
    let fs = handshake
        .pass(SecretString::from(secret), &factory, &config)
        .await
        .with_context(|| format!("login as {} failed", token))?;
    Ok(fs)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut fs = login(&cli).await?;

    match cli.command {
        Commands::Connect => {
            let themes = fs.list(initial_cwd()).await?;
            println!("Connected to {}: {} themes", fs.display_name(), themes.len());
        }
        Commands::Ls { ref path } => {
            for name in fs.list(path).await? {
                let child = path::join(path, &name);
                match fs.stat(&child).await {
                    Ok(stat) if stat.is_directory() => println!("{}/", name),
                    Ok(stat) => println!("{:>10}  {}", stat.size, name),
                    Err(_) => println!("{}", name),
                }
            }
        }
        Commands::Stat { ref path } => {
            let stat = fs.stat(path).await?;
            println!("{}", serde_json::to_string_pretty(&stat)?);
        }
        Commands::Get { ref remote, ref local } => {
            let data = fs.read(remote).await?;
            let local = local
                .clone()
                .unwrap_or_else(|| PathBuf::from(path::leaf_name(remote)));
            tokio::fs::write(&local, &data)
                .await
                .with_context(|| format!("cannot write {}", local.display()))?;
            println!("{} -> {} ({} bytes)", remote, local.display(), data.len());
        }
        Commands::Put { ref local, ref remote } => {
            let data = tokio::fs::read(local)
                .await
                .with_context(|| format!("cannot read {}", local.display()))?;
            fs.write(remote, &data).await?;
            println!("{} -> {} ({} bytes)", local.display(), remote, data.len());
        }
        Commands::Mv { ref from, ref to } => {
            fs.rename(from, to).await?;
            println!("{} -> {}", from, to);
        }
        Commands::Rm { ref path } => {
            fs.remove(path).await?;
            println!("removed {}", path);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<FsError>() {
                Some(fs_err) if fs_err.is_remote() => {
                    eprintln!("Error [{} {}] remote: {:#}", fs_err.reply_code(), fs_err.code(), e)
                }
                Some(fs_err) => eprintln!("Error [{} {}]: {:#}", fs_err.reply_code(), fs_err.code(), e),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}
