use clap::{Parser, Subcommand};
use driveio::{
    cmd::{fs_command::FsCommands, handler::handle_fs_command},
    common::DriveConfig,
    core::file_record::Credential,
    vfs::DriveFileSystem,
};

#[derive(Parser)]
#[command(name = "driveio")]
#[command(version, about = "Path-based access to ID-addressed cloud drives", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "driveio.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// File system operations
    Fs {
        #[command(subcommand)]
        fs_command: FsCommands,

        /// OAuth access token for the backend
        #[arg(short, long, env = "DRIVEIO_TOKEN", hide_env_values = true)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DriveConfig::load_or_default(&cli.config)?;
    tracing::debug!("Loaded config: {:?}", config);

    match cli.command {
        Commands::Fs { fs_command, token } => {
            let fs = DriveFileSystem::from_config(&config)?;
            let credential = Credential::new(token);
            handle_fs_command(fs_command, &fs, &credential).await
        }
    }
}
