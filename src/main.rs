use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use mockdrop::client::{
    FileTokenStore, ProgressFn, SessionManager, TransferCoordinator, UploadRequest,
};
use mockdrop::common::{config, AppConfig, Credentials};

#[derive(Parser)]
#[command(name = "mockdrop")]
#[command(about = "Mock authenticated file-transfer API: server and client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the mock API server.
    Serve {
        #[arg(long, help = "Override the configured port")]
        port: Option<u16>,
    },
    /// Authenticate and persist the session token.
    Login {
        email: String,
        #[arg(long, help = "Password (prompted when omitted)")]
        password: Option<String>,
    },
    /// Show the currently authenticated user.
    Whoami,
    /// End the session and drop the persisted token.
    Logout,
    /// Upload a file, printing progress.
    Upload {
        #[arg(help = "Path to file to upload")]
        file: PathBuf,
        #[arg(long)]
        category: Option<String>,
    },
    /// Download a catalog file by id.
    Download {
        id: String,
        #[arg(long, help = "Output path (defaults to the declared filename)")]
        out: Option<PathBuf>,
    },
    /// Download the authenticated report.
    Report {
        #[arg(long, help = "Output path (defaults to the declared filename)")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = config::load_config()?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            mockdrop::server::serve(&config).await
        }
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };
            let manager = session_manager(&config)?;
            let user = manager
                .login(&Credentials { email, password })
                .await
                .context("login failed")?;
            println!("Logged in as {} ({})", user.name, user.email);
            Ok(())
        }
        Commands::Whoami => {
            let manager = session_manager(&config)?;
            manager.init_auth().await;
            match manager.current_user() {
                Some(user) => {
                    println!("{} ({}) role={} status={}", user.name, user.email, user.role, user.status)
                }
                None => println!("Not authenticated"),
            }
            Ok(())
        }
        Commands::Logout => {
            let manager = session_manager(&config)?;
            manager.init_auth().await;
            manager.logout().await;
            println!("Logged out");
            Ok(())
        }
        Commands::Upload { file, category } => {
            // Fail fast before touching the session or the network.
            if !file.exists() {
                anyhow::bail!("File not found: {}", file.display());
            }
            let manager = session_manager(&config)?;
            manager.init_auth().await;
            let coordinator = coordinator(&config, &manager)?;

            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.bin".to_string());
            let payload = tokio::fs::read(&file)
                .await
                .with_context(|| format!("read {}", file.display()))?;

            let mut request = UploadRequest::new(filename, payload);
            if let Some(category) = category {
                request = request.category(category);
            }

            let cancel = CancellationToken::new();
            let signal_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Ctrl+C received - cancelling upload");
                    signal_token.cancel();
                }
            });

            let on_progress: ProgressFn = Arc::new(|percent| {
                print!("\rUploading... {percent}%");
                let _ = std::io::stdout().flush();
            });

            let response = coordinator
                .upload(request, Some(on_progress), cancel)
                .await
                .context("upload failed")?;
            println!(
                "\nUploaded {} ({} bytes, {})",
                response.filename, response.size, response.content_type
            );
            Ok(())
        }
        Commands::Download { id, out } => {
            let manager = session_manager(&config)?;
            manager.init_auth().await;
            let coordinator = coordinator(&config, &manager)?;

            let file = coordinator.download(&id).await.context("download failed")?;
            write_download(file, out).await
        }
        Commands::Report { out } => {
            let manager = session_manager(&config)?;
            manager.init_auth().await;
            let coordinator = coordinator(&config, &manager)?;

            let file = coordinator
                .download_report()
                .await
                .context("report download failed")?;
            write_download(file, out).await
        }
    }
}

fn session_manager(config: &AppConfig) -> Result<SessionManager> {
    let store = Arc::new(FileTokenStore::new(FileTokenStore::default_path()));
    SessionManager::new(config.client.base_url.clone(), store).context("build http client")
}

fn coordinator(config: &AppConfig, manager: &SessionManager) -> Result<TransferCoordinator> {
    TransferCoordinator::new(config.client.base_url.clone(), manager.handle())
        .context("build http client")
}

async fn write_download(
    file: mockdrop::client::DownloadedFile,
    out: Option<PathBuf>,
) -> Result<()> {
    let path = out.unwrap_or_else(|| {
        PathBuf::from(file.filename.clone().unwrap_or_else(|| "download.bin".to_string()))
    });
    tokio::fs::write(&path, &file.bytes)
        .await
        .with_context(|| format!("write {}", path.display()))?;
    println!(
        "Saved {} ({} bytes, {})",
        path.display(),
        file.bytes.len(),
        file.content_type
    );
    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    std::io::stdout().flush().context("flush stdout")?;
    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .context("read password")?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}
