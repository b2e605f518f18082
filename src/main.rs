use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use paperdesk::config::{MailTransport, ObjectStoreBackend, StoreBackend};
use paperdesk::mail::{EmailQueue, LogMailer, Mailer, SmtpMailer};
use paperdesk::object_store::{CloudinaryStore, DiskStore, ObjectStore};
use paperdesk::store::{MemoryStore, PgStore, Store};
use paperdesk::{app, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    let store: Arc<dyn Store> = match &config.store {
        StoreBackend::Postgres {
            url,
            max_connections,
            run_migrations,
        } => {
            let store = PgStore::connect(url, *max_connections, *run_migrations)
                .await
                .context("failed to connect to PostgreSQL")?;
            info!("Connected to PostgreSQL");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            info!("Using in-memory store, data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let mut files_dir = None;
    let objects: Arc<dyn ObjectStore> = match &config.object_store {
        ObjectStoreBackend::Disk { root } => {
            tokio::fs::create_dir_all(root)
                .await
                .with_context(|| format!("failed to create {}", root.display()))?;
            files_dir = Some(root.clone());
            Arc::new(DiskStore::new(root.clone(), &config.public_base_url))
        }
        ObjectStoreBackend::Cloudinary(cloudinary) => {
            Arc::new(CloudinaryStore::new(cloudinary.clone()))
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.mail {
        MailTransport::Smtp(smtp) => {
            Arc::new(SmtpMailer::new(smtp).context("failed to configure SMTP")?)
        }
        MailTransport::Log => Arc::new(LogMailer),
    };
    let (emails, _email_worker) = EmailQueue::start(mailer, &config.mail_from);

    let mut state = AppState::new(
        store,
        objects,
        emails,
        config.staging_dir.clone(),
        &config.register_url,
    )
    .with_max_upload_bytes(config.max_upload_bytes);
    if let Some(dir) = files_dir {
        state = state.with_files_dir(dir);
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    info!("Server is running on http://{}", config.bind_addr);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
