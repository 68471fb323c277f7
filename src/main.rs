use std::{process, sync::Arc};

use folio::{
    application::{
        blog::BlogService,
        chrome::ChromeService,
        error::AppError,
        notify::{
            GitCli, MessageLinks, NewPostDetails, NotificationEvent, Notifier, NotifyError,
            ReqwestTransport,
        },
        page::PageService,
        render::{Attributes, DocumentRenderer, RendererOverrides},
    },
    config::{self, NotifyCommand},
    domain::posts::FrontMatter,
    infra::{content::FsContentStore, error::InfraError, http, http::HttpState, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Notify(args) => run_notify(settings, args.command).await,
        config::Command::Render(args) => run_render(args).await,
    }
}

fn build_notifier(settings: &config::NotifySettings) -> Result<Notifier, AppError> {
    let transport = ReqwestTransport::new().map_err(NotifyError::from)?;
    let inspector = GitCli::new(
        settings.git_program.clone(),
        settings.repository_dir.clone(),
    );
    let links = MessageLinks::new(
        settings.commit_base_url.clone(),
        settings.post_base_url.clone(),
    );

    Ok(Notifier::new(
        settings.webhook_url.clone(),
        links,
        Arc::new(transport),
        Arc::new(inspector),
    ))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let content = Arc::new(FsContentStore::new(&settings.content.root));
    let renderer = Arc::new(DocumentRenderer::default());
    let notifier = build_notifier(&settings.notify)?;

    if !notifier.is_configured() {
        info!(
            target = "folio::serve",
            "webhook URL not configured; contact form and relay will report errors"
        );
    }

    let state = HttpState {
        blog: Arc::new(BlogService::new(content.clone(), renderer.clone())),
        pages: Arc::new(PageService::new(content, renderer)),
        chrome: Arc::new(ChromeService::new(settings.site.clone())),
        notifier: Arc::new(notifier),
    };

    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "folio::serve",
        addr = %settings.server.addr,
        content = %settings.content.root.display(),
        "listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "folio::serve", error = %err, "failed to listen for shutdown signal");
        return;
    }
    info!(target = "folio::serve", "shutting down");
}

async fn run_notify(settings: config::Settings, command: NotifyCommand) -> Result<(), AppError> {
    let notifier = build_notifier(&settings.notify)?;

    let event = match command {
        NotifyCommand::Test => {
            notifier.send_test().await?;
            info!(target = "folio::notify", "test message sent");
            return Ok(());
        }
        NotifyCommand::DeployStarted => NotificationEvent::DeploymentStarted,
        NotifyCommand::DeploySucceeded => NotificationEvent::DeploymentSucceeded,
        NotifyCommand::DeployFailed => NotificationEvent::DeploymentFailed,
        NotifyCommand::NewPost(args) => NotificationEvent::NewPost(NewPostDetails {
            title: args.title,
            excerpt: args.excerpt,
            slug: args.slug,
        }),
    };

    notifier.dispatch(&event).await?;
    info!(target = "folio::notify", event = event.name(), "notification sent");
    Ok(())
}

async fn run_render(args: config::RenderArgs) -> Result<(), AppError> {
    let source = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    let body = FrontMatter::split(&source)?.body;

    let attributes = match args.class {
        Some(class) => Attributes::new().with("class", class),
        None => Attributes::new(),
    };

    let rendered =
        DocumentRenderer::default().render(&body, &RendererOverrides::new(), &attributes)?;
    println!("{}", rendered.html);
    Ok(())
}
