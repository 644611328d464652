use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pinboard_client::net::types::{Comment, ImageUpload, Pin};
use pinboard_client::pages::profile::ProfileTab;
use pinboard_client::state::notice::{NoticeSlot, Severity};
use pinboard_client::util::route::Route;
use pinboard_client::util::share::{ShareOutcome, SharePayload, ShareTarget};
use pinboard_client::{ApiClient, App, ClientConfig, ClientError, FileStorage, View};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("sign in required; run `pinboard login <username>`")]
    SignedOut,
    #[error("password required; pass --password or set PINBOARD_PASSWORD")]
    MissingPassword,
    #[error("{0}")]
    Failed(String),
    #[error("`{0}` is not available on this screen")]
    Unavailable(&'static str),
    #[error("cannot read image {path}: {source}")]
    Image { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pinboard", about = "Pin-sharing client for the terminal")]
struct Cli {
    #[arg(long, env = "PINBOARD_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "PINBOARD_APP_ORIGIN")]
    app_origin: Option<String>,

    #[arg(long, env = "PINBOARD_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long, env = "PINBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Register {
        email: String,
        username: String,
        #[arg(long, env = "PINBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    Logout,
    Whoami,
    Feed,
    /// Pin detail with comments.
    Pin {
        pin_id: i64,
    },
    /// Toggle the save state of a pin.
    Save {
        pin_id: i64,
    },
    Comment {
        pin_id: i64,
        text: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    Tag {
        name: String,
    },
    Saved,
    Profile {
        /// Show the saved tab instead of created pins.
        #[arg(long, default_value_t = false)]
        saved: bool,
    },
    Share {
        pin_id: i64,
    },
    /// Navigate to any client route, e.g. `/tag/sky`.
    Open {
        path: String,
    },
}

struct CliContext {
    app: App,
    json: bool,
}

/// Share sheet for a terminal: print the link.
struct StdoutShare;

impl ShareTarget for StdoutShare {
    fn share(&self, payload: &SharePayload) -> Result<ShareOutcome, ClientError> {
        println!("{}\n{}", payload.title, payload.url);
        Ok(ShareOutcome::Shared)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(cli.api_url, cli.app_origin, cli.token_file);
    tracing::debug!(api_url = %config.api_url, token_file = %config.token_file.display(), "client configured");
    let storage = Arc::new(FileStorage::new(config.token_file.clone()));
    let (api, events) = ApiClient::connect(config, storage)?;
    let mut ctx = CliContext { app: App::new(api, events, Arc::new(StdoutShare)), json: cli.json };

    run(&mut ctx, cli.command).await
}

fn build_config(api_url: Option<String>, app_origin: Option<String>, token_file: Option<PathBuf>) -> ClientConfig {
    let env = ClientConfig::from_env();
    let mut config = ClientConfig::new(
        api_url.as_deref().unwrap_or(&env.api_url),
        app_origin.as_deref().unwrap_or(&env.app_origin),
    );
    config.timeouts = env.timeouts;
    config.token_file = token_file.unwrap_or(env.token_file);
    config
}

async fn run(ctx: &mut CliContext, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { username, password } => {
            let password = password.ok_or(CliError::MissingPassword)?;
            ctx.app.start("/login").await;
            ctx.app.login(&username, &password).await;
            finish_auth_form(ctx)
        }
        Command::Register { email, username, password } => {
            let password = password.ok_or(CliError::MissingPassword)?;
            ctx.app.start("/register").await;
            ctx.app.register(&email, &username, &password).await;
            finish_auth_form(ctx)
        }
        Command::Logout => {
            ctx.app.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            open(ctx, Route::Profile).await?;
            let View::Profile(page) = ctx.app.view() else { return Err(CliError::SignedOut) };
            let user = page.user.as_ref().ok_or(CliError::SignedOut)?;
            if ctx.json {
                print_json(&serde_json::to_value(user)?)
            } else {
                println!("{} <{}>", user.username, user.email);
                Ok(())
            }
        }
        Command::Feed => show(ctx, Route::Home).await,
        Command::Pin { pin_id } => show(ctx, Route::PinDetail(pin_id)).await,
        Command::Save { pin_id } => {
            open(ctx, Route::PinDetail(pin_id)).await?;
            if !ctx.app.toggle_save(pin_id).await {
                return Err(CliError::Unavailable("save"));
            }
            settle(ctx)?;
            render(ctx)
        }
        Command::Comment { pin_id, text } => {
            open(ctx, Route::PinDetail(pin_id)).await?;
            if !ctx.app.post_comment(&text).await {
                return Err(CliError::Unavailable("comment"));
            }
            settle(ctx)?;
            render(ctx)
        }
        Command::Create { title, image, description, tags } => {
            let bytes = std::fs::read(&image).map_err(|source| CliError::Image { path: image.clone(), source })?;
            let file_name = image.file_name().map_or_else(|| "image".to_owned(), |n| n.to_string_lossy().into_owned());
            open(ctx, Route::Create).await?;
            ctx.app
                .create_pin(&title, &description, Some(ImageUpload::new(file_name, bytes)), &tags)
                .await;
            settle(ctx)?;
            render(ctx)
        }
        Command::Tag { name } => show(ctx, Route::TagPins(name)).await,
        Command::Saved => show(ctx, Route::Saved).await,
        Command::Profile { saved } => {
            open(ctx, Route::Profile).await?;
            let View::Profile(page) = ctx.app.view() else { return Err(CliError::SignedOut) };
            let mut page = page.clone();
            page.select_tab(if saved { ProfileTab::Saved } else { ProfileTab::Created });
            surface_notice(page.notice.current().map(|n| (n.message.as_str(), n.severity)))?;
            print_pins(ctx.json, page.visible())
        }
        Command::Share { pin_id } => {
            open(ctx, Route::PinDetail(pin_id)).await?;
            if !ctx.app.share(pin_id) {
                return Err(CliError::Unavailable("share"));
            }
            settle(ctx)?;
            view_notice(ctx)
        }
        Command::Open { path } => {
            ctx.app.start(&path).await;
            settle(ctx)?;
            render(ctx)
        }
    }
}

/// Navigate and fail when the app ended up on the login screen instead.
async fn open(ctx: &mut CliContext, route: Route) -> Result<(), CliError> {
    tracing::debug!(%route, "opening route");
    let wanted_protected = route.is_protected();
    ctx.app.start(&route.path()).await;
    if wanted_protected && ctx.app.route() == &Route::Login {
        report_forced_logout(ctx);
        return Err(CliError::SignedOut);
    }
    Ok(())
}

async fn show(ctx: &mut CliContext, route: Route) -> Result<(), CliError> {
    open(ctx, route).await?;
    render(ctx)
}

/// Fail when an action forced a logout.
fn settle(ctx: &CliContext) -> Result<(), CliError> {
    if ctx.app.route() == &Route::Login {
        report_forced_logout(ctx);
        return Err(CliError::SignedOut);
    }
    Ok(())
}

fn report_forced_logout(ctx: &CliContext) {
    if let Some(notice) = ctx.app.notice.current() {
        eprintln!("{}", notice.message);
    }
}

fn finish_auth_form(ctx: &CliContext) -> Result<(), CliError> {
    let error = match ctx.app.view() {
        View::Login(form) => form.error.clone(),
        View::Register(form) => form.error.clone(),
        _ => None,
    };
    if let Some(error) = error {
        return Err(CliError::Failed(error));
    }
    match ctx.app.api().session().user() {
        Some(user) => {
            println!("logged in as {}", user.username);
            Ok(())
        }
        None => Err(CliError::SignedOut),
    }
}

/// Print success notices to stderr; turn error notices into a failure.
fn surface_notice(notice: Option<(&str, Severity)>) -> Result<(), CliError> {
    match notice {
        Some((message, Severity::Error)) => Err(CliError::Failed(message.to_owned())),
        Some((message, Severity::Success)) => {
            eprintln!("{message}");
            Ok(())
        }
        None => Ok(()),
    }
}

/// Surface the mounted page's notice.
fn view_notice(ctx: &CliContext) -> Result<(), CliError> {
    let notice = ctx.app.view().notice().and_then(NoticeSlot::current);
    surface_notice(notice.map(|n| (n.message.as_str(), n.severity)))
}

fn render(ctx: &CliContext) -> Result<(), CliError> {
    view_notice(ctx)?;
    match ctx.app.view() {
        View::Feed(page) => print_pins(ctx.json, &page.pins),
        View::Saved(page) => print_pins(ctx.json, &page.pins),
        View::TagPins(page) => {
            if let (Some(message), false) = (page.empty_message(), ctx.json) {
                println!("{message}");
                return Ok(());
            }
            print_pins(ctx.json, &page.pins)
        }
        View::Profile(page) => print_pins(ctx.json, page.visible()),
        View::PinDetail(page) => {
            let Some(pin) = &page.pin else { return Ok(()) };
            if ctx.json {
                return print_json(&json!({ "pin": pin, "comments": page.comments }));
            }
            println!("{}", pin_line(pin));
            if !pin.description_or_empty().is_empty() {
                println!("  {}", pin.description_or_empty());
            }
            println!("  image: {}", ctx.app.api().config().asset_url(&pin.image_ref));
            for comment in &page.comments {
                println!("{}", comment_line(comment));
            }
            Ok(())
        }
        View::Create(_) => {
            println!("ready: pinboard create --title <title> --image <file>");
            Ok(())
        }
        View::Login(_) | View::Register(_) => Ok(()),
    }
}

fn print_pins(json: bool, pins: &[Pin]) -> Result<(), CliError> {
    if json {
        return print_json(&serde_json::to_value(pins)?);
    }
    for pin in pins {
        println!("{}", pin_line(pin));
    }
    Ok(())
}

fn pin_line(pin: &Pin) -> String {
    let mut line = format!("#{} {} by {}", pin.id, pin.title, pin.owner.username);
    if pin.is_saved {
        line.push_str(" [saved]");
    }
    if !pin.tags.is_empty() {
        let tags: Vec<&str> = pin.tags.iter().map(|t| t.name.as_str()).collect();
        line.push_str(&format!(" ({})", tags.join(", ")));
    }
    line
}

fn comment_line(comment: &Comment) -> String {
    format!("  {} @ {}: {}", comment.author.username, comment.created_at, comment.content)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
