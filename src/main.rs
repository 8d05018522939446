use std::cell::RefCell;
use std::collections::HashSet;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use dotenvy::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use uuid::Uuid;

use txunajob_client::common::records::{NewService, UserAction};
use txunajob_client::common::{ChannelEvent, Id, RegisterForm};
use txunajob_client::dashboard::run_periodic;
use txunajob_client::notify::Notifier;
use txunajob_client::view;
use txunajob_client::{App, Error, Result, config};

#[derive(Parser)]
#[command(name = "txunajob", version, about = "TxunaJob marketplace client")]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the effective configuration (file + environment) to --config
    ConfigInit {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// client or professional
        #[arg(long, default_value = "client")]
        user_type: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        location: String,
    },
    Logout,
    /// Show the stored session
    Whoami,
    /// List professionals (demo data when the backend is unavailable)
    Professionals,
    Contact {
        professional_id: String,
        message: String,
    },
    Chats,
    /// Open a conversation and chat interactively; `/quit` leaves
    Chat {
        chat_id: String,
    },
    /// Admin dashboard, refreshed periodically until Ctrl-C
    Admin {
        #[arg(long)]
        once: bool,
    },
    AdminSettings,
    AdminUser {
        user_id: String,
        #[arg(value_enum)]
        action: ActionArg,
    },
    /// Professional dashboard, refreshed periodically until Ctrl-C
    Professional {
        #[arg(long)]
        once: bool,
    },
    NewService {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long)]
        price: Option<String>,
        #[arg(long, default_value = "")]
        address: String,
        /// ISO date, e.g. 2026-05-01T10:00
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum ActionArg {
    Verify,
    Reject,
    Suspend,
    Activate,
}

impl From<ActionArg> for UserAction {
    fn from(action: ActionArg) -> Self {
        match action {
            ActionArg::Verify => UserAction::Verify,
            ActionArg::Reject => UserAction::Reject,
            ActionArg::Suspend => UserAction::Suspend,
            ActionArg::Activate => UserAction::Activate,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    if let Command::ConfigInit { force } = cli.command {
        match config::save_config(&cli.config, &app_config, force) {
            Ok(true) => println!("Wrote {}", cli.config),
            Ok(false) => println!("{} already exists; pass --force to replace it", cli.config),
            Err(err) => {
                log::error!("Failed to write {}: {err}", cli.config);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut app = match App::from_config(app_config) {
        Ok(app) => app,
        Err(err) => {
            log::error!("Failed to open session storage: {err}");
            std::process::exit(1);
        }
    };

    let mut seen = HashSet::new();
    let outcome = run(&mut app, cli.command, &mut seen).await;
    print_notifications(app.notifier(), &mut seen);
    if let Err(err) = outcome {
        log::error!("{err}");
        if let Error::Validation(fields) = &err {
            for field in fields {
                eprintln!("{}: {}", field.field, field.message);
            }
        }
        std::process::exit(1);
    }
}

async fn run(app: &mut App, command: Command, seen: &mut HashSet<Uuid>) -> Result<()> {
    app.restore_session()?;

    match command {
        Command::ConfigInit { .. } => {}
        Command::Login { email, password } => {
            app.login(&email, &password).await?;
        }
        Command::Register {
            name,
            email,
            password,
            user_type,
            phone,
            location,
        } => {
            let form = RegisterForm {
                name,
                email,
                password,
                user_type,
                phone,
                location,
            };
            app.register(&form).await?;
        }
        Command::Logout => app.logout()?,
        Command::Whoami => match app.session() {
            Some(session) => println!(
                "{} <{}> ({})",
                session.user.name,
                session.user.email,
                session.user.role.as_str()
            ),
            None => println!("Not logged in"),
        },
        Command::Professionals => {
            let listings = app.load_professionals().await;
            println!("{}", view::professionals::render_professionals(&listings));
        }
        Command::Contact {
            professional_id,
            message,
        } => {
            app.contact_professional(&Id::from(professional_id.as_str()), &message)
                .await?;
        }
        Command::Chats => println!("{}", app.load_conversations().await?),
        Command::Chat { chat_id } => chat(app, Id::from(chat_id.as_str()), seen).await?,
        Command::Admin { once } => {
            let dashboard = app.admin_dashboard()?;
            let period = app.config().refresh_interval();
            let dashboard = &dashboard;
            refresh_loop(once, period, app.notifier(), seen, move || async move {
                dashboard
                    .refresh()
                    .await
                    .map(|snapshot| snapshot.render(Utc::now()))
            })
            .await;
        }
        Command::AdminSettings => {
            let dashboard = app.admin_dashboard()?;
            let settings = dashboard.load_settings().await;
            println!("{}", view::admin::render_settings(&settings));
        }
        Command::AdminUser { user_id, action } => {
            let dashboard = app.admin_dashboard()?;
            dashboard
                .user_action(&Id::from(user_id.as_str()), action.into())
                .await;
        }
        Command::Professional { once } => {
            let dashboard = app.professional_dashboard()?;
            let period = app.config().refresh_interval();
            let dashboard = &dashboard;
            refresh_loop(once, period, app.notifier(), seen, move || async move {
                dashboard
                    .refresh()
                    .await
                    .map(|snapshot| snapshot.render(Utc::now()))
            })
            .await;
        }
        Command::NewService {
            title,
            description,
            category,
            price,
            address,
            date,
        } => {
            let dashboard = app.professional_dashboard()?;
            let service = NewService {
                title,
                description,
                category,
                price,
                address,
                scheduled_date: date,
            };
            dashboard.create_service(&service).await;
        }
    }
    Ok(())
}

async fn refresh_loop<F, Fut>(
    once: bool,
    period: std::time::Duration,
    notifier: &Notifier,
    seen: &mut HashSet<Uuid>,
    refresh: F,
) where
    F: Fn() -> Fut,
    Fut: Future<Output = Option<String>>,
{
    if once {
        if let Some(markup) = refresh().await {
            println!("{markup}");
        }
        return;
    }

    let refresh = &refresh;
    let seen = &RefCell::new(seen);
    run_periodic(period, move || async move {
        match refresh().await {
            Some(markup) => println!("{markup}"),
            None => log::debug!("Refresh skipped"),
        }
        let mut seen = seen.borrow_mut();
        print_notifications(notifier, &mut seen);
    })
    .await;
}

async fn chat(app: &mut App, chat_id: Id, seen: &mut HashSet<Uuid>) -> Result<()> {
    let Some(viewer) = app.session().map(|session| session.user.id.clone()) else {
        return Err(Error::Auth("Sessão não iniciada".to_string()));
    };
    app.load_conversations().await?;
    app.connect()?;
    println!("{}", app.open_chat(chat_id).await?);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim() == "/quit" => break,
                Some(line) => {
                    if let Err(err) = app.send_chat_message(&line) {
                        log::warn!("Message not sent: {err}");
                    }
                }
                None => break,
            },
            active = app.channel_mut().wait_for_activity() => {
                if !active {
                    break;
                }
                for event in app.pump_channel() {
                    match event {
                        ChannelEvent::MessageAppended(message) => println!(
                            "{}",
                            view::chat::render_message(&message, &viewer, Utc::now())
                        ),
                        ChannelEvent::UnreadChanged { chat_id, unread_count } => {
                            println!("[chat {chat_id}] {unread_count} unread")
                        }
                        ChannelEvent::ConnectionStatus(status) => {
                            log::info!("Chat status: {status}")
                        }
                        other => log::debug!("Channel event: {other:?}"),
                    }
                }
            }
        }
        print_notifications(app.notifier(), seen);
    }

    app.channel_mut().close();
    Ok(())
}

fn print_notifications(notifier: &Notifier, seen: &mut HashSet<Uuid>) {
    for notification in notifier.active() {
        if seen.insert(notification.id) {
            println!(
                "{} {}",
                notification.kind.icon(),
                notification.message
            );
        }
    }
}
