//! `cadastro` - CLI for the registration screens
//!
//! Each command mounts one screen against the local session and the SQLite
//! document store, performs one interaction and prints the result.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use cadastro::cli::{
    Cli, Command, ConfigCommand, DeviceArgs, DevicesCommand, FormCommand, OutputFormat,
    ProfileArgs,
};
use cadastro::form::is_valid_email;
use cadastro::render::{render_cards, render_form, render_welcome};
use cadastro::screen::{Phase, SubmitOutcome};
use cadastro::{
    init_logging, AuthState, Collection, Config, ConsoleNotifier, DeviceScreen, FormScreen,
    LocalIdentity, ProfileForm, Route, RouteHistory, ScreenContext, Session, SqliteStore,
    WelcomeScreen,
};

/// Collaborators for one CLI invocation.
#[derive(Debug)]
struct App {
    config: Config,
    identity: Arc<LocalIdentity>,
    history: Arc<RouteHistory>,
}

impl App {
    fn new(config: Config) -> anyhow::Result<Self> {
        let session_path = config.session_path();
        let identity = LocalIdentity::open(&session_path)
            .with_context(|| format!("reading session from {}", session_path.display()))?;
        Ok(Self {
            config,
            identity: Arc::new(identity),
            history: Arc::new(RouteHistory::new()),
        })
    }

    fn open_store(&self) -> anyhow::Result<Arc<SqliteStore>> {
        let path = self.config.database_path();
        let store = SqliteStore::open(&path)
            .with_context(|| format!("opening document store at {}", path.display()))?;
        Ok(Arc::new(store))
    }

    fn context(&self) -> anyhow::Result<ScreenContext> {
        Ok(ScreenContext::new(
            self.identity.clone(),
            self.open_store()?,
            self.history.clone(),
            Arc::new(ConsoleNotifier),
        )
        .with_banner_duration(self.config.success_banner()))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
        Command::Login(login) => handle_login(&App::new(config)?, &login.email),
        Command::Logout => handle_logout(&App::new(config)?).await,
        Command::Welcome => handle_welcome(&App::new(config)?).await,
        Command::Form(form_cmd) => handle_form(&App::new(config)?, form_cmd).await,
        Command::Devices(devices_cmd) => handle_devices(&App::new(config)?, devices_cmd).await,
        Command::Status(status_cmd) => handle_status(&App::new(config)?, status_cmd.json),
    }
}

/// Print where the gate sent an unauthenticated visitor.
fn redirected(app: &App) -> ExitCode {
    let route = app.history.current().unwrap_or(Route::Login);
    eprintln!("Sessão não encontrada. Redirecionando para {route}");
    eprintln!("Use `cadastro login --email <EMAIL>` para entrar.");
    ExitCode::FAILURE
}

fn handle_login(app: &App, email: &str) -> anyhow::Result<ExitCode> {
    if !is_valid_email(email.trim()) {
        eprintln!("Email inválido: {email}");
        return Ok(ExitCode::FAILURE);
    }
    let session = Session::for_email(email);
    app.identity.sign_in(session.clone())?;
    println!("Sessão iniciada para {} ({})", session.email, session.uid);
    Ok(ExitCode::SUCCESS)
}

async fn handle_logout(app: &App) -> anyhow::Result<ExitCode> {
    let mut screen = WelcomeScreen::mount(app.context()?);
    if screen.start().await == Phase::Redirected {
        return Ok(redirected(app));
    }

    let signed_out = screen.sign_out().await;
    screen.unmount();
    if signed_out {
        println!("Sessão encerrada.");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Não foi possível encerrar a sessão.");
        Ok(ExitCode::FAILURE)
    }
}

async fn handle_welcome(app: &App) -> anyhow::Result<ExitCode> {
    let mut screen = WelcomeScreen::mount(app.context()?);
    if screen.start().await == Phase::Redirected {
        return Ok(redirected(app));
    }

    if let Some(email) = screen.greeting() {
        print!("{}", render_welcome(email));
    }
    screen.unmount();
    Ok(ExitCode::SUCCESS)
}

async fn handle_form(app: &App, cmd: FormCommand) -> anyhow::Result<ExitCode> {
    let mut screen = FormScreen::<ProfileForm>::mount(app.context()?);
    if screen.start().await == Phase::Redirected {
        return Ok(redirected(app));
    }

    let code = match cmd {
        FormCommand::Show => ExitCode::SUCCESS,
        FormCommand::Submit(args) => submit_profile(&mut screen, &args).await,
    };

    if let Some(view) = screen.view() {
        print!("{}", render_form(&view));
    }
    screen.unmount();
    Ok(code)
}

async fn submit_profile(screen: &mut FormScreen<ProfileForm>, args: &ProfileArgs) -> ExitCode {
    for (field, value) in args.inputs() {
        screen.update(field, value);
    }
    report(screen.submit().await)
}

async fn handle_devices(app: &App, cmd: DevicesCommand) -> anyhow::Result<ExitCode> {
    let mut screen = DeviceScreen::mount(app.context()?);
    if screen.start().await == Phase::Redirected {
        return Ok(redirected(app));
    }

    let code = match cmd {
        DevicesCommand::List { format } => {
            print_devices(&screen, format)?;
            ExitCode::SUCCESS
        }
        DevicesCommand::Add(args) => {
            let code = add_device(&mut screen, &args).await;
            if let Some(view) = screen.view() {
                print!("{}", render_form(&view));
            }
            print_devices(&screen, OutputFormat::Plain)?;
            code
        }
    };
    screen.unmount();
    Ok(code)
}

async fn add_device(screen: &mut DeviceScreen, args: &DeviceArgs) -> ExitCode {
    for (field, value) in args.inputs() {
        screen.update(field, value);
    }
    report(screen.submit().await)
}

fn print_devices(screen: &DeviceScreen, format: OutputFormat) -> anyhow::Result<()> {
    let cards = screen.cards();
    match format {
        OutputFormat::Plain => {
            let rendered = render_cards(&cards);
            if rendered.is_empty() {
                println!("Nenhum dispositivo cadastrado.");
            } else {
                print!("{rendered}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&cards)?),
    }
    Ok(())
}

fn report(outcome: SubmitOutcome) -> ExitCode {
    match outcome {
        SubmitOutcome::Created(id) => {
            debug!(id = %id, "Submission stored");
            ExitCode::SUCCESS
        }
        SubmitOutcome::Invalid(violations) => {
            for violation in violations {
                eprintln!("✗ {violation}");
            }
            ExitCode::FAILURE
        }
        // Store failures were already shown by the notifier
        SubmitOutcome::Failed(_) | SubmitOutcome::Ignored | SubmitOutcome::Abandoned => {
            ExitCode::FAILURE
        }
    }
}

fn handle_status(app: &App, json: bool) -> anyhow::Result<ExitCode> {
    let store = app.open_store()?;
    let state = app.identity.state();
    let session = state.session();

    let counts = Collection::ALL
        .into_iter()
        .map(|c| Ok((c.name(), store.count(c)?)))
        .collect::<cadastro::Result<Vec<_>>>()?;

    if json {
        let status = serde_json::json!({
            "signed_in": matches!(state, AuthState::SignedIn(_)),
            "email": session.map(|s| s.email.as_str()),
            "user_id": session.map(|s| s.uid.as_str()),
            "database_path": store.path(),
            "session_path": app.config.session_path(),
            "records": counts.iter().copied().collect::<std::collections::BTreeMap<_, _>>(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("cadastro status");
        println!("---------------");
        match session {
            Some(s) => println!("Session:       {} ({})", s.email, s.uid),
            None => println!("Session:       none"),
        }
        println!("Database:      {}", store.path().display());
        println!("Session file:  {}", app.config.session_path().display());
        for (name, count) in &counts {
            println!("{:<14} {count}", format!("{name}:"));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Session]");
                println!("  Session path:       {}", config.session_path().display());
                println!();
                println!("[UI]");
                println!("  Success banner:     {} ms", config.ui.success_banner_ms);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
