use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use portal_session::config::{AuthConfig, ConfigError};
use portal_session::guard::{self, RoleSet};
use portal_session::{AuthServiceError, HttpAuthService, Session, SessionManager, TieredStore};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("auth client setup failed: {0}")]
    Service(#[from] AuthServiceError),
    #[error("{0}")]
    Failed(String),
}

#[derive(Parser, Debug)]
#[command(name = "portal-session", about = "Portal login session CLI")]
struct Cli {
    #[arg(long, env = "AUTH_API_BASE_URL")]
    base_url: Option<String>,

    /// Persistent ("remember me") tier file.
    #[arg(long, env = "SESSION_STORE_PATH")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the stored session and gate decision.
    Status,
    Login(Credentials),
    Logout,
    /// Single-step signup.
    Signup(SignupArgs),
    /// Email a signup verification code.
    SignupStart(EmailArg),
    SignupVerify(OtpArgs),
    SignupComplete(SignupArgs),
    ForgotPassword(EmailArg),
    VerifyOtp(OtpArgs),
    ResetPassword(ResetArgs),
}

#[derive(Args, Debug)]
struct EmailArg {
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct Credentials {
    #[arg(long)]
    email: String,
    #[arg(long, env = "PORTAL_PASSWORD")]
    password: String,
}

#[derive(Args, Debug)]
struct SignupArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "PORTAL_PASSWORD")]
    password: String,
}

#[derive(Args, Debug)]
struct OtpArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    otp: String,
}

#[derive(Args, Debug)]
struct ResetArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    otp: String,
    #[arg(long, env = "PORTAL_NEW_PASSWORD")]
    new_password: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = AuthConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_owned();
    }
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    let service = Arc::new(HttpAuthService::from_config(&config)?);
    let manager = SessionManager::start(service, TieredStore::with_file(&config.store_path));
    let roles = RoleSet::new(config.elevated_roles.iter().cloned());

    match cli.command {
        Command::Status => {
            print_status(&manager.snapshot(), &roles);
            return Ok(());
        }
        Command::Login(c) => manager.login(&c.email, &c.password).await,
        Command::Logout => manager.logout().await,
        Command::Signup(s) => manager.signup(&s.name, &s.email, &s.password).await,
        Command::SignupStart(e) => manager.initiate_signup(&e.email).await,
        Command::SignupVerify(o) => manager.verify_signup_otp(&o.email, &o.otp).await,
        Command::SignupComplete(s) => manager.complete_signup(&s.email, &s.name, &s.password).await,
        Command::ForgotPassword(e) => {
            manager.forgot_password(&e.email).await;
        }
        Command::VerifyOtp(o) => {
            manager.verify_otp(&o.email, &o.otp).await;
        }
        Command::ResetPassword(r) => {
            manager.reset_password(&r.email, &r.otp, &r.new_password).await;
        }
    }

    report(&manager.snapshot())
}

fn print_status(session: &Session, roles: &RoleSet) {
    match &session.user {
        Some(user) => {
            let name = user.name.as_deref().or(user.email.as_deref()).unwrap_or(&user.id);
            println!("signed in as {name} (role: {})", session.role.as_deref().unwrap_or("none"));
        }
        None => println!("not signed in"),
    }
    let decision = guard::decide(session, roles);
    println!("gate: {decision:?}");
    if let Some(target) = guard::redirect_target(&decision) {
        println!("redirect: {target}");
    }
}

fn report(session: &Session) -> Result<(), CliError> {
    if let Some(details) = &session.validation_errors {
        for detail in details {
            eprintln!("  - {detail}");
        }
    }
    if let Some(error) = &session.error {
        return Err(CliError::Failed(error.clone()));
    }
    if let Some(message) = &session.success_message {
        println!("{message}");
    } else if let Some(user) = &session.user {
        println!("signed in as {}", user.email.as_deref().unwrap_or(&user.id));
    } else {
        println!("ok");
    }
    Ok(())
}
