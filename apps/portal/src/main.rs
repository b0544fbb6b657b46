use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portal::api_client::JobsApi;
use portal::auth::otp_flow::FlowKind;
use portal::auth::{self, password_login};
use portal::config::Config;
use portal::feed::filter::SalaryRange;
use portal::models::{JobId, Role};
use portal::notifications::Level;
use portal::state::{AppContext, Navigation};

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(version)]
#[command(about = "Job board portal client")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse, bookmark and apply to jobs
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Sign in, reset a password or sign out
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand, Debug)]
enum JobCommands {
    /// List one page of the filtered feed
    List {
        /// Case-insensitive match on title, organization or location
        #[arg(long, short = 'q', default_value = "")]
        query: String,

        #[arg(long)]
        job_type: Option<String>,

        /// Experience bucket, e.g. "1-3 years"
        #[arg(long)]
        experience: Option<String>,

        #[arg(long)]
        salary_min: Option<u64>,

        #[arg(long)]
        salary_max: Option<u64>,

        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Show a single job
    Show { id: String },

    /// Toggle the bookmark on a job (candidates only)
    Bookmark { id: String },

    /// Apply to a job (candidates only)
    Apply { id: String },
}

#[derive(Subcommand, Debug)]
enum AuthCommands {
    /// Sign in. Candidates receive a one-time code; other roles use a password.
    Login {
        email: String,

        #[arg(long, value_enum, default_value = "candidate")]
        role: RoleArg,

        /// Where to land after sign-in
        #[arg(long)]
        redirect: Option<String>,
    },

    /// Reset a password with an emailed code
    ResetPassword {
        email: String,

        #[arg(long, value_enum, default_value = "candidate")]
        role: RoleArg,
    },

    Logout,

    /// Print the signed-in user
    Whoami,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum RoleArg {
    Candidate,
    Client,
    Recruiter,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Candidate => Role::Candidate,
            RoleArg::Client => Role::Client,
            RoleArg::Recruiter => Role::Recruiter,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    info!("Portal v{} against {}", env!("CARGO_PKG_VERSION"), config.api_url);

    let ctx = AppContext::connect(config);
    let outcome = match args.command {
        Commands::Jobs { command } => run_jobs(&ctx, command).await,
        Commands::Auth { command } => run_auth(&ctx, command).await,
    };
    print_notifications(&ctx);
    outcome
}

async fn run_jobs(ctx: &AppContext, command: JobCommands) -> Result<()> {
    match command {
        JobCommands::List {
            query,
            job_type,
            experience,
            salary_min,
            salary_max,
            page,
        } => {
            ctx.refresh_feed().await?;
            let mut feed = ctx.feed.lock().unwrap_or_else(|e| e.into_inner());
            feed.set_query(query);
            feed.set_job_type(job_type);
            feed.set_experience(experience);
            if salary_min.is_some() || salary_max.is_some() {
                let bounds = feed.salary_bounds();
                feed.set_salary_range(SalaryRange::new(
                    salary_min.unwrap_or(bounds.min),
                    salary_max.unwrap_or(bounds.max),
                ));
            }
            feed.set_page(page);

            let view = feed.page();
            for item in &view.items {
                let marks = match (item.bookmarked, item.applied) {
                    (_, true) => "[applied]",
                    (true, false) => "[saved]",
                    _ => "",
                };
                println!(
                    "{:<26} {} @ {} ({}) {}-{} {} {}",
                    item.job.id,
                    item.job.title,
                    item.job.organization,
                    item.job.location,
                    item.job.salary_min,
                    item.job.salary_max,
                    item.job.experience_bucket(),
                    marks
                );
            }
            println!(
                "page {}/{} ({} matching)",
                view.page,
                view.total_pages.max(1),
                view.total_items
            );
        }
        JobCommands::Show { id } => {
            let job = ctx
                .jobs
                .job_detail(&JobId(id))
                .await
                .map_err(|e| e.notify(&ctx.notifications))?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        JobCommands::Bookmark { id } => {
            ctx.refresh_feed().await?;
            let saved = ctx.bookmarks().toggle(&JobId(id)).await?;
            println!("{}", if saved { "saved" } else { "not saved" });
        }
        JobCommands::Apply { id } => {
            ctx.refresh_feed().await?;
            ctx.applications().apply(&JobId(id)).await?;
        }
    }
    Ok(())
}

async fn run_auth(ctx: &AppContext, command: AuthCommands) -> Result<()> {
    match command {
        AuthCommands::Login {
            email,
            role,
            redirect,
        } => {
            let role = Role::from(role);
            let nav = if role == Role::Candidate {
                let mut flow = ctx.login_flow(redirect);
                flow.submit_identifier(&email).await?;
                print_notifications(ctx);
                let code = prompt("Code: ")?;
                flow.submit_code(&code)
                    .await?
                    .context("login finished without a landing page")?
            } else {
                let password = prompt("Password: ")?;
                password_login(
                    ctx.auth.as_ref(),
                    &ctx.session,
                    &ctx.notifications,
                    &email,
                    &password,
                    role,
                    redirect,
                )
                .await?
            };
            print_navigation(&nav);
        }
        AuthCommands::ResetPassword { email, role } => {
            let mut flow = ctx.otp_flow(FlowKind::PasswordReset(role.into()), None);
            flow.submit_identifier(&email).await?;
            print_notifications(ctx);
            let code = prompt("Code: ")?;
            if flow.submit_code(&code).await?.is_some() {
                bail!("password reset ended without asking for a new password");
            }
            let password = prompt("New password: ")?;
            let confirmation = prompt("Confirm password: ")?;
            let nav = flow.submit_new_password(&password, &confirmation).await?;
            print_navigation(&nav);
        }
        AuthCommands::Logout => {
            let nav = auth::logout(&ctx.session, &ctx.notifications);
            print_navigation(&nav);
        }
        AuthCommands::Whoami => match ctx.session.current() {
            Some(s) => println!("{} <{}> ({})", s.display_name(), s.email, s.role),
            None => println!("not signed in"),
        },
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_navigation(nav: &Navigation) {
    println!("-> {}", nav.0);
}

fn print_notifications(ctx: &AppContext) {
    for n in ctx.notifications.drain() {
        let tag = match n.level {
            Level::Info => "info",
            Level::Success => "ok",
            Level::Error => "error",
        };
        eprintln!("[{tag}] {}", n.message);
    }
}
