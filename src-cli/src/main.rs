//! GoBarber command-line client
//!
//! Drives the same operations a graphical front-end would, one subcommand
//! per screen action. The session persists between invocations.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use gobarber_core::{
    next_work_day, AppContext, Calendar, Config, CoreError, ForgotPasswordForm, GoBarber,
    ProfileForm, ResetPasswordForm, SignInForm, SignUpForm, UserProfile,
};

#[derive(Parser, Debug)]
#[command(name = "gobarber", about = "GoBarber booking client")]
struct Cli {
    /// Base URL of the booking API
    #[arg(long, env = "GOBARBER_API_URL")]
    api_url: Option<String>,

    /// Local storage database
    #[arg(long, env = "GOBARBER_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "GOBARBER_PASSWORD")]
        password: String,
    },
    SignUp {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "GOBARBER_PASSWORD")]
        password: String,
    },
    SignOut,
    Whoami,
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    ResetPassword {
        /// Reset link from the recovery email, or just its `?token=` query
        link: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        password_confirmation: String,
    },
    /// Update the signed-in profile. Omitted fields keep their current value.
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "")]
        old_password: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        password_confirmation: String,
    },
    Avatar {
        file: PathBuf,
    },
    /// Provider availability for a month (defaults to the current one)
    Availability {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Provider appointments for a day (defaults to the next work day)
    Schedule {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    gobarber_core::init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{field}: {message}");
            }
        }
        _ => eprintln!("error: {err:#}"),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let context = AppContext::new();
    context.install(GoBarber::new(config)?);

    let session = context.session()?;
    session.on_change(|state| {
        tracing::info!(
            state = %state,
            user_id = state.user().map(|u| u.id.as_str()).unwrap_or("-"),
            "Session changed"
        );
    });

    let app = context.app()?;
    match cli.command {
        Command::SignIn { email, password } => {
            let user = app.sign_in(SignInForm { email, password }).await?;
            print_user(&user)?;
        }
        Command::SignUp {
            name,
            email,
            password,
        } => {
            app.sign_up(SignUpForm {
                name,
                email,
                password,
            })
            .await?;
            println!("Account created. You can now sign in.");
        }
        Command::SignOut => app.sign_out(),
        Command::Whoami => match app.current_user() {
            Some(user) => print_user(&user)?,
            None => bail!("not signed in"),
        },
        Command::ForgotPassword { email } => {
            app.forgot_password(ForgotPasswordForm { email }).await?;
            println!("Recovery email sent.");
        }
        Command::ResetPassword {
            link,
            password,
            password_confirmation,
        } => {
            let query = link.split_once('?').map_or(link.as_str(), |(_, q)| q);
            let form = ResetPasswordForm {
                password,
                password_confirmation,
            };
            app.reset_password(form, query).await?;
            println!("Password reset.");
        }
        Command::Profile {
            name,
            email,
            old_password,
            password,
            password_confirmation,
        } => {
            let current = app.current_user().ok_or(CoreError::NotAuthenticated)?;
            let form = ProfileForm {
                name: name.unwrap_or(current.name),
                email: email.unwrap_or(current.email),
                old_password,
                password,
                password_confirmation,
            };
            let user = app.update_profile(form).await?;
            print_user(&user)?;
        }
        Command::Avatar { file } => {
            let user = app
                .update_avatar(&file)
                .await
                .with_context(|| format!("uploading {}", file.display()))?;
            print_user(&user)?;
        }
        Command::Availability { year, month } => {
            let today = Local::now().date_naive();
            let mut calendar = Calendar::new(today);
            if year.is_some() || month.is_some() {
                let selected = calendar.selected_month();
                let year = year.unwrap_or(selected.year());
                let month = month.unwrap_or(selected.month());
                let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
                    bail!("invalid month {year}-{month}");
                };
                if !calendar.change_month(first) {
                    bail!("{year}-{month:02} is in the past");
                }
            }

            app.load_calendar(&mut calendar).await?;
            let month = calendar.selected_month();
            for day in month.iter_days().take_while(|d| d.month() == month.month()) {
                let status = if !calendar.is_available(day) {
                    "closed"
                } else if calendar.is_disabled(day) {
                    "unavailable"
                } else {
                    "available"
                };
                println!("{} {:<9} {status}", day, day.format("%A"));
            }
        }
        Command::Schedule { date } => {
            let date = date.unwrap_or_else(|| next_work_day(Local::now().date_naive()));
            let schedule = app.day_schedule(date).await?;

            println!("{}", date.format("%A, %B %-d %Y"));
            if let Some(next) = &schedule.next_appointment {
                println!(
                    "Next: {} at {}",
                    next.appointment.customer.name, next.formatted_hour
                );
            }
            for (label, slots) in [
                ("Morning", &schedule.morning),
                ("Afternoon", &schedule.afternoon),
            ] {
                println!("{label}:");
                if slots.is_empty() {
                    println!("  no appointments");
                }
                for slot in slots {
                    println!("  {} {}", slot.formatted_hour, slot.appointment.customer.name);
                }
            }
        }
    }

    Ok(())
}

fn print_user(user: &UserProfile) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(user)?);
    Ok(())
}
