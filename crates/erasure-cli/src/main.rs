//! `erasure` - delete your account from the terminal

mod settings;
mod shell;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use erasure_core::{AccountDeletionWorkflow, IdentityService, RecordStore};
use erasure_firebase::{FirebaseClient, FirebaseConfig};
use shell::{FormInput, Outcome, Shell};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// `--countdown` without a value; matches `erasure_core::DEFAULT_COUNTDOWN_SECS`
const DEFAULT_COUNTDOWN_ARG: &str = "5";

type Backends = (Arc<dyn IdentityService>, Arc<dyn RecordStore>);

fn cli() -> Command {
    let delete = Command::new("delete")
        .about("Delete the account after re-authenticating")
        .arg(
            Arg::new("email")
                .long("email")
                .help("Account email (prompted when omitted)"),
        )
        .arg(
            Arg::new("password-stdin")
                .long("password-stdin")
                .action(ArgAction::SetTrue)
                .help("Read the password from the first line of stdin"),
        )
        .arg(
            Arg::new("countdown")
                .long("countdown")
                .value_name("SECONDS")
                .num_args(0..=1)
                .default_missing_value(DEFAULT_COUNTDOWN_ARG)
                .value_parser(value_parser!(u32))
                .help("Wait before deleting, cancellable with Ctrl-C (default 5 seconds)"),
        )
        .arg(
            Arg::new("yes")
                .long("yes")
                .short('y')
                .action(ArgAction::SetTrue)
                .help("Skip the confirmation dialog"),
        );

    #[cfg(feature = "demo")]
    let delete = delete.arg(
        Arg::new("memory")
            .long("memory")
            .action(ArgAction::SetTrue)
            .help("Run against an in-memory demo account"),
    );

    Command::new("erasure")
        .version(erasure_core::VERSION)
        .about("Permanently delete your account and all associated data")
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML settings file"),
        )
        .subcommand(delete)
        .subcommand(Command::new("check-config").about("Report Firebase environment configuration"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let config_path = matches.get_one::<PathBuf>("config").cloned();

    let code = match matches.subcommand() {
        Some(("delete", args)) => match delete(args, config_path).await {
            Ok(outcome) => outcome.exit_code(),
            Err(e) => {
                tracing::error!("{:#}", e);
                1
            }
        },
        Some(("check-config", _)) => check_config(),
        _ => 2,
    };

    std::process::exit(code);
}

async fn delete(args: &ArgMatches, config_path: Option<PathBuf>) -> anyhow::Result<Outcome> {
    let countdown = args.get_one::<u32>("countdown").copied();
    let config = settings::resolve(config_path.as_deref(), countdown)?;

    let (identity, records) = backends(args)?;
    let workflow = AccountDeletionWorkflow::new(config, identity, records)?;
    let form = FormInput {
        email: args.get_one::<String>("email").cloned(),
        password_stdin: args.get_flag("password-stdin"),
        assume_yes: args.get_flag("yes"),
    };

    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stdin = std::io::stdin();
    let mut shell = Shell::new(stdin.lock(), std::io::stdout());
    shell.run(&workflow, &form, interrupt).await
}

#[cfg_attr(not(feature = "demo"), allow(unused_variables))]
fn backends(args: &ArgMatches) -> anyhow::Result<Backends> {
    #[cfg(feature = "demo")]
    if args.get_flag("memory") {
        use erasure_test_utils::{seeded_backends, DEMO_EMAIL, DEMO_PASSWORD};

        tracing::info!("Using in-memory demo account {} / {}", DEMO_EMAIL, DEMO_PASSWORD);
        let (identity, records) = seeded_backends();
        return Ok((
            identity as Arc<dyn IdentityService>,
            records as Arc<dyn RecordStore>,
        ));
    }

    let firebase = FirebaseConfig::from_env().context("Firebase is not configured")?;
    let client = FirebaseClient::connect(firebase)?;
    Ok((client.identity(), client.records()))
}

fn check_config() -> i32 {
    let missing = FirebaseConfig::missing_from(|name| std::env::var(name).ok());
    match FirebaseConfig::from_env() {
        Ok(config) => {
            println!("Firebase project: {}", config.project_id);
            println!("Auth endpoint: {}", config.auth_endpoint);
            println!("Firestore endpoint: {}", config.firestore_endpoint);
            if missing.is_empty() {
                println!("All Firebase variables are set.");
            } else {
                println!("Unset (optional): {}", missing.join(", "));
            }
            0
        }
        Err(e) => {
            println!("{e}");
            1
        }
    }
}
