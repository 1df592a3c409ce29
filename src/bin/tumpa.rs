use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tracing::error;

use tumpa::adapters::{SimulatedCard, SimulatedKeyStore};
use tumpa::api::{
    simulated_session_with, Confirmation, Fingerprint, NewKeyParams, SimulatedSession,
    SubkeyMask,
};
use tumpa::logic::encode;
use tumpa::{export, Outcome, SessionConfig, TumpaError, Workflow};

#[derive(Parser, Debug)]
#[command(name = "tumpa")]
#[command(about = "OpenPGP smartcard provisioning session (simulated card)", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Delay between two presence queries, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Start with the simulated card unplugged
    #[arg(long)]
    pub card_absent: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// One line of a `script` run
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct ScriptLine {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List keys, newest first
    Keys,

    /// Generate a new key in the key store
    Generate {
        #[arg(long)]
        name: String,

        /// Email address; repeat for several user ids
        #[arg(long = "email", required = true)]
        emails: Vec<String>,

        #[arg(long)]
        passphrase: String,

        #[arg(long)]
        no_encryption: bool,

        #[arg(long)]
        no_signing: bool,

        #[arg(long)]
        no_authentication: bool,
    },

    /// Upload subkeys of a key to the card
    Upload {
        /// Key to upload. Defaults to the selected (most recently generated) key
        #[arg(long)]
        fingerprint: Option<String>,

        #[arg(long)]
        admin_pin: String,

        /// Passphrase of the key
        #[arg(long)]
        passphrase: String,

        /// Subkeys to upload. Defaults to every subkey the key has
        #[arg(long, value_delimiter = ',')]
        subkeys: Vec<SubkeyArg>,
    },

    /// Change the user pin
    ChangeUserPin {
        #[arg(long)]
        admin_pin: String,

        #[arg(long)]
        new_pin: String,
    },

    /// Change the admin pin
    ChangeAdminPin {
        #[arg(long)]
        admin_pin: String,

        #[arg(long)]
        new_admin_pin: String,
    },

    /// Set the cardholder name ("First Middle Last")
    SetName {
        #[arg(long)]
        admin_pin: String,

        #[arg(long)]
        name: String,
    },

    /// Set the public key URL
    SetUrl {
        #[arg(long)]
        admin_pin: String,

        #[arg(long)]
        url: String,
    },

    /// Factory-reset the card
    Reset {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Print presence reports from the poller
    Watch {
        #[arg(long, default_value_t = 3)]
        cycles: usize,
    },

    /// Write a public key to <DIR>/<FINGERPRINT>.pub
    Export {
        #[arg(long)]
        fingerprint: Option<String>,

        #[arg(long)]
        dir: PathBuf,
    },

    /// Run commands read from stdin, one per line, in a single session
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SubkeyArg {
    Encryption,
    Signing,
    Authentication,
}

fn subkey_mask(args: &[SubkeyArg]) -> SubkeyMask {
    encode(
        args.contains(&SubkeyArg::Encryption),
        args.contains(&SubkeyArg::Signing),
        args.contains(&SubkeyArg::Authentication),
    )
}

fn parse_fingerprint(value: Option<&str>) -> anyhow::Result<Option<Fingerprint>> {
    value
        .map(|v| v.parse::<Fingerprint>())
        .transpose()
        .context("invalid fingerprint")
}

/// Where the reset confirmation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Terminal,
    Disabled,
}

fn confirm_reset(prompt: Prompt) -> anyhow::Result<Confirmation> {
    if prompt == Prompt::Disabled {
        return Ok(Confirmation::Declined);
    }
    eprint!("This will erase all keys and data on the smartcard. Are you sure? [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(Confirmation::from_answer(&answer))
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::KeyGenerated(key) => {
            println!("{}", outcome.message().unwrap_or_default());
            println!("{}", key.fingerprint);
        }
        Outcome::Declined => println!("Reset cancelled."),
        Outcome::Completed { message, .. } => println!("{}", message),
    }
}

fn run_workflow(session: &mut SimulatedSession, workflow: Workflow) -> anyhow::Result<()> {
    let outcome = session.request_workflow(workflow)?;
    report(&outcome);
    Ok(())
}

fn run_command(
    session: &mut SimulatedSession,
    command: Commands,
    prompt: Prompt,
) -> anyhow::Result<()> {
    match command {
        Commands::Keys => {
            for key in session.keys() {
                println!(
                    "{}  {}  {}",
                    key.fingerprint,
                    key.created_at.format("%Y-%m-%d %H:%M:%S"),
                    key.primary_user_id().unwrap_or("")
                );
            }
        }

        Commands::Generate {
            name,
            emails,
            passphrase,
            no_encryption,
            no_signing,
            no_authentication,
        } => {
            let params = NewKeyParams {
                name,
                emails,
                passphrase,
                subkeys: encode(!no_encryption, !no_signing, !no_authentication),
            };
            run_workflow(session, Workflow::GenerateKey(params))?;
        }

        Commands::Upload {
            fingerprint,
            admin_pin,
            passphrase,
            subkeys,
        } => {
            let fingerprint = parse_fingerprint(fingerprint.as_deref())?;
            let subkeys = if subkeys.is_empty() {
                let target = match &fingerprint {
                    Some(fingerprint) => Some(fingerprint.clone()),
                    None => session.selected_key().map(|k| k.fingerprint.clone()),
                };
                match target {
                    Some(fingerprint) => session.upload_prompt(&fingerprint)?.default_selection(),
                    None => SubkeyMask::ALL,
                }
            } else {
                subkey_mask(&subkeys)
            };
            run_workflow(
                session,
                Workflow::UploadKey {
                    fingerprint,
                    admin_pin,
                    passphrase,
                    subkeys,
                },
            )?;
        }

        Commands::ChangeUserPin { admin_pin, new_pin } => {
            run_workflow(session, Workflow::ChangeUserPin { admin_pin, new_pin })?;
        }

        Commands::ChangeAdminPin {
            admin_pin,
            new_admin_pin,
        } => {
            run_workflow(
                session,
                Workflow::ChangeAdminPin {
                    admin_pin,
                    new_admin_pin,
                },
            )?;
        }

        Commands::SetName { admin_pin, name } => {
            run_workflow(session, Workflow::SetCardholderName { admin_pin, name })?;
        }

        Commands::SetUrl { admin_pin, url } => {
            run_workflow(session, Workflow::SetPublicKeyUrl { admin_pin, url })?;
        }

        Commands::Reset { yes } => {
            let confirmation = if yes {
                Confirmation::Affirmative
            } else {
                confirm_reset(prompt)?
            };
            run_workflow(session, Workflow::ResetToken(confirmation))?;
        }

        Commands::Watch { cycles } => {
            let timeout = session.config().poll_interval * 5;
            for _ in 0..cycles {
                match session.wait_for_presence(timeout) {
                    Some(true) => println!("card present"),
                    Some(false) => println!("card absent"),
                    None => bail!("no presence report within {:?}", timeout),
                }
            }
        }

        Commands::Export { fingerprint, dir } => {
            let key = match parse_fingerprint(fingerprint.as_deref())? {
                Some(fingerprint) => session
                    .keys()
                    .iter()
                    .find(|k| k.fingerprint == fingerprint)
                    .with_context(|| format!("key {} not found", fingerprint))?,
                None => session
                    .selected_key()
                    .context("no key selected; pass --fingerprint")?,
            };
            let path = export::write_public_key(key, &dir)
                .with_context(|| format!("failed to export to {}", dir.display()))?;
            println!("{}", path.display());
        }

        Commands::Script => bail!("script cannot be nested"),
    }
    Ok(())
}

fn run_script(session: &mut SimulatedSession) -> anyhow::Result<()> {
    let mut failures = 0usize;
    for (number, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        let words = match shell_words::split(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("line {}: {}", number + 1, e);
                failures += 1;
                continue;
            }
        };
        if words.is_empty() || words[0].starts_with('#') {
            continue;
        }

        let command = match ScriptLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            Err(e) => {
                eprintln!("line {}: {}", number + 1, e);
                failures += 1;
                continue;
            }
        };

        session.process_presence_events();
        if let Err(e) = run_command(session, command, Prompt::Disabled) {
            eprintln!("line {}: {:#}", number + 1, e);
            failures += 1;
        }
    }

    if failures > 0 {
        bail!("{} script command(s) failed", failures);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(cli.verbosity.tracing_level_filter())
        .init();

    let config = SessionConfig::default()
        .with_poll_interval(Duration::from_millis(cli.poll_interval_ms.max(1)));
    let card = if cli.card_absent {
        SimulatedCard::absent()
    } else {
        SimulatedCard::new()
    };
    let mut session = simulated_session_with(card, SimulatedKeyStore::new(), config);
    session.start().context("failed to start session")?;

    let result = match cli.command {
        Commands::Script => run_script(&mut session),
        command => run_command(&mut session, command, Prompt::Terminal),
    };

    session.shutdown();

    if let Err(e) = &result {
        if let Some(TumpaError::Validation(validation)) = e.downcast_ref::<TumpaError>() {
            error!(field = validation.field(), "Invalid input");
        }
    }
    result
}
