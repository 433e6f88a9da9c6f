//! `device-inventory`: command-line client for the device inventory API.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use device_inventory::api::DeviceId;
use device_inventory::logging;

/// Device inventory client.
#[derive(Parser, Debug)]
#[command(name = "device-inventory", version, about = "Device inventory client")]
struct Cli {
    /// Path to config file (default: <config dir>/device-inventory/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL from the config file.
    #[arg(long = "api-url", global = true)]
    api_url: Option<String>,

    /// Log debug output.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session token.
    Login {
        #[arg(long)]
        email: String,
        /// Prompted on stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account and log in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted on stdin when omitted.
        #[arg(long)]
        password: Option<String>,
        /// Must match the password. Prompted on stdin when omitted.
        #[arg(long = "password-confirmation")]
        password_confirmation: Option<String>,
    },

    /// Forget the stored session.
    Logout,

    /// List devices matching the saved filters.
    List {
        /// One-based page number.
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Page size (default from config).
        #[arg(long = "per-page")]
        per_page: Option<u32>,
    },

    /// Show or edit the saved filters.
    Filter {
        #[command(subcommand)]
        action: FilterAction,
    },

    /// Show one device.
    Show { id: DeviceId },

    /// Add a device.
    Add {
        #[command(flatten)]
        fields: DeviceFields,
    },

    /// Change a device. Omitted fields keep their current value.
    Edit {
        id: DeviceId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// YYYY-MM-DD.
        #[arg(long = "purchase-date")]
        purchase_date: Option<chrono::NaiveDate>,
        #[arg(long = "in-use")]
        in_use: Option<bool>,
    },

    /// Flip a device between "in use" and "available".
    Toggle { id: DeviceId },

    /// Delete a device.
    Remove {
        id: DeviceId,
        /// Skip confirmation.
        #[arg(long = "yes", short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum FilterAction {
    /// Print the saved filters.
    Show,
    /// Set one filter: location, in_use, date_from or date_to.
    Set { key: String, value: String },
    /// Clear one filter.
    Unset { key: String },
    /// Clear all filters.
    Clear,
}

#[derive(clap::Args, Debug)]
struct DeviceFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    location: String,
    /// YYYY-MM-DD.
    #[arg(long = "purchase-date")]
    purchase_date: chrono::NaiveDate,
    #[arg(long = "in-use")]
    in_use: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is::<commands::Reported>() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = commands::Context::load(cli.config.as_deref(), cli.api_url.as_deref())?;

    match cli.command {
        Command::Login { email, password } => {
            let password = commands::password_or_prompt(password)?;
            ctx.login(&email, &password).await
        }
        Command::Register {
            name,
            email,
            password,
            password_confirmation,
        } => {
            let password = commands::password_or_prompt(password)?;
            let confirmation = commands::confirmation_or_prompt(password_confirmation)?;
            ctx.register(&name, &email, &password, &confirmation).await
        }
        Command::Logout => ctx.logout(),
        Command::List { page, per_page } => ctx.list(page, per_page).await,
        Command::Filter { action } => match action {
            FilterAction::Show => ctx.filter_show(),
            FilterAction::Set { key, value } => ctx.filter_set(&key, &value),
            FilterAction::Unset { key } => ctx.filter_unset(&key),
            FilterAction::Clear => ctx.filter_clear(),
        },
        Command::Show { id } => ctx.show(id).await,
        Command::Add { fields } => ctx.add(fields.into_payload()).await,
        Command::Edit {
            id,
            name,
            location,
            purchase_date,
            in_use,
        } => {
            let changes = commands::DeviceChanges {
                name,
                location,
                purchase_date,
                in_use,
            };
            ctx.edit(id, changes).await
        }
        Command::Toggle { id } => ctx.toggle(id).await,
        Command::Remove { id, yes } => ctx.remove(id, yes).await,
    }
}

impl DeviceFields {
    fn into_payload(self) -> device_inventory::api::DevicePayload {
        device_inventory::api::DevicePayload::new(
            self.name,
            self.location,
            self.purchase_date,
            self.in_use,
        )
    }
}
