//! Command handlers for the `device-inventory` binary.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use device_inventory::api::{
    ApiClient, AuthSession, Device, DeviceApi, DeviceClient, DeviceId, DevicePayload,
    SessionStore,
};
use device_inventory::config::Config;
use device_inventory::filters::{FilterKey, FilterStateStore};
use device_inventory::storage::{FileStore, KeyValueStore};
use device_inventory::ui::device_list::{DeviceListPresenter, LoadPhase};
use device_inventory::ui::notify::{Confirm, Notifier};

/// Failure already shown to the user through the notifier.
#[derive(Debug, Error)]
#[error("command failed")]
pub struct Reported;

/// Fields to change on `edit`.
#[derive(Debug, Default)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub in_use: Option<bool>,
}

impl DeviceChanges {
    fn apply(self, payload: &mut DevicePayload) {
        if let Some(name) = self.name {
            payload.name = name;
        }
        if let Some(location) = self.location {
            payload.location = location;
        }
        if let Some(date) = self.purchase_date {
            payload.purchase_date = date;
        }
        if let Some(in_use) = self.in_use {
            payload.in_use = in_use;
        }
    }
}

/// Prints notifications to stderr.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

/// Asks on the terminal, or agrees without asking when `assume_yes`.
struct TerminalConfirm {
    assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        matches!(
            prompt_line(&format!("{} [y/N] ", prompt)).as_deref(),
            Ok("y" | "Y" | "yes")
        )
    }
}

fn prompt_line(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr();
    stderr.write_all(prompt.as_bytes())?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub fn password_or_prompt(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(p) => Ok(p),
        None => prompt_line("Password: ").context("Failed to read password"),
    }
}

pub fn confirmation_or_prompt(confirmation: Option<String>) -> anyhow::Result<String> {
    match confirmation {
        Some(c) => Ok(c),
        None => prompt_line("Confirm password: ").context("Failed to read password"),
    }
}

/// Everything a command needs: configuration, durable state and clients.
pub struct Context {
    config: Config,
    client: DeviceClient,
    sessions: SessionStore,
    filters: FilterStateStore,
}

impl Context {
    pub fn load(config_path: Option<&Path>, api_url: Option<&str>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(url) = api_url {
            config.api.base_url = url.to_string();
            config.validate()?;
        }

        let state_path = config.state_path();
        debug!(path = %state_path.display(), "Using state file");
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(state_path));

        let api = ApiClient::new(&config.api)?;
        let sessions = SessionStore::new(storage.clone());
        match sessions.load_token()? {
            Some(token) => api.set_token(token),
            None => debug!("No stored session"),
        }

        let filters = FilterStateStore::from_config(storage, &config.list);
        filters.restore();

        Ok(Self {
            client: DeviceClient::new(api, config.api.collection.clone()),
            config,
            sessions,
            filters,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<()> {
        let session = self.client.api().login(email, password).await?;
        self.remember(&session)
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> anyhow::Result<()> {
        let session = self
            .client
            .api()
            .register(name, email, password, confirmation)
            .await?;
        self.remember(&session)
    }

    fn remember(&self, session: &AuthSession) -> anyhow::Result<()> {
        self.sessions.save(session)?;
        eprintln!("Logged in as {} <{}>", session.user.name, session.user.email);
        Ok(())
    }

    pub fn logout(&self) -> anyhow::Result<()> {
        self.sessions.clear()?;
        self.client.api().clear_token();
        eprintln!("Logged out");
        Ok(())
    }

    pub async fn list(&self, page: u32, per_page: Option<u32>) -> anyhow::Result<()> {
        let per_page = per_page.unwrap_or(self.config.list.per_page);
        self.filters.set_page(page, per_page);

        let mut presenter = self.presenter();
        presenter.load().await;

        let state = presenter.state();
        if state.phase != LoadPhase::Loaded {
            return Err(Reported.into());
        }

        if state.is_empty() {
            println!("No devices found.");
        } else {
            print_table(&state.devices);
        }
        println!(
            "Page {} of {} ({} total)",
            state.current_page, state.last_page, state.total
        );
        Ok(())
    }

    pub fn filter_show(&self) -> anyhow::Result<()> {
        let criteria = self.filters.criteria();
        for key in FilterKey::all() {
            let value = criteria.get(*key).unwrap_or_default();
            println!("{:<10} {}", key.as_str(), value);
        }
        Ok(())
    }

    pub fn filter_set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let key: FilterKey = key.parse()?;
        self.filters.set_filter(key, value)?;
        self.filters.persist()?;
        Ok(())
    }

    pub fn filter_unset(&self, key: &str) -> anyhow::Result<()> {
        self.filter_set(key, "")
    }

    pub fn filter_clear(&self) -> anyhow::Result<()> {
        self.filters.clear();
        Ok(())
    }

    pub async fn show(&self, id: DeviceId) -> anyhow::Result<()> {
        let device = self.client.get(id).await?;
        print_device(&device);
        Ok(())
    }

    pub async fn add(&self, payload: DevicePayload) -> anyhow::Result<()> {
        let device = self.client.create(&payload).await?;
        eprintln!("Device added");
        print_device(&device);
        Ok(())
    }

    pub async fn edit(&self, id: DeviceId, changes: DeviceChanges) -> anyhow::Result<()> {
        let current = self.client.get(id).await?;
        let mut payload = DevicePayload::from_device(&current);
        changes.apply(&mut payload);

        let device = self.client.update(id, &payload).await?;
        eprintln!("Device updated");
        print_device(&device);
        Ok(())
    }

    pub async fn toggle(&self, id: DeviceId) -> anyhow::Result<()> {
        let mut presenter = self.presenter();
        let device = presenter.toggle_in_use(id).await.map_err(|_| Reported)?;
        print_device(&device);
        Ok(())
    }

    pub async fn remove(&self, id: DeviceId, assume_yes: bool) -> anyhow::Result<()> {
        let mut presenter = self.presenter();
        let confirm = TerminalConfirm { assume_yes };
        presenter.remove(id, &confirm).await.map_err(|_| Reported)?;
        Ok(())
    }

    fn presenter(&self) -> DeviceListPresenter<DeviceClient> {
        DeviceListPresenter::new(
            Arc::new(self.client.clone()),
            self.filters.clone(),
            Arc::new(ConsoleNotifier),
        )
    }
}

fn print_table(devices: &[Device]) {
    let name_width = column_width("NAME", devices.iter().map(|d| d.name.as_str()));
    let location_width = column_width("LOCATION", devices.iter().map(|d| d.location.as_str()));

    println!(
        "{:>6}  {:<nw$}  {:<lw$}  {:<10}  {}",
        "ID",
        "NAME",
        "LOCATION",
        "PURCHASED",
        "STATUS",
        nw = name_width,
        lw = location_width
    );
    for device in devices {
        println!(
            "{:>6}  {:<nw$}  {:<lw$}  {:<10}  {}",
            device.id,
            device.name,
            device.location,
            device.purchase_date,
            device.status_label(),
            nw = name_width,
            lw = location_width
        );
    }
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

fn print_device(device: &Device) {
    println!("id:            {}", device.id);
    println!("name:          {}", device.name);
    println!("location:      {}", device.location);
    println!("purchase date: {}", device.purchase_date);
    println!("status:        {}", device.status_label());
    println!("updated:       {}", device.updated_at.format("%Y-%m-%d %H:%M"));
}
