use anyhow::{anyhow, Result};
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use crate::error::BotError;

const DEFAULT_DATABASE_URL: &str = "sqlite:./data/bookings.db";
const DEFAULT_LOGO_PATH: &str = "logo.jpg";

/// Runtime configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bot API token.
    pub telegram_bot_token: String,
    /// SQLite connection string.
    pub database_url: String,
    /// Port of the health server.
    pub http_port: u16,
    /// Users allowed into the admin panel.
    pub admins: AdminSet,
    /// Optional logo shown on the user-facing screens.
    pub logo_path: PathBuf,
}

impl Config {
    /// Reads `TELEGRAM_BOT_TOKEN`, `DATABASE_URL`, `HTTP_PORT`, `ADMIN_IDS` and `LOGO_PATH`.
    pub fn from_env() -> Result<Self> {
        let token = env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow!("TELEGRAM_BOT_TOKEN must be set"))?;

        if token.trim().is_empty() {
            return Err(anyhow!("TELEGRAM_BOT_TOKEN must be set"));
        }

        let database_url = Self::database_url_from_env();

        let port_str = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "3000".to_string());
        let http_port = port_str.trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let admins = AdminSet::parse(&env::var("ADMIN_IDS").unwrap_or_default())?;

        let logo_path = env::var("LOGO_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOGO_PATH.to_string())
            .into();

        Ok(Config {
            telegram_bot_token: token,
            database_url,
            http_port,
            admins,
            logo_path,
        })
    }

    /// `DATABASE_URL` with the default applied; the migration tool needs nothing else.
    pub fn database_url_from_env() -> String {
        match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Fixed set of Telegram user ids with access to the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSet {
    ids: HashSet<u64>,
}

/// Proof that the caller passed the admin check; privileged operations take it by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminAccess {
    /// The verified caller.
    pub user_id: u64,
}

impl AdminSet {
    /// Builds a set from known ids.
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self { ids: ids.into_iter().collect() }
    }

    /// Parses a comma separated list such as `"123, 456"`. Blank input gives an empty set.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut ids = HashSet::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = part
                .parse::<u64>()
                .map_err(|_| anyhow!("Invalid ADMIN_IDS entry '{}'", part))?;
            ids.insert(id);
        }
        Ok(Self { ids })
    }

    /// Checks the caller against the allow-list.
    pub fn authorize(&self, user_id: u64) -> std::result::Result<AdminAccess, BotError> {
        if self.ids.contains(&user_id) {
            Ok(AdminAccess { user_id })
        } else {
            Err(BotError::PermissionDenied)
        }
    }

    /// Whether `user_id` is an admin.
    pub fn contains(&self, user_id: u64) -> bool {
        self.ids.contains(&user_id)
    }

    /// Admin ids in ascending order, the order notifications go out in.
    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.ids.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of configured admins.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when nobody can open the admin panel.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
