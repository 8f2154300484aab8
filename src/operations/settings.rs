use crate::db::error::StoreResult;
use crate::db::settings_repository::SettingsRepository;
use crate::models::currency::{CURRENCY_PRESETS, is_valid_currency_code};
use log::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    pub selected_currency_code: String,
    pub currency_presets: Vec<String>,
}

pub struct SettingsEditor<'a> {
    repo: &'a dyn SettingsRepository,
    state: SettingsState,
}

impl<'a> SettingsEditor<'a> {
    pub fn load(repo: &'a dyn SettingsRepository) -> StoreResult<Self> {
        let state = SettingsState {
            selected_currency_code: repo.default_currency_code()?,
            currency_presets: CURRENCY_PRESETS.iter().map(|c| c.to_string()).collect(),
        };
        Ok(Self { repo, state })
    }

    pub fn state(&self) -> &SettingsState {
        &self.state
    }

    /// Persists `currency_code` as the default. Returns false for malformed codes.
    pub fn select_currency(&mut self, currency_code: &str) -> StoreResult<bool> {
        let code = currency_code.trim().to_uppercase();
        if !is_valid_currency_code(&code) {
            return Ok(false);
        }
        self.repo.set_default_currency_code(&code)?;
        info!("Default currency changed to {}", code);
        self.state.selected_currency_code = code;
        Ok(true)
    }
}
