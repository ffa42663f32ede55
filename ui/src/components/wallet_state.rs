use dioxus::prelude::*;

use trove_common::address::AddressRecord;
use trove_common::alert::{Alert, AlertLevel, AlertSink};
use trove_common::seed_store::{AnySeedStore, KeyMaterial, KeychainSeedStore, SeedStoreError};
use trove_common::wallet::{AccountState, AccountType, WalletAction, WalletState, WalletStore};

/// Name of the account created on first launch.
pub const DEFAULT_ACCOUNT: &str = "Main";

/// Compile-time seed for the software keychain, overridable via `TROVE_DEV_SEED`.
fn dev_seed() -> Vec<u8> {
    option_env!("TROVE_DEV_SEED")
        .unwrap_or("trove-dev-seed")
        .as_bytes()
        .to_vec()
}

/// Seed store for an account. Hardware accounts have no device in the browser
/// and come back disconnected.
pub fn seed_store_for(account_type: AccountType) -> Result<AnySeedStore, SeedStoreError> {
    let material = match account_type {
        AccountType::Keychain => KeyMaterial::Seed(dev_seed()),
        AccountType::Ledger => KeyMaterial::None,
    };
    AnySeedStore::for_account(account_type, material)
}

/// Wallet state on first launch: one keychain account holding address 0.
pub fn initial_wallet() -> WalletState {
    let mut account = AccountState::new(DEFAULT_ACCOUNT, AccountType::Keychain);
    match KeychainSeedStore::new(dev_seed()).derive(DEFAULT_ACCOUNT, 0) {
        Ok(address) => account.addresses.push(AddressRecord::new(0, address)),
        Err(e) => tracing::error!("Failed to derive initial address: {e}"),
    }
    let mut wallet = WalletState::new();
    wallet.apply(WalletAction::AddAccount(account));
    wallet
}

pub fn use_wallet_state() -> Signal<WalletState> {
    use_context::<Signal<WalletState>>()
}

pub fn use_alerts() -> Signal<Vec<Alert>> {
    use_context::<Signal<Vec<Alert>>>()
}

/// Wallet store backed by the shared Dioxus signal.
#[derive(Clone, Copy)]
pub struct SignalWallet(pub Signal<WalletState>);

impl WalletStore for SignalWallet {
    fn read<T>(&self, f: impl FnOnce(&WalletState) -> T) -> T {
        f(&self.0.read())
    }

    fn dispatch(&mut self, action: WalletAction) {
        tracing::debug!("Wallet action: {:?}", action);
        self.0.write().apply(action);
    }
}

/// Alert sink that feeds the banner stack.
#[derive(Clone, Copy)]
pub struct SignalAlerts(pub Signal<Vec<Alert>>);

impl AlertSink for SignalAlerts {
    fn generate_alert(&mut self, level: AlertLevel, title: String, body: String) {
        self.0.write().generate_alert(level, title, body);
    }
}
