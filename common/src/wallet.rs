use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::{Address, AddressRecord};

/// Which key-derivation backend services an account.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Seed held in software.
    #[default]
    Keychain,
    /// Seed held on a hardware device.
    Ledger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub name: String,
    pub account_type: AccountType,
    /// Derived addresses, ordered by index.
    pub addresses: Vec<AddressRecord>,
}

impl AccountState {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: name.into(),
            account_type,
            addresses: Vec::new(),
        }
    }

    /// The address currently offered for receiving.
    pub fn latest_address(&self) -> Option<&AddressRecord> {
        self.addresses.last()
    }

    pub fn address_at(&self, index: u32) -> Option<&AddressRecord> {
        self.addresses.iter().find(|r| r.index == index)
    }

    /// Index the next derived address should use. `None` once the index
    /// space is exhausted.
    pub fn next_index(&self) -> Option<u32> {
        match self.latest_address() {
            Some(r) => r.index.checked_add(1),
            None => Some(0),
        }
    }

    fn upsert(&mut self, record: AddressRecord) {
        match self.addresses.binary_search_by_key(&record.index, |r| r.index) {
            Ok(pos) => self.addresses[pos] = record,
            Err(pos) => self.addresses.insert(pos, record),
        }
    }
}

/// Updates accepted by the wallet state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WalletAction {
    SetSyncing(bool),
    SetTransitioning(bool),
    AddAccount(AccountState),
    GenerateAddressRequest,
    GenerateAddressSuccess {
        account_name: String,
        record: AddressRecord,
    },
    GenerateAddressError,
}

/// Wallet-wide state shared by every screen.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletState {
    pub is_syncing: bool,
    pub is_transitioning: bool,
    pub is_generating_receive_address: bool,
    pub accounts: BTreeMap<String, AccountState>,
}

impl WalletState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(&self, name: &str) -> Option<&AccountState> {
        self.accounts.get(name)
    }

    pub fn latest_address(&self, account_name: &str) -> Option<&Address> {
        self.account(account_name)
            .and_then(|a| a.latest_address())
            .map(|r| &r.address)
    }

    /// True while a sync or account transition makes address generation unsafe.
    pub fn is_busy(&self) -> bool {
        self.is_syncing || self.is_transitioning
    }

    pub fn apply(&mut self, action: WalletAction) {
        match action {
            WalletAction::SetSyncing(v) => self.is_syncing = v,
            WalletAction::SetTransitioning(v) => self.is_transitioning = v,
            WalletAction::AddAccount(account) => {
                self.accounts.insert(account.name.clone(), account);
            }
            WalletAction::GenerateAddressRequest => self.is_generating_receive_address = true,
            WalletAction::GenerateAddressSuccess {
                account_name,
                record,
            } => {
                self.is_generating_receive_address = false;
                match self.accounts.get_mut(&account_name) {
                    Some(account) => account.upsert(record),
                    None => tracing::warn!("Address generated for unknown account {account_name}"),
                }
            }
            WalletAction::GenerateAddressError => self.is_generating_receive_address = false,
        }
    }
}

/// Access to the shared wallet state, reducer style.
pub trait WalletStore {
    fn read<T>(&self, f: impl FnOnce(&WalletState) -> T) -> T;
    fn dispatch(&mut self, action: WalletAction);
}

impl WalletStore for WalletState {
    fn read<T>(&self, f: impl FnOnce(&WalletState) -> T) -> T {
        f(self)
    }

    fn dispatch(&mut self, action: WalletAction) {
        self.apply(action);
    }
}
