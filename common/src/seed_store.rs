//! Key-derivation backends that hand out receive addresses.
//!
//! Each [`AccountType`] has its own backend. [`AnySeedStore::for_account`] picks
//! the right one from the account's declared type and the key material the
//! host holds for it.

use hkdf::Hkdf;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::address::{Address, AddressError, AddressRecord, ADDRESS_LENGTH};
use crate::wallet::{AccountState, AccountType};

/// Domain separator mixed into every derived address.
const ADDRESS_INFO: &[u8] = b"trove-receive-address";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SeedStoreError {
    #[error("no hardware device connected")]
    DeviceUnavailable,
    #[error("device rejected request: {0}")]
    DeviceRejected(String),
    #[error("{account_type:?} account has no usable key material")]
    MissingKeyMaterial { account_type: AccountType },
    #[error("{expected:?} backend cannot serve a {actual:?} account")]
    AccountTypeMismatch {
        expected: AccountType,
        actual: AccountType,
    },
    #[error("key derivation failed: {0}")]
    Derivation(String),
    #[error(transparent)]
    Address(#[from] AddressError),
}

/// Message the user should see after a successful validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Translation key for the alert title.
    pub title: String,
    /// Translation key for the alert body.
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AddressValidation {
    /// The recorded address no longer matches what the seed derives.
    Invalid,
    Valid { notification: Option<Notification> },
}

#[allow(async_fn_in_trait)]
pub trait SeedStore {
    /// Check that the address recorded at `index` is still the one the seed
    /// derives and has not been spent from.
    async fn validate_address(
        &self,
        account: &AccountState,
        index: u32,
    ) -> Result<AddressValidation, SeedStoreError>;

    /// Derive the next receive address for the account.
    async fn generate_new_address(
        &self,
        account_name: &str,
        account: &AccountState,
    ) -> Result<AddressRecord, SeedStoreError>;

    /// Human-readable backend name (e.g. "keychain", "ledger").
    fn store_name(&self) -> &str;
}

fn next_index(account: &AccountState) -> Result<u32, SeedStoreError> {
    account
        .next_index()
        .ok_or_else(|| SeedStoreError::Derivation("address index space exhausted".to_string()))
}

fn ensure_type(expected: AccountType, account: &AccountState) -> Result<(), SeedStoreError> {
    if account.account_type == expected {
        Ok(())
    } else {
        Err(SeedStoreError::AccountTypeMismatch {
            expected,
            actual: account.account_type,
        })
    }
}

/// Software seed. Addresses are derived with HKDF-SHA256.
#[derive(Clone)]
pub struct KeychainSeedStore {
    seed: Vec<u8>,
}

impl KeychainSeedStore {
    pub fn new(seed: impl Into<Vec<u8>>) -> Self {
        Self { seed: seed.into() }
    }

    /// Address `index` of `account_name`. Deterministic for a given seed.
    pub fn derive(&self, account_name: &str, index: u32) -> Result<Address, SeedStoreError> {
        let hk = Hkdf::<Sha256>::new(Some(account_name.as_bytes()), &self.seed);
        let info = [ADDRESS_INFO, &index.to_be_bytes()].concat();
        let mut okm = [0u8; ADDRESS_LENGTH];
        hk.expand(&info, &mut okm)
            .map_err(|e| SeedStoreError::Derivation(e.to_string()))?;
        Ok(Address::from_bytes(&okm))
    }
}

impl SeedStore for KeychainSeedStore {
    async fn validate_address(
        &self,
        account: &AccountState,
        index: u32,
    ) -> Result<AddressValidation, SeedStoreError> {
        ensure_type(AccountType::Keychain, account)?;
        let Some(record) = account.address_at(index).filter(|r| !r.spent) else {
            return Ok(AddressValidation::Invalid);
        };
        if self.derive(&account.name, index)? == record.address {
            Ok(AddressValidation::Valid { notification: None })
        } else {
            Ok(AddressValidation::Invalid)
        }
    }

    async fn generate_new_address(
        &self,
        account_name: &str,
        account: &AccountState,
    ) -> Result<AddressRecord, SeedStoreError> {
        ensure_type(AccountType::Keychain, account)?;
        let index = next_index(account)?;
        let address = self.derive(account_name, index)?;
        Ok(AddressRecord::new(index, address))
    }

    fn store_name(&self) -> &str {
        "keychain"
    }
}

/// Link to a hardware signing device.
pub trait DeviceTransport {
    /// Ask the device for address `index` of the account.
    fn derive_address(&self, account_name: &str, index: u32) -> Result<Address, SeedStoreError>;

    /// Show address `index` on the device screen for the user to compare.
    fn display_address(&self, account_name: &str, index: u32) -> Result<(), SeedStoreError>;
}

/// Hardware-backed seed. All derivation happens on the device.
pub struct LedgerSeedStore {
    device: Option<Box<dyn DeviceTransport>>,
}

impl LedgerSeedStore {
    pub fn new(device: Box<dyn DeviceTransport>) -> Self {
        Self {
            device: Some(device),
        }
    }

    pub fn disconnected() -> Self {
        Self { device: None }
    }

    fn device(&self) -> Result<&dyn DeviceTransport, SeedStoreError> {
        self.device
            .as_deref()
            .ok_or(SeedStoreError::DeviceUnavailable)
    }
}

impl SeedStore for LedgerSeedStore {
    async fn validate_address(
        &self,
        account: &AccountState,
        index: u32,
    ) -> Result<AddressValidation, SeedStoreError> {
        ensure_type(AccountType::Ledger, account)?;
        let device = self.device()?;
        let Some(record) = account.address_at(index).filter(|r| !r.spent) else {
            return Ok(AddressValidation::Invalid);
        };
        if device.derive_address(&account.name, index)? != record.address {
            return Ok(AddressValidation::Invalid);
        }
        device.display_address(&account.name, index)?;
        Ok(AddressValidation::Valid {
            notification: Some(Notification {
                title: "ledger:checkAddress".to_string(),
                content: "ledger:checkAddressExplanation".to_string(),
            }),
        })
    }

    async fn generate_new_address(
        &self,
        account_name: &str,
        account: &AccountState,
    ) -> Result<AddressRecord, SeedStoreError> {
        ensure_type(AccountType::Ledger, account)?;
        let index = next_index(account)?;
        let address = self.device()?.derive_address(account_name, index)?;
        Ok(AddressRecord::new(index, address))
    }

    fn store_name(&self) -> &str {
        "ledger"
    }
}

/// Key material the host holds for an account.
pub enum KeyMaterial {
    Seed(Vec<u8>),
    Device(Box<dyn DeviceTransport>),
    None,
}

/// Seed store selected by account type.
pub enum AnySeedStore {
    Keychain(KeychainSeedStore),
    Ledger(LedgerSeedStore),
}

impl AnySeedStore {
    pub fn for_account(
        account_type: AccountType,
        material: KeyMaterial,
    ) -> Result<Self, SeedStoreError> {
        match (account_type, material) {
            (AccountType::Keychain, KeyMaterial::Seed(seed)) => {
                Ok(Self::Keychain(KeychainSeedStore::new(seed)))
            }
            (AccountType::Ledger, KeyMaterial::Device(device)) => {
                Ok(Self::Ledger(LedgerSeedStore::new(device)))
            }
            (AccountType::Ledger, KeyMaterial::None) => {
                Ok(Self::Ledger(LedgerSeedStore::disconnected()))
            }
            (account_type, _) => Err(SeedStoreError::MissingKeyMaterial { account_type }),
        }
    }
}

impl SeedStore for AnySeedStore {
    async fn validate_address(
        &self,
        account: &AccountState,
        index: u32,
    ) -> Result<AddressValidation, SeedStoreError> {
        match self {
            Self::Keychain(store) => store.validate_address(account, index).await,
            Self::Ledger(store) => store.validate_address(account, index).await,
        }
    }

    async fn generate_new_address(
        &self,
        account_name: &str,
        account: &AccountState,
    ) -> Result<AddressRecord, SeedStoreError> {
        match self {
            Self::Keychain(store) => store.generate_new_address(account_name, account).await,
            Self::Ledger(store) => store.generate_new_address(account_name, account).await,
        }
    }

    fn store_name(&self) -> &str {
        match self {
            Self::Keychain(store) => store.store_name(),
            Self::Ledger(store) => store.store_name(),
        }
    }
}
