//! Receive screen orchestration.
//!
//! The screen moves `Mounted -> Validating -> {Active | NavigatedAway}` and ends
//! in `Unmounted`. While active it may request any number of new addresses;
//! each one that lands in wallet state triggers a reveal.

use rand::Rng;
use thiserror::Error;

use crate::address::Address;
use crate::alert::{AlertLevel, AlertSink, Translate};
use crate::config::ReceiveConfig;
use crate::reveal::{FrameStep, RevealController};
use crate::seed_store::{AddressValidation, SeedStore, SeedStoreError};
use crate::wallet::{WalletAction, WalletStore};

#[derive(Debug, Error)]
pub enum ReceiveError {
    #[error("unknown account {0}")]
    UnknownAccount(String),
    #[error("address generation failed: {0}")]
    Generation(#[from] SeedStoreError),
}

/// Route changes requested by the screen.
pub trait Navigator {
    fn navigate(&mut self, route: &str);
}

/// Records visited routes, newest last.
impl Navigator for Vec<String> {
    fn navigate(&mut self, route: &str) {
        self.push(route.to_string());
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScreenPhase {
    #[default]
    Mounted,
    Validating,
    Active,
    NavigatedAway,
    Unmounted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Address still valid, nothing shown.
    Confirmed,
    /// Address valid and a success alert was raised.
    Notified,
    /// Address stale or validation failed; the screen left.
    NavigatedAway,
    /// The account has no address yet.
    NothingToValidate,
    /// Validation already ran for this mount.
    Skipped,
}

#[derive(Clone, Debug)]
pub struct ReceiveOrchestrator {
    account_name: String,
    config: ReceiveConfig,
    phase: ScreenPhase,
}

impl ReceiveOrchestrator {
    pub fn mount(account_name: impl Into<String>, config: ReceiveConfig) -> Self {
        Self {
            account_name: account_name.into(),
            config,
            phase: ScreenPhase::Mounted,
        }
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    pub fn phase(&self) -> ScreenPhase {
        self.phase
    }

    pub fn config(&self) -> &ReceiveConfig {
        &self.config
    }

    /// Check the displayed address once on activation.
    ///
    /// A stale address or any failure navigates back to the wallet without an
    /// alert. A valid address carrying a notification raises one success alert.
    pub async fn validate_current_address<W, S, A, N, T>(
        &mut self,
        wallet: &W,
        store: &S,
        alerts: &mut A,
        navigator: &mut N,
        i18n: &T,
    ) -> ValidationOutcome
    where
        W: WalletStore,
        S: SeedStore,
        A: AlertSink,
        N: Navigator,
        T: Translate,
    {
        if self.phase != ScreenPhase::Mounted {
            return ValidationOutcome::Skipped;
        }
        self.phase = ScreenPhase::Validating;

        let Some(account) = wallet.read(|w| w.account(&self.account_name).cloned()) else {
            tracing::warn!("Receive screen opened for unknown account {}", self.account_name);
            return self.navigate_away(navigator);
        };
        let Some(index) = account.latest_address().map(|r| r.index) else {
            self.phase = ScreenPhase::Active;
            return ValidationOutcome::NothingToValidate;
        };

        match store.validate_address(&account, index).await {
            Ok(AddressValidation::Valid {
                notification: Some(notification),
            }) => {
                alerts.generate_alert(
                    AlertLevel::Success,
                    i18n.t(&notification.title),
                    i18n.t(&notification.content),
                );
                self.phase = ScreenPhase::Active;
                ValidationOutcome::Notified
            }
            Ok(AddressValidation::Valid { notification: None }) => {
                self.phase = ScreenPhase::Active;
                ValidationOutcome::Confirmed
            }
            Ok(AddressValidation::Invalid) => {
                tracing::warn!("Address {index} of {} is stale", self.account_name);
                self.navigate_away(navigator)
            }
            Err(e) => {
                tracing::warn!("Address validation failed for {}: {e}", self.account_name);
                self.navigate_away(navigator)
            }
        }
    }

    /// Leave the screen for the wallet route.
    pub fn navigate_away<N: Navigator>(&mut self, navigator: &mut N) -> ValidationOutcome {
        self.phase = ScreenPhase::NavigatedAway;
        navigator.navigate(&self.config.wallet_route);
        ValidationOutcome::NavigatedAway
    }

    /// Ask the seed store for a fresh receive address.
    ///
    /// Returns `Ok(None)` when the request was refused: the wallet is syncing or
    /// transitioning (one "please wait" alert), a generation is already in
    /// flight, or the screen is gone.
    pub async fn request_new_address<W, S, A, T>(
        &self,
        wallet: &mut W,
        store: &S,
        alerts: &mut A,
        i18n: &T,
    ) -> Result<Option<Address>, ReceiveError>
    where
        W: WalletStore,
        S: SeedStore,
        A: AlertSink,
        T: Translate,
    {
        if matches!(
            self.phase,
            ScreenPhase::Unmounted | ScreenPhase::NavigatedAway
        ) {
            return Ok(None);
        }

        let (busy, generating, account) = wallet.read(|w| {
            (
                w.is_busy(),
                w.is_generating_receive_address,
                w.account(&self.account_name).cloned(),
            )
        });
        if busy {
            tracing::warn!("Address request refused: wallet busy");
            alerts.generate_alert(
                AlertLevel::Error,
                i18n.t("global:pleaseWait"),
                i18n.t("global:pleaseWaitExplanation"),
            );
            return Ok(None);
        }
        if generating {
            tracing::debug!("Address request ignored: generation in flight");
            return Ok(None);
        }
        let account = account.ok_or_else(|| ReceiveError::UnknownAccount(self.account_name.clone()))?;

        wallet.dispatch(WalletAction::GenerateAddressRequest);
        match store.generate_new_address(&self.account_name, &account).await {
            Ok(record) => {
                tracing::info!(
                    "Generated address {} for {} via {}",
                    record.index,
                    self.account_name,
                    store.store_name()
                );
                let address = record.address.clone();
                wallet.dispatch(WalletAction::GenerateAddressSuccess {
                    account_name: self.account_name.clone(),
                    record,
                });
                Ok(Some(address))
            }
            Err(e) => {
                wallet.dispatch(WalletAction::GenerateAddressError);
                Err(e.into())
            }
        }
    }

    pub fn unmount(&mut self) {
        self.phase = ScreenPhase::Unmounted;
    }
}

/// A mounted receive screen: orchestration plus the reveal animation it owns.
#[derive(Clone, Debug)]
pub struct ReceiveScreen {
    pub orchestrator: ReceiveOrchestrator,
    pub reveal: RevealController,
}

impl ReceiveScreen {
    pub fn mount<W: WalletStore, R: Rng + ?Sized>(
        account_name: impl Into<String>,
        config: ReceiveConfig,
        wallet: &W,
        rng: &mut R,
    ) -> Self {
        let orchestrator = ReceiveOrchestrator::mount(account_name, config);
        let mut reveal = RevealController::new(orchestrator.config().reveal);
        let current = wallet.read(|w| w.latest_address(orchestrator.account_name()).cloned());
        reveal.observe(current.as_ref(), rng);
        Self {
            orchestrator,
            reveal,
        }
    }

    /// Call whenever wallet state changes. Starts a reveal if the account's
    /// address changed.
    pub fn on_wallet_update<W: WalletStore, R: Rng + ?Sized>(&mut self, wallet: &W, rng: &mut R) -> bool {
        if self.orchestrator.phase() == ScreenPhase::Unmounted {
            return false;
        }
        let current = wallet.read(|w| w.latest_address(self.orchestrator.account_name()).cloned());
        self.reveal.observe(current.as_ref(), rng)
    }

    pub fn advance_frame(&mut self) -> FrameStep {
        self.reveal.advance_frame()
    }

    /// The address text as it should appear this frame.
    pub fn displayed_address<W: WalletStore>(&self, wallet: &W) -> Option<String> {
        wallet.read(|w| {
            w.latest_address(self.orchestrator.account_name())
                .map(|a| self.reveal.render(a))
        })
    }

    pub fn unmount(&mut self) {
        self.orchestrator.unmount();
        self.reveal.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::address::AddressRecord;
    use crate::alert::{Alert, Catalog};
    use crate::reveal::RevealState;
    use crate::seed_store::{KeychainSeedStore, Notification};
    use crate::wallet::{AccountState, AccountType, WalletState};

    /// Store with scripted answers that counts generation calls.
    struct ScriptedStore {
        validation: Result<AddressValidation, SeedStoreError>,
        keychain: KeychainSeedStore,
        fail_generation: bool,
        generate_calls: Cell<u32>,
    }

    impl ScriptedStore {
        fn new(validation: Result<AddressValidation, SeedStoreError>) -> Self {
            Self {
                validation,
                keychain: KeychainSeedStore::new(b"scripted".to_vec()),
                fail_generation: false,
                generate_calls: Cell::new(0),
            }
        }
    }

    impl SeedStore for ScriptedStore {
        async fn validate_address(
            &self,
            _account: &AccountState,
            _index: u32,
        ) -> Result<AddressValidation, SeedStoreError> {
            self.validation.clone()
        }

        async fn generate_new_address(
            &self,
            account_name: &str,
            account: &AccountState,
        ) -> Result<AddressRecord, SeedStoreError> {
            self.generate_calls.set(self.generate_calls.get() + 1);
            if self.fail_generation {
                return Err(SeedStoreError::Derivation("boom".into()));
            }
            self.keychain.generate_new_address(account_name, account).await
        }

        fn store_name(&self) -> &str {
            "scripted"
        }
    }

    fn wallet_with_address() -> WalletState {
        let store = KeychainSeedStore::new(b"scripted".to_vec());
        let mut account = AccountState::new("main", AccountType::Keychain);
        account
            .addresses
            .push(AddressRecord::new(0, store.derive("main", 0).unwrap()));
        let mut wallet = WalletState::new();
        wallet.apply(WalletAction::AddAccount(account));
        wallet
    }

    fn orchestrator() -> ReceiveOrchestrator {
        ReceiveOrchestrator::mount("main", ReceiveConfig::default())
    }

    #[tokio::test]
    async fn test_syncing_blocks_generation() {
        let mut wallet = wallet_with_address();
        wallet.apply(WalletAction::SetSyncing(true));
        let store = ScriptedStore::new(Ok(AddressValidation::Valid { notification: None }));
        let mut alerts: Vec<Alert> = Vec::new();

        let result = orchestrator()
            .request_new_address(&mut wallet, &store, &mut alerts, &Catalog::english())
            .await
            .unwrap();

        assert_eq!(result, None);
        assert_eq!(store.generate_calls.get(), 0);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Error);
        assert_eq!(alerts[0].title, "Please wait");
        assert_eq!(wallet.account("main").unwrap().addresses.len(), 1);
        assert!(!wallet.is_generating_receive_address);
    }

    #[tokio::test]
    async fn test_transitioning_blocks_generation() {
        let mut wallet = wallet_with_address();
        wallet.apply(WalletAction::SetTransitioning(true));
        let store = ScriptedStore::new(Ok(AddressValidation::Valid { notification: None }));
        let mut alerts: Vec<Alert> = Vec::new();

        orchestrator()
            .request_new_address(&mut wallet, &store, &mut alerts, &Catalog::english())
            .await
            .unwrap();
        assert_eq!(store.generate_calls.get(), 0);
        assert_eq!(alerts.len(), 1);
    }

    #[tokio::test]
    async fn test_in_flight_generation_is_ignored() {
        let mut wallet = wallet_with_address();
        wallet.apply(WalletAction::GenerateAddressRequest);
        let store = ScriptedStore::new(Ok(AddressValidation::Valid { notification: None }));
        let mut alerts: Vec<Alert> = Vec::new();

        let result = orchestrator()
            .request_new_address(&mut wallet, &store, &mut alerts, &Catalog::english())
            .await
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(store.generate_calls.get(), 0);
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_generation_updates_wallet() {
        let mut wallet = wallet_with_address();
        let store = ScriptedStore::new(Ok(AddressValidation::Valid { notification: None }));
        let mut alerts: Vec<Alert> = Vec::new();

        let address = orchestrator()
            .request_new_address(&mut wallet, &store, &mut alerts, &Catalog::english())
            .await
            .unwrap()
            .expect("address should be generated");

        assert_eq!(store.generate_calls.get(), 1);
        assert_eq!(wallet.latest_address("main"), Some(&address));
        assert_eq!(wallet.account("main").unwrap().latest_address().unwrap().index, 1);
        assert!(!wallet.is_generating_receive_address);
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let mut wallet = wallet_with_address();
        let mut store = ScriptedStore::new(Ok(AddressValidation::Valid { notification: None }));
        store.fail_generation = true;
        let mut alerts: Vec<Alert> = Vec::new();

        let result = orchestrator()
            .request_new_address(&mut wallet, &store, &mut alerts, &Catalog::english())
            .await;

        assert!(matches!(result, Err(ReceiveError::Generation(_))));
        assert!(!wallet.is_generating_receive_address);
        assert_eq!(wallet.account("main").unwrap().addresses.len(), 1);
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_address_navigates_silently() {
        let wallet = wallet_with_address();
        let store = ScriptedStore::new(Ok(AddressValidation::Invalid));
        let mut alerts: Vec<Alert> = Vec::new();
        let mut history: Vec<String> = Vec::new();
        let mut orch = orchestrator();

        let outcome = orch
            .validate_current_address(&wallet, &store, &mut alerts, &mut history, &Catalog::english())
            .await;

        assert_eq!(outcome, ValidationOutcome::NavigatedAway);
        assert_eq!(history, vec!["/wallet/".to_string()]);
        assert!(alerts.is_empty());
        assert_eq!(orch.phase(), ScreenPhase::NavigatedAway);
    }

    #[tokio::test]
    async fn test_validation_error_navigates_silently() {
        let wallet = wallet_with_address();
        let store = ScriptedStore::new(Err(SeedStoreError::DeviceUnavailable));
        let mut alerts: Vec<Alert> = Vec::new();
        let mut history: Vec<String> = Vec::new();
        let mut orch = orchestrator();

        let outcome = orch
            .validate_current_address(&wallet, &store, &mut alerts, &mut history, &Catalog::english())
            .await;

        assert_eq!(outcome, ValidationOutcome::NavigatedAway);
        assert_eq!(history, vec!["/wallet/".to_string()]);
        assert!(alerts.is_empty());
    }

    #[tokio::test]
    async fn test_notification_raises_one_success_alert() {
        let wallet = wallet_with_address();
        let store = ScriptedStore::new(Ok(AddressValidation::Valid {
            notification: Some(Notification {
                title: "t".into(),
                content: "c".into(),
            }),
        }));
        let mut alerts: Vec<Alert> = Vec::new();
        let mut history: Vec<String> = Vec::new();
        let mut orch = orchestrator();

        let outcome = orch
            .validate_current_address(&wallet, &store, &mut alerts, &mut history, &Catalog::default())
            .await;

        assert_eq!(outcome, ValidationOutcome::Notified);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].level, AlertLevel::Success);
        assert_eq!(alerts[0].title, "t");
        assert_eq!(alerts[0].body, "c");
        assert!(history.is_empty());
        assert_eq!(orch.phase(), ScreenPhase::Active);
    }

    #[tokio::test]
    async fn test_valid_without_notification_is_silent() {
        let wallet = wallet_with_address();
        let store = ScriptedStore::new(Ok(AddressValidation::Valid { notification: None }));
        let mut alerts: Vec<Alert> = Vec::new();
        let mut history: Vec<String> = Vec::new();
        let mut orch = orchestrator();

        let outcome = orch
            .validate_current_address(&wallet, &store, &mut alerts, &mut history, &Catalog::english())
            .await;
        assert_eq!(outcome, ValidationOutcome::Confirmed);
        assert!(alerts.is_empty());
        assert!(history.is_empty());

        let again = orch
            .validate_current_address(&wallet, &store, &mut alerts, &mut history, &Catalog::english())
            .await;
        assert_eq!(again, ValidationOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_spent_address_navigates_away() {
        let mut wallet = wallet_with_address();
        if let Some(account) = wallet.accounts.get_mut("main") {
            account.addresses[0].spent = true;
        }
        let store = KeychainSeedStore::new(b"scripted".to_vec());
        let mut alerts: Vec<Alert> = Vec::new();
        let mut history: Vec<String> = Vec::new();
        let mut orch = orchestrator();

        let outcome = orch
            .validate_current_address(&wallet, &store, &mut alerts, &mut history, &Catalog::english())
            .await;
        assert_eq!(outcome, ValidationOutcome::NavigatedAway);
        assert_eq!(history, vec!["/wallet/".to_string()]);
        assert!(alerts.is_empty());
        assert_eq!(orch.phase(), ScreenPhase::NavigatedAway);
    }

    #[test]
    fn test_navigate_away_records_phase() {
        let mut history: Vec<String> = Vec::new();
        let mut orch = orchestrator();
        assert_eq!(orch.navigate_away(&mut history), ValidationOutcome::NavigatedAway);
        assert_eq!(orch.phase(), ScreenPhase::NavigatedAway);
        assert_eq!(history, vec!["/wallet/".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_account_skips_validation() {
        let mut wallet = WalletState::new();
        wallet.apply(WalletAction::AddAccount(AccountState::new("main", AccountType::Keychain)));
        let store = ScriptedStore::new(Err(SeedStoreError::DeviceUnavailable));
        let mut alerts: Vec<Alert> = Vec::new();
        let mut history: Vec<String> = Vec::new();
        let mut orch = orchestrator();

        let outcome = orch
            .validate_current_address(&wallet, &store, &mut alerts, &mut history, &Catalog::english())
            .await;
        assert_eq!(outcome, ValidationOutcome::NothingToValidate);
        assert_eq!(orch.phase(), ScreenPhase::Active);
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_new_address_is_revealed() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut wallet = wallet_with_address();
        let store = ScriptedStore::new(Ok(AddressValidation::Valid { notification: None }));
        let mut alerts: Vec<Alert> = Vec::new();
        let mut history: Vec<String> = Vec::new();

        let mut screen = ReceiveScreen::mount("main", ReceiveConfig::default(), &wallet, &mut rng);
        assert_eq!(screen.reveal.state(), RevealState::Idle);
        let before = wallet.latest_address("main").cloned().unwrap();
        assert_eq!(screen.displayed_address(&wallet).as_deref(), Some(before.as_str()));

        screen
            .orchestrator
            .validate_current_address(&wallet, &store, &mut alerts, &mut history, &Catalog::english())
            .await;
        let address = screen
            .orchestrator
            .request_new_address(&mut wallet, &store, &mut alerts, &Catalog::english())
            .await
            .unwrap()
            .unwrap();

        assert!(screen.on_wallet_update(&wallet, &mut rng));
        assert_eq!(screen.reveal.state(), RevealState::Revealing);

        let mut frames = 0;
        while screen.advance_frame() == FrameStep::Scheduled {
            frames += 1;
            assert!(frames < 100, "reveal never settled");
        }
        assert_eq!(screen.displayed_address(&wallet).as_deref(), Some(address.as_str()));
    }

    #[test]
    fn test_unmount_halts_reveal() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let mut wallet = WalletState::new();
        wallet.apply(WalletAction::AddAccount(AccountState::new("main", AccountType::Keychain)));
        let mut screen = ReceiveScreen::mount("main", ReceiveConfig::default(), &wallet, &mut rng);

        let store = KeychainSeedStore::new(b"k".to_vec());
        wallet.apply(WalletAction::GenerateAddressSuccess {
            account_name: "main".into(),
            record: AddressRecord::new(0, store.derive("main", 0).unwrap()),
        });
        assert!(screen.on_wallet_update(&wallet, &mut rng));
        screen.advance_frame();

        screen.unmount();
        let frozen = screen.reveal.buffer().clone();
        for _ in 0..10 {
            assert_eq!(screen.advance_frame(), FrameStep::Halted);
        }
        assert_eq!(screen.reveal.buffer(), &frozen);
        assert_eq!(screen.orchestrator.phase(), ScreenPhase::Unmounted);
        assert!(!screen.on_wallet_update(&wallet, &mut rng));
    }
}
