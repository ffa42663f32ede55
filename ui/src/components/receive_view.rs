use dioxus::prelude::*;

use trove_common::alert::{AlertLevel, AlertSink, Catalog, Translate};
use trove_common::config::ReceiveConfig;
use trove_common::receive::{Navigator as ScreenNavigator, ReceiveScreen, ScreenPhase};
use trove_common::reveal::{drive_frames, FrameClock};

use super::app::Route;
use super::wallet_state::{seed_store_for, use_alerts, use_wallet_state, SignalAlerts, SignalWallet};

/// Roughly one display refresh at 60 Hz.
#[allow(dead_code)] // used in WASM builds
const FRAME_MS: u32 = 16;

/// Frame clock for the reveal loop.
struct TimerFrameClock;

impl FrameClock for TimerFrameClock {
    async fn next_frame(&mut self) {
        #[cfg(target_family = "wasm")]
        gloo_timers::future::TimeoutFuture::new(FRAME_MS).await;
        #[cfg(not(target_family = "wasm"))]
        std::future::pending::<()>().await; // never runs on native
    }
}

/// Maps screen route requests onto the router.
struct RouteNavigator(Navigator);

impl ScreenNavigator for RouteNavigator {
    fn navigate(&mut self, route: &str) {
        let path = route.trim_end_matches('/');
        let target = path.parse::<Route>().unwrap_or(Route::Wallet {});
        self.0.replace(target);
    }
}

#[component]
pub fn ReceiveView(account: String) -> Element {
    let wallet = use_wallet_state();
    let alerts = use_alerts();
    let catalog = use_context::<Catalog>();
    let nav = use_navigator();

    let mut screen = use_signal({
        let account = account.clone();
        move || {
            ReceiveScreen::mount(
                account,
                ReceiveConfig::from_env(),
                &SignalWallet(wallet),
                &mut rand::thread_rng(),
            )
        }
    });
    let mut frame_task = use_signal(|| None::<Task>);

    // Validate the displayed address once on activation.
    let validate_catalog = catalog.clone();
    #[allow(unused_variables)] // used in WASM builds
    let copy_catalog = catalog.clone();
    use_hook(move || {
        spawn(async move {
            let mut orchestrator = screen.read().orchestrator.clone();
            let account_type = wallet
                .read()
                .account(orchestrator.account_name())
                .map(|a| a.account_type)
                .unwrap_or_default();
            let mut navigator = RouteNavigator(nav);
            match seed_store_for(account_type) {
                Ok(store) => {
                    orchestrator
                        .validate_current_address(
                            &SignalWallet(wallet),
                            &store,
                            &mut SignalAlerts(alerts),
                            &mut navigator,
                            &validate_catalog,
                        )
                        .await;
                }
                Err(e) => {
                    tracing::warn!("No seed store for receive screen: {e}");
                    orchestrator.navigate_away(&mut navigator);
                }
            }
            if screen.read().orchestrator.phase() != ScreenPhase::Unmounted {
                screen.write().orchestrator = orchestrator;
            }
        });
    });

    // Start a reveal whenever the account's address changes.
    use_effect(move || {
        let started = screen
            .write()
            .on_wallet_update(&SignalWallet(wallet), &mut rand::thread_rng());
        if !started {
            return;
        }
        if let Some(task) = frame_task.write().take() {
            task.cancel();
        }
        // The signal guard must not live across an await, so borrow per frame.
        let task = spawn(async move {
            drive_frames(&mut TimerFrameClock, || screen.write().advance_frame()).await;
        });
        frame_task.set(Some(task));
    });

    use_drop(move || {
        if let Ok(mut s) = screen.try_write() {
            s.unmount();
        }
    });

    let displayed = screen
        .read()
        .displayed_address(&SignalWallet(wallet))
        .unwrap_or_default();
    let generating = wallet.read().is_generating_receive_address;

    rsx! {
        div { class: "receive-view",
            h2 { "Receive" }
            p { class: "receive-account", "{account}" }
            div { class: "address-display",
                code { class: "receive-address", "{displayed}" }
                button {
                    class: "copy-btn",
                    onclick: move |_| {
                        let _address = wallet
                            .read()
                            .latest_address(screen.read().orchestrator.account_name())
                            .map(|a| a.to_string())
                            .unwrap_or_default();
                        #[cfg(target_family = "wasm")]
                        {
                            let catalog = copy_catalog.clone();
                            spawn(async move {
                                if let Some(window) = web_sys::window() {
                                    let clipboard = window.navigator().clipboard();
                                    let promise = clipboard.write_text(&_address);
                                    match wasm_bindgen_futures::JsFuture::from(promise).await {
                                        Ok(_) => SignalAlerts(alerts).generate_alert(
                                            AlertLevel::Info,
                                            catalog.t("receive:copied"),
                                            catalog.t("receive:copiedExplanation"),
                                        ),
                                        Err(e) => tracing::warn!("Clipboard write failed: {e:?}"),
                                    }
                                }
                            });
                        }
                    },
                    "Copy"
                }
            }
            button {
                class: "generate-btn",
                disabled: generating,
                onclick: move |_| {
                    let catalog = catalog.clone();
                    spawn(async move {
                        let orchestrator = screen.read().orchestrator.clone();
                        let account_type = wallet
                            .read()
                            .account(orchestrator.account_name())
                            .map(|a| a.account_type)
                            .unwrap_or_default();
                        let mut sink = SignalAlerts(alerts);
                        let result = match seed_store_for(account_type) {
                            Ok(store) => {
                                orchestrator
                                    .request_new_address(&mut SignalWallet(wallet), &store, &mut sink, &catalog)
                                    .await
                            }
                            Err(e) => Err(e.into()),
                        };
                        if let Err(e) = result {
                            tracing::error!("Address generation failed: {e}");
                            sink.generate_alert(
                                AlertLevel::Error,
                                catalog.t("receive:generationFailed"),
                                e.to_string(),
                            );
                        }
                    });
                },
                if generating { "Generating..." } else { "Generate new address" }
            }
        }
    }
}
