use dioxus::prelude::*;

use trove_common::alert::{Alert, Catalog};

use super::alert_banner::AlertBanner;
use super::receive_view::ReceiveView;
use super::wallet_state::{initial_wallet, use_wallet_state};
use super::wallet_view::WalletView;

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[layout(AppLayout)]
    #[route("/wallet")]
    Wallet {},
    #[route("/receive/:account")]
    Receive { account: String },
    #[end_layout]
    #[route("/")]
    Home {},
}

#[component]
pub fn App() -> Element {
    use_context_provider(|| Signal::new(initial_wallet()));
    use_context_provider(|| Signal::new(Vec::<Alert>::new()));
    use_context_provider(Catalog::english);

    rsx! { Router::<Route> {} }
}

#[component]
fn AppLayout() -> Element {
    let wallet = use_wallet_state();
    let nav = use_navigator();
    let syncing = wallet.read().is_syncing;

    rsx! {
        div { class: "trove-app",
            header { class: "app-header",
                h1 { "Trove" }
                if syncing {
                    span { class: "sync-badge", "Syncing..." }
                }
                nav {
                    button {
                        onclick: move |_| { nav.push(Route::Wallet {}); },
                        "Wallet"
                    }
                }
            }
            AlertBanner {}
            main {
                Outlet::<Route> {}
            }
        }
    }
}

/// Route component: the landing page forwards to the wallet.
#[component]
fn Home() -> Element {
    let nav = use_navigator();
    nav.replace(Route::Wallet {});
    rsx! {}
}

/// Route component: renders the wallet overview.
#[component]
fn Wallet() -> Element {
    rsx! { WalletView {} }
}

/// Route component: renders the receive screen for an account from the URL.
#[component]
fn Receive(account: String) -> Element {
    rsx! { ReceiveView { key: "{account}", account } }
}
