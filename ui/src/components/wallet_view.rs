use dioxus::prelude::*;

use trove_common::wallet::{AccountType, WalletAction};

use super::app::Route;
use super::wallet_state::use_wallet_state;

fn account_badge(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Keychain => "Software",
        AccountType::Ledger => "Hardware",
    }
}

#[component]
pub fn WalletView() -> Element {
    let mut wallet = use_wallet_state();
    let nav = use_navigator();

    // Read eagerly so Dioxus subscribes to changes
    let state = wallet.read();
    let syncing = state.is_syncing;
    let accounts: Vec<_> = state
        .accounts
        .values()
        .map(|a| {
            (
                a.name.clone(),
                a.account_type,
                a.latest_address().map(|r| r.address.to_string()),
                a.addresses.len(),
            )
        })
        .collect();
    drop(state);

    rsx! {
        div { class: "wallet-view",
            h2 { "Accounts" }
            table { class: "account-list",
                thead {
                    tr {
                        th { "Account" }
                        th { "Type" }
                        th { "Receive address" }
                        th { "Addresses" }
                        th {}
                    }
                }
                tbody {
                    for (name, account_type, latest, count) in accounts {
                        tr { key: "{name}",
                            td { "{name}" }
                            td { "{account_badge(account_type)}" }
                            td { class: "address-cell",
                                code { {latest.unwrap_or_else(|| "-".to_string())} }
                            }
                            td { "{count}" }
                            td {
                                button {
                                    onclick: {
                                        let name = name.clone();
                                        move |_| { nav.push(Route::Receive { account: name.clone() }); }
                                    },
                                    "Receive"
                                }
                            }
                        }
                    }
                }
            }

            // ── Dev controls ──
            div { class: "wallet-actions",
                button {
                    onclick: move |_| wallet.write().apply(WalletAction::SetSyncing(!syncing)),
                    if syncing { "Stop sync" } else { "Simulate sync" }
                }
            }
        }
    }
}
