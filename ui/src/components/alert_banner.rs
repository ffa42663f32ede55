use dioxus::prelude::*;

use trove_common::alert::AlertLevel;

use super::wallet_state::use_alerts;

fn level_class(level: AlertLevel) -> &'static str {
    match level {
        AlertLevel::Success => "alert alert-success",
        AlertLevel::Error => "alert alert-error",
        AlertLevel::Info => "alert alert-info",
    }
}

/// Stack of dismissable alerts, newest on top.
#[component]
pub fn AlertBanner() -> Element {
    let mut alerts = use_alerts();
    let shown: Vec<_> = alerts
        .read()
        .iter()
        .cloned()
        .enumerate()
        .rev()
        .map(|(i, alert)| (i, alert.raised_at.format("%H:%M:%S").to_string(), alert))
        .collect();

    rsx! {
        div { class: "alert-stack",
            for (i, time, alert) in shown {
                div { key: "{i}", class: level_class(alert.level),
                    strong { "{alert.title}" }
                    p { "{alert.body}" }
                    span { class: "alert-time", "{time}" }
                    button {
                        class: "dismiss-btn",
                        onclick: move |_| {
                            let mut list = alerts.write();
                            if i < list.len() {
                                list.remove(i);
                            }
                        },
                        "Dismiss"
                    }
                }
            }
        }
    }
}
