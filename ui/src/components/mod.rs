pub mod alert_banner;
pub mod app;
pub mod receive_view;
pub mod wallet_state;
pub mod wallet_view;
