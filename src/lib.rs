pub mod app;
pub mod config;
pub mod error;
pub mod registry;
pub mod relay;
pub mod state;

pub mod models {
    pub mod message;
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod auth;
}

pub mod handlers {
    pub mod ai;
    pub mod auth;
    pub mod messages;
    pub mod status;
}

pub mod validation {
    pub mod auth;
}

pub mod bridge {
    pub mod api;
    pub mod dispatch;
    pub mod envelope;
    pub mod handlers;
    pub mod monitor;
    pub mod slots;
}
