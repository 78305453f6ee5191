mod app;
mod config_file;
mod effects;
pub(crate) mod logging;
mod native_messaging;
mod render;

pub(crate) use app::{run_host, run_send, SendRequest};
pub(crate) use config_file::{describe, load_config};
