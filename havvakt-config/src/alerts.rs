//! Email alert delivery configuration.
//!
//! Delivery is disabled by default; enabling it requires sender and
//! recipient addresses, and the SMTP password is read from the environment
//! variable named here rather than stored in the file.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct AlertConfig {
    /// Deliver breach alerts by email?
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    #[validate(range(min = 1, max = 65535))]
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Sender address, also used as the SMTP login.
    #[validate(email)]
    #[serde(default)]
    pub sender: Option<String>,

    #[validate(email)]
    #[serde(default)]
    pub recipient: Option<String>,

    /// Environment variable holding the SMTP password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
}

fn default_smtp_server() -> String {
    "smtp.office365.com".into()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_password_env() -> String {
    "HAVVAKT_SMTP_PASSWORD".into()
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            sender: None,
            recipient: None,
            password_env: default_password_env(),
        }
    }
}
