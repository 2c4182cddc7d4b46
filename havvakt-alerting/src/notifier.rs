//! SMTP notifier for breach alerts.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use thiserror::Error;
use tracing::{info, warn};

use havvakt_config::AlertConfig;
use havvakt_core::{AlertEvent, VesselInfo};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("sender and recipient addresses are required when alerts are enabled")]
    MissingAddress,

    #[error("invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("message build failed: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP delivery failed: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Sends one plain-text email per alert through a STARTTLS SMTP relay.
#[derive(Clone)]
pub struct EmailNotifier {
    transport: SmtpTransport,
    sender: String,
    recipient: String,
}

impl EmailNotifier {
    /// Builds a notifier from configuration.
    ///
    /// Returns `Ok(None)` when delivery is disabled or the password
    /// environment variable is unset; the monitor then runs with logging
    /// only instead of failing startup.
    pub fn from_config(config: &AlertConfig) -> Result<Option<Self>, NotifyError> {
        if !config.enabled {
            return Ok(None);
        }
        let (sender, recipient) = match (&config.sender, &config.recipient) {
            (Some(sender), Some(recipient)) => (sender.clone(), recipient.clone()),
            _ => return Err(NotifyError::MissingAddress),
        };
        let Ok(password) = std::env::var(&config.password_env) else {
            warn!(
                variable = %config.password_env,
                "SMTP password not set, email alerts disabled"
            );
            return Ok(None);
        };

        let transport = SmtpTransport::starttls_relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(Credentials::new(sender.clone(), password))
            .build();

        Ok(Some(Self {
            transport,
            sender,
            recipient,
        }))
    }

    /// Formats and sends one alert. Blocking; callers on an async runtime
    /// should wrap this in a blocking task.
    pub fn send(&self, event: &AlertEvent, info: Option<&VesselInfo>) -> Result<(), NotifyError> {
        let name = display_name(event, info);
        let message = Message::builder()
            .from(self.sender.parse()?)
            .to(self.recipient.parse()?)
            .subject(format!("ALERT: {name} entered restricted area"))
            .header(ContentType::TEXT_PLAIN)
            .body(format_alert_body(event, info))?;

        self.transport.send(&message)?;
        info!(vessel = %event.vessel_id, "alert email sent");
        Ok(())
    }
}

fn display_name(event: &AlertEvent, info: Option<&VesselInfo>) -> String {
    info.map(VesselInfo::display_name)
        .unwrap_or_else(|| format!("MMSI-{}", event.vessel_id))
}

/// Plain-text alert body with position, motion and tracking links.
pub fn format_alert_body(event: &AlertEvent, info: Option<&VesselInfo>) -> String {
    let name = display_name(event, info);
    let fix = &event.position;
    let sog = fix
        .sog
        .map_or_else(|| "n/a".to_string(), |v| format!("{v} knots"));
    let cog = fix
        .cog
        .map_or_else(|| "n/a".to_string(), |v| format!("{v} degrees"));

    format!(
        "VESSEL BREACH ALERT\n\
         \n\
         Vessel: {name}\n\
         MMSI: {mmsi}\n\
         Position: {lat:.6}, {lon:.6}\n\
         Entered: {entered}\n\
         Speed: {sog}\n\
         Course: {cog}\n\
         \n\
         MarineTraffic: https://www.marinetraffic.com/en/ais/details/ships/mmsi:{mmsi}\n\
         VesselFinder: https://www.vesselfinder.com/vessels?mmsi={mmsi}\n\
         \n\
         ---\n\
         Automated AIS monitor\n",
        mmsi = event.vessel_id,
        lat = fix.lat,
        lon = fix.lon,
        entered = event.entered_at.to_rfc3339(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use havvakt_core::{PositionFix, VesselId};

    fn event() -> AlertEvent {
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap();
        AlertEvent {
            vessel_id: VesselId(230_123_456),
            position: PositionFix {
                vessel_id: VesselId(230_123_456),
                lat: 59.444091,
                lon: 24.753472,
                timestamp,
                sog: Some(14.2),
                cog: None,
            },
            entered_at: timestamp,
        }
    }

    #[test]
    fn body_includes_vessel_name_and_position() {
        let info = VesselInfo {
            mmsi: VesselId(230_123_456),
            name: "MERITUULI".into(),
            ..VesselInfo::default()
        };
        let body = format_alert_body(&event(), Some(&info));
        assert!(body.contains("Vessel: MERITUULI"));
        assert!(body.contains("MMSI: 230123456"));
        assert!(body.contains("Position: 59.444091, 24.753472"));
        assert!(body.contains("Speed: 14.2 knots"));
        assert!(body.contains("Course: n/a"));
        assert!(body.contains("mmsi:230123456"));
    }

    #[test]
    fn body_falls_back_to_mmsi_without_metadata() {
        let body = format_alert_body(&event(), None);
        assert!(body.contains("Vessel: MMSI-230123456"));
    }

    #[test]
    fn disabled_config_builds_no_notifier() {
        let config = AlertConfig::default();
        assert!(EmailNotifier::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn enabled_without_addresses_is_an_error() {
        let config = AlertConfig {
            enabled: true,
            ..AlertConfig::default()
        };
        assert!(matches!(
            EmailNotifier::from_config(&config),
            Err(NotifyError::MissingAddress)
        ));
    }
}
