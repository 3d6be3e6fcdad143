//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the application can start with zero
//! configuration for local development. Invalid values are warned about and
//! replaced by the default, never a panic.

use vigil_shared::constants::{DEFAULT_MAP_CENTER, DEFAULT_MAP_ZOOM};

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Transactional email settings (EmailJS-compatible REST API).
    pub email: EmailConfig,

    /// Inference endpoint for vehicle image verification.
    /// Env: `DETECTOR_URL`
    /// Default: none (verification disabled).
    pub detector_url: Option<String>,

    /// Passkey gating the investigator dashboard.
    /// Env: `INVESTIGATOR_PASSKEY`
    /// Default: none (dashboard stays locked).
    pub investigator_passkey: Option<String>,

    /// Link included in confirmation emails, pointing the submitter at the
    /// status page.
    /// Env: `STATUS_LINK`
    pub status_link: String,

    /// Initial map viewport for both the submitter map and the heatmap.
    pub map: MapConfig,
}

/// EmailJS-compatible email service settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// REST endpoint base.
    /// Env: `EMAIL_API_BASE`
    /// Default: `https://api.emailjs.com`
    pub api_base: String,

    /// Env: `EMAIL_SERVICE_ID`
    pub service_id: String,

    /// Env: `EMAIL_TEMPLATE_ID`
    pub template_id: String,

    /// Public (user) key sent with every request.
    /// Env: `EMAIL_PUBLIC_KEY`
    pub public_key: String,
}

impl EmailConfig {
    /// Whether enough is configured to attempt a send at all.
    pub fn is_configured(&self) -> bool {
        !self.api_base.is_empty()
            && !self.service_id.is_empty()
            && !self.template_id.is_empty()
            && !self.public_key.is_empty()
    }
}

/// Initial map viewport.
/// Env: `MAP_CENTER` ("lat,lng") and `MAP_ZOOM`.
#[derive(Debug, Clone, Copy)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            email: EmailConfig {
                api_base: "https://api.emailjs.com".to_string(),
                service_id: String::new(),
                template_id: String::new(),
                public_key: String::new(),
            },
            detector_url: None,
            investigator_passkey: None,
            status_link: "https://vigil.example/status.html".to_string(),
            map: MapConfig {
                center_lat: DEFAULT_MAP_CENTER.0,
                center_lng: DEFAULT_MAP_CENTER.1,
                zoom: DEFAULT_MAP_ZOOM,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base) = std::env::var("EMAIL_API_BASE") {
            config.email.api_base = base;
        }
        if let Ok(id) = std::env::var("EMAIL_SERVICE_ID") {
            config.email.service_id = id;
        }
        if let Ok(id) = std::env::var("EMAIL_TEMPLATE_ID") {
            config.email.template_id = id;
        }
        if let Ok(key) = std::env::var("EMAIL_PUBLIC_KEY") {
            config.email.public_key = key;
        }

        if let Ok(url) = std::env::var("DETECTOR_URL") {
            if !url.is_empty() {
                config.detector_url = Some(url);
            }
        }

        if let Ok(passkey) = std::env::var("INVESTIGATOR_PASSKEY") {
            if !passkey.is_empty() {
                config.investigator_passkey = Some(passkey);
            }
        }

        if let Ok(link) = std::env::var("STATUS_LINK") {
            config.status_link = link;
        }

        if let Ok(center) = std::env::var("MAP_CENTER") {
            match parse_center(&center) {
                Some((lat, lng)) => {
                    config.map.center_lat = lat;
                    config.map.center_lng = lng;
                }
                None => {
                    tracing::warn!(value = %center, "Invalid MAP_CENTER, using default");
                }
            }
        }

        if let Ok(zoom) = std::env::var("MAP_ZOOM") {
            match zoom.parse::<u8>() {
                Ok(z) => config.map.zoom = z,
                Err(_) => {
                    tracing::warn!(value = %zoom, "Invalid MAP_ZOOM, using default");
                }
            }
        }

        config
    }
}

/// Parse `"lat,lng"` into a coordinate pair.
fn parse_center(s: &str) -> Option<(f64, f64)> {
    let (lat, lng) = s.split_once(',')?;
    Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?))
}
