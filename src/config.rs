use std::path::PathBuf;
use std::time::Duration;

pub const SERVICE_NAME: &str = "job-aggregator-frontend";
pub const DEFAULT_HEALTH_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.phone.is_none()
    }
}

/// Runtime settings, resolved from flags and their environment fallbacks.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: Option<String>,
    pub timeout: Duration,
    pub contact: Contact,
}

impl Settings {
    pub fn new(
        api_url: Option<String>,
        timeout_secs: u64,
        contact_email: Option<String>,
        contact_phone: Option<String>,
    ) -> Self {
        let api_url = api_url.filter(|u| !u.trim().is_empty());
        if api_url.is_none() {
            tracing::warn!("JOBS_API_URL is not set; every fetch will fail");
        }
        Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs.max(1)),
            contact: Contact {
                email: contact_email.filter(|s| !s.trim().is_empty()),
                phone: contact_phone.filter(|s| !s.trim().is_empty()),
            },
        }
    }
}

pub fn log_path() -> PathBuf {
    // Use XDG data directory or fallback
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobboard") {
        proj_dirs.data_dir().join("jobboard.log")
    } else {
        PathBuf::from("jobboard.log")
    }
}
