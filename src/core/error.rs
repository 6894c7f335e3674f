use thiserror::Error;

/// Core error types for rvtrails
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bundled or user-supplied dataset could not be used
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// Key-value store write failed
    #[error("Store error for key '{key}': {message}")]
    Store { key: String, message: String },

    /// Geolocation request failed
    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    /// Billing/subscription SDK call failed
    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    /// Map camera rejected a command
    #[error("Camera error: {0}")]
    Camera(String),

    /// No entry with the given stable ID
    #[error("Campground not found: {0}")]
    NotFound(String),

    /// Internal logic error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Dataset loading errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("expected a JSON array or an object with an \"entries\" array, found {0}")]
    UnexpectedShape(&'static str),

    #[error("dataset is already initialized")]
    AlreadyInitialized,

    #[error("dataset contains no usable records")]
    Empty,
}

/// Geolocation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location services unavailable")]
    Unavailable,

    #[error("location request timed out")]
    Timeout,
}

/// Billing SDK errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// SDK is not present (e.g. a development sandbox)
    #[error("billing is not available on this device")]
    Unavailable,

    #[error("purchase cancelled")]
    Cancelled,

    #[error("purchase failed: {0}")]
    PurchaseFailed(String),

    #[error("restore failed: {0}")]
    RestoreFailed(String),

    #[error("no previous purchases found")]
    NothingToRestore,
}

/// A blocking message shown to the user after an action they triggered failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }
}

impl Error {
    /// Returns the alert to show for a failed user-initiated action.
    ///
    /// Only location and billing failures are surfaced; everything else is
    /// logged and degraded silently by the caller. A cancelled purchase is a
    /// user choice, not a failure, so it produces no alert either.
    pub fn user_alert(&self) -> Option<Alert> {
        match self {
            Error::Location(LocationError::PermissionDenied) => Some(
                Alert::new("Location", "Unable to get your location")
                    .with_suggestion("Allow location access for this app in system settings"),
            ),
            Error::Location(_) => Some(
                Alert::new("Location", "Unable to get your location")
                    .with_suggestion("Check that location services are turned on")
                    .with_suggestion("Try again in a moment"),
            ),
            Error::Billing(BillingError::Cancelled) => None,
            Error::Billing(BillingError::Unavailable) => Some(Alert::new(
                "Subscriptions",
                "Purchases are not available on this device",
            )),
            Error::Billing(BillingError::NothingToRestore) => Some(
                Alert::new("Restore Purchases", "No previous purchases were found")
                    .with_suggestion("Make sure you are signed in with the account you used to subscribe"),
            ),
            Error::Billing(BillingError::RestoreFailed(_)) => Some(
                Alert::new("Restore Purchases", "Unable to restore purchases")
                    .with_suggestion("Check your connection and try again"),
            ),
            Error::Billing(BillingError::PurchaseFailed(_)) => Some(
                Alert::new("Purchase", "The purchase could not be completed")
                    .with_suggestion("You have not been charged"),
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
