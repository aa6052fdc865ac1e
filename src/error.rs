use thiserror::Error;

/// Errors that can occur while polling the API and delivering notifications
///
/// The `Display` text of every variant is the message shown to the chat user,
/// so it is also the key used to suppress repeated notifications.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BotError {
    /// One or more required environment variables are absent
    #[error("Отсутствуют обязательные переменные окружения: {}", .0.join(", "))]
    ConfigMissing(Vec<&'static str>),
    /// A configuration value is present but unusable
    #[error("{0}")]
    InvalidConfig(String),
    /// Transport failure, non-200 response or unusable body from the API
    #[error("{0}")]
    Connectivity(String),
    /// A value in the API response has the wrong JSON type
    #[error("{0}")]
    InvalidType(String),
    /// The API response lacks a required key
    #[error("{0}")]
    MissingKey(String),
    /// A homework record lacks a required field or has it empty
    #[error("{0}")]
    MissingField(String),
    /// A homework record carries a status outside the verdict table
    #[error("{0}")]
    UnexpectedStatus(String),
    /// The message could not be delivered to Telegram
    #[error("{0}")]
    Notify(String),
}

impl BotError {
    /// Short class name appended to chat notifications.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ConfigMissing(_) => "ConfigMissing",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::Connectivity(_) => "ConnectivityFailure",
            Self::InvalidType(_) => "InvalidType",
            Self::MissingKey(_) => "MissingKey",
            Self::MissingField(_) => "MissingField",
            Self::UnexpectedStatus(_) => "UnexpectedStatus",
            Self::Notify(_) => "NotifyFailure",
        }
    }

    /// Broad class of the failure, logged with every failed cycle.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::ConfigMissing(_) | Self::InvalidConfig(_) => "configuration",
            Self::Connectivity(_) => "connectivity",
            Self::InvalidType(_) | Self::MissingKey(_) => "validation",
            Self::MissingField(_) | Self::UnexpectedStatus(_) => "domain",
            Self::Notify(_) => "notification",
        }
    }

    /// Text of the chat notification reporting this error.
    #[must_use]
    pub fn notification_text(&self) -> String {
        format!("Сбой в работе программы: {self}, {}", self.kind())
    }
}
