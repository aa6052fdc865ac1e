//! Response validation and status message formatting.

use crate::error::BotError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Key of the homework list in the API response
pub const HOMEWORKS_KEY: &str = "homeworks";
/// Key of the homework name in a record
pub const HOMEWORK_NAME_KEY: &str = "homework_name";
/// Key of the review status in a record
pub const STATUS_KEY: &str = "status";

/// Review status of a homework, as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    /// Reviewed and accepted
    Approved,
    /// Taken for review
    Reviewing,
    /// Reviewed with remarks
    Rejected,
}

impl HomeworkStatus {
    /// Every known status, in verdict table order
    pub const ALL: [Self; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    /// Wire name of the status
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Text shown to the user for this status
    #[must_use]
    pub const fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                BotError::UnexpectedStatus(format!(
                    "Статус домашней работы не соответствует ожидаемому: {s}"
                ))
            })
    }
}

/// Extracts the homework list from a decoded API response.
///
/// # Errors
///
/// - [`BotError::InvalidType`] if the response is not an object or `homeworks` is not an array
/// - [`BotError::MissingKey`] if the object has no `homeworks` key
pub fn extract_homeworks(response: &Value) -> Result<&[Value], BotError> {
    debug!("Checking API response shape");

    let Value::Object(map) = response else {
        return Err(BotError::InvalidType("В ответе API ожидается словарь".to_string()));
    };

    let homeworks = map.get(HOMEWORKS_KEY).ok_or_else(|| {
        BotError::MissingKey(format!("В словаре нет запрашиваемого ключа '{HOMEWORKS_KEY}'"))
    })?;

    homeworks.as_array().map(Vec::as_slice).ok_or_else(|| {
        BotError::InvalidType(format!("Под ключом \"{HOMEWORKS_KEY}\" ожидается список"))
    })
}

/// Builds the chat message announcing the status of one homework record.
///
/// # Errors
///
/// - [`BotError::InvalidType`] if the record is not an object
/// - [`BotError::MissingField`] if `homework_name` or `status` is absent, empty or not a string
/// - [`BotError::UnexpectedStatus`] if `status` is not in the verdict table
pub fn format_status(record: &Value) -> Result<String, BotError> {
    debug!("Parsing homework status");

    if !record.is_object() {
        return Err(BotError::InvalidType(
            "Запись о домашней работе должна быть словарём".to_string(),
        ));
    }

    let homework_name = required_field(record, HOMEWORK_NAME_KEY)?;
    let status: HomeworkStatus = required_field(record, STATUS_KEY)?.parse()?;

    let message = format!(
        "Изменился статус проверки работы \"{homework_name}\". {}",
        status.verdict()
    );
    debug!(homework = %homework_name, %status, "Status message built");
    Ok(message)
}

fn required_field<'a>(record: &'a Value, key: &str) -> Result<&'a str, BotError> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            BotError::MissingField(format!("В записи о домашней работе нет поля '{key}'"))
        })
}
