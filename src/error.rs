use thiserror::Error;

#[derive(Debug, Error)]
pub enum PageError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, PageError>;

/// Structured error data handed to whatever surface shows it
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorInfo {
    Api { status: u16, body: String },
    Network(String),
    Storage(String),
}

impl ErrorInfo {
    pub fn from_page_error(e: &PageError) -> Self {
        match e {
            PageError::Api { status, message } => ErrorInfo::Api {
                status: *status,
                body: message.clone(),
            },
            PageError::Io(_) | PageError::Json(_) | PageError::Storage(_) => {
                ErrorInfo::Storage(e.to_string())
            }
            _ => ErrorInfo::Network(e.to_string()),
        }
    }
}

/// Ready-to-render error popup data
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPopup {
    pub title: String,
    pub message: String,
    pub hint: String,
}

impl ErrorPopup {
    pub fn from_error_info(info: &ErrorInfo) -> Self {
        match info {
            ErrorInfo::Api { status, body } => Self::from_api(*status, body),
            ErrorInfo::Network(msg) => Self {
                title: "Network Error".into(),
                message: truncate(msg, 80),
                hint: "Check your internet connection".into(),
            },
            ErrorInfo::Storage(msg) => Self {
                title: "Save Failed".into(),
                message: truncate(msg, 80),
                hint: "Your changes may not have been saved".into(),
            },
        }
    }

    fn from_api(status: u16, body: &str) -> Self {
        let extracted_message = extract_json_error(body);

        match status {
            429 => Self {
                title: "Rate Limited".into(),
                message: extracted_message.unwrap_or_else(|| "Too many requests".into()),
                hint: "Wait a moment and try again".into(),
            },
            401 | 403 => Self {
                title: "Unauthorized".into(),
                message: "The assistant rejected the API key".into(),
                hint: "Check assistant.api_key in your config.toml".into(),
            },
            500 => Self {
                title: "Assistant Error".into(),
                message: extracted_message
                    .unwrap_or_else(|| "Failed to generate content".into()),
                hint: "Try again later".into(),
            },
            _ => Self {
                title: format!("API Error ({})", status),
                message: extracted_message.unwrap_or_else(|| truncate(body, 200)),
                hint: "Try again later".into(),
            },
        }
    }
}

// Completion services report either {"error": "..."}, {"error": {"message": "..."}}
// or a bare {"message": "..."}.
fn extract_json_error(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(obj) => obj.get("message")?.as_str().map(String::from),
        None => value.get("message")?.as_str().map(String::from),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}
