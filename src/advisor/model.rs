//! Wizard data model: audience segments, questions, answers.

use serde::{Deserialize, Serialize};

/// The audience segment the wizard branches on.
///
/// The wire names (`persona` / `empresa`) are the recommendation API's
/// contract; the English names are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "persona", alias = "individual")]
    Individual,
    #[serde(rename = "empresa", alias = "corporate")]
    Corporate,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Corporate => write!(f, "corporate"),
        }
    }
}

/// One step of the conversation.
///
/// Empty `options` means the API expects a free-text answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
}

impl Question {
    pub fn new(text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }

    pub fn is_free_text(&self) -> bool {
        self.options.is_empty()
    }
}

/// An answer to one question.
///
/// Kept structured inside the controller; flattened to a single string only
/// when sent to the recommendation API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Single(String),
    /// Selected values in selection order, without duplicates.
    Multiple(Vec<String>),
}

impl Answer {
    pub fn single(value: impl Into<String>) -> Self {
        Self::Single(value.into())
    }

    /// The string sent to the recommendation API.
    pub fn to_wire(&self) -> String {
        match self {
            Self::Single(value) => value.trim().to_string(),
            Self::Multiple(values) => values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// True when nothing but whitespace would be sent.
    pub fn is_blank(&self) -> bool {
        self.to_wire().is_empty()
    }

    /// Toggle `value` in a multi-select answer.
    ///
    /// A `Single` answer is promoted to a one-element set first. Returns
    /// `None` when the last member is removed.
    pub fn toggled(self, value: &str) -> Option<Self> {
        let mut values = match self {
            Self::Single(current) if current.trim().is_empty() => Vec::new(),
            Self::Single(current) => vec![current.trim().to_string()],
            Self::Multiple(values) => values,
        };
        if let Some(pos) = values.iter().position(|v| v == value) {
            values.remove(pos);
        } else {
            values.push(value.to_string());
        }
        if values.is_empty() {
            None
        } else {
            Some(Self::Multiple(values))
        }
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

/// Result of one exchange with the recommendation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Question(Question),
    Recommendation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ServiceType::Individual).unwrap(),
            "\"persona\""
        );
        assert_eq!(
            serde_json::to_string(&ServiceType::Corporate).unwrap(),
            "\"empresa\""
        );
        let alias: ServiceType = serde_json::from_str("\"corporate\"").unwrap();
        assert_eq!(alias, ServiceType::Corporate);
        let wire: ServiceType = serde_json::from_str("\"persona\"").unwrap();
        assert_eq!(wire, ServiceType::Individual);
    }

    #[test]
    fn blank_answers() {
        assert!(Answer::single("").is_blank());
        assert!(Answer::single("   ").is_blank());
        assert!(Answer::Multiple(vec![]).is_blank());
        assert!(Answer::Multiple(vec![" ".to_string()]).is_blank());
        assert!(!Answer::single(" A ").is_blank());
    }

    #[test]
    fn wire_form_trims_and_joins() {
        assert_eq!(Answer::single("  Landing page ").to_wire(), "Landing page");
        let multi = Answer::Multiple(vec!["Web".to_string(), "Móvil".to_string()]);
        assert_eq!(multi.to_wire(), "Web, Móvil");
    }

    #[test]
    fn toggle_adds_and_removes_in_selection_order() {
        let answer = Answer::single("Web").toggled("Móvil").unwrap();
        assert_eq!(
            answer,
            Answer::Multiple(vec!["Web".to_string(), "Móvil".to_string()])
        );

        let answer = answer.toggled("Web").unwrap();
        assert_eq!(answer, Answer::Multiple(vec!["Móvil".to_string()]));

        assert!(answer.toggled("Móvil").is_none());
    }

    #[test]
    fn toggle_from_blank_single_starts_empty_set() {
        let answer = Answer::single(" ").toggled("Pagos").unwrap();
        assert_eq!(answer, Answer::Multiple(vec!["Pagos".to_string()]));
    }

    #[test]
    fn question_free_text() {
        assert!(Question::new("¿Algo más?", vec![]).is_free_text());
        assert!(!Question::new("¿Plataforma?", vec!["Web".to_string()]).is_free_text());
    }
}
