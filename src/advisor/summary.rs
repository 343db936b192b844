//! Best-effort extraction of labeled fields from a recommendation.
//!
//! The recommendation is opaque text. The API is prompted to emit lines like
//! `- Tipo de solución propuesta: …`; whatever matches is lifted out, and a
//! missing label simply leaves its field empty.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Hyphens only separate when spaced, so names like "e-commerce" stay whole.
static TECHNOLOGY_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,\u{2022}]|\s-\s").expect("valid regex"));

static ALTERNATIVE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\u{2022}|\s-\s").expect("valid regex"));

const SOLUTION_TYPE: &[&str] = &[
    "Tipo de solución propuesta:",
    "Tipo de solución recomendada:",
];
const TECHNOLOGIES: &[&str] = &[
    "Tecnologías principales:",
    "Arquitectura y tecnologías principales:",
];
const SCOPE: &[&str] = &["Alcance aproximado (MVP):", "Alcance aproximado del MVP:"];
const TIME: &[&str] = &["Estimación de tiempo:", "Fases y estimación de tiempo:"];
const COMPLEXITY: &[&str] = &["Nivel de complejidad:"];
const PHASES: &[&str] = &["Fases sugeridas:"];
const REASONS: &[&str] = &["Razones de la recomendación:"];
const ALTERNATIVES: &[&str] = &["Alternativas recomendadas:", "Alternativas sugeridas:"];
const RISKS: &[&str] = &["Riesgos o dependencias clave:"];
const NOTES: &[&str] = &["Notas importantes:", "Notas adicionales:"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationSummary {
    pub solution_type: Option<String>,
    pub technologies: Option<String>,
    /// `technologies` split into individual entries.
    pub technology_pills: Vec<String>,
    pub scope: Option<String>,
    pub time: Option<String>,
    pub complexity: Option<String>,
    pub phases: Option<String>,
    pub reasons: Option<String>,
    pub alternatives: Vec<String>,
    pub risks: Option<String>,
    pub notes: Option<String>,
    /// The full recommendation text, always present.
    pub raw: String,
}

impl RecommendationSummary {
    pub fn parse(text: &str) -> Self {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| strip_bullet(l.trim()))
            .filter(|l| !l.is_empty())
            .collect();

        let technologies = value_after_label(&lines, TECHNOLOGIES);
        let technology_pills = technologies
            .as_deref()
            .map(|t| split_non_empty(&TECHNOLOGY_SEPARATORS, t))
            .unwrap_or_default();
        let alternatives = value_after_label(&lines, ALTERNATIVES)
            .map(|a| split_non_empty(&ALTERNATIVE_SEPARATORS, &a))
            .unwrap_or_default();

        Self {
            solution_type: value_after_label(&lines, SOLUTION_TYPE),
            technologies,
            technology_pills,
            scope: value_after_label(&lines, SCOPE),
            time: value_after_label(&lines, TIME),
            complexity: value_after_label(&lines, COMPLEXITY),
            phases: value_after_label(&lines, PHASES),
            reasons: value_after_label(&lines, REASONS),
            alternatives,
            risks: value_after_label(&lines, RISKS),
            notes: value_after_label(&lines, NOTES),
            raw: text.to_string(),
        }
    }
}

fn strip_bullet(line: &str) -> &str {
    line.strip_prefix('-')
        .or_else(|| line.strip_prefix('\u{2022}'))
        .or_else(|| line.strip_prefix('*'))
        .map(str::trim_start)
        .unwrap_or(line)
}

/// Text after the first `:` of the first line starting with any label.
fn value_after_label(lines: &[&str], labels: &[&str]) -> Option<String> {
    for line in lines {
        let lower = line.to_lowercase();
        for label in labels {
            if lower.starts_with(&label.to_lowercase()) {
                let value = line
                    .split_once(':')
                    .map(|(_, rest)| rest.trim())
                    .unwrap_or("");
                return (!value.is_empty()).then(|| value.to_string());
            }
        }
    }
    None
}

fn split_non_empty(separators: &Regex, text: &str) -> Vec<String> {
    separators
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
