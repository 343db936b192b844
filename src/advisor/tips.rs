//! Loading tips shown while the advisor is thinking.
//!
//! Purely cosmetic: one tip per fixed interval, cycling.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default rotation interval.
pub const DEFAULT_TIP_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingTip {
    pub icon: String,
    pub text: String,
}

impl LoadingTip {
    pub fn new(icon: &str, text: &str) -> Self {
        Self {
            icon: icon.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadingTips {
    tips: Vec<LoadingTip>,
    interval: Duration,
}

impl LoadingTips {
    pub fn new(tips: Vec<LoadingTip>, interval: Duration) -> Self {
        Self { tips, interval }
    }

    /// The tip to show after `elapsed` time in the loading state.
    pub fn tip_for(&self, elapsed: Duration) -> Option<&LoadingTip> {
        if self.tips.is_empty() {
            return None;
        }
        let interval_ms = self.interval.as_millis().max(1);
        let index = (elapsed.as_millis() / interval_ms) as usize % self.tips.len();
        self.tips.get(index)
    }
}

impl Default for LoadingTips {
    fn default() -> Self {
        Self::new(
            vec![
                LoadingTip::new(
                    "fa-solid fa-diagram-project",
                    "Pensando en la arquitectura que mejor equilibra velocidad, costo y escalabilidad…",
                ),
                LoadingTip::new(
                    "fa-solid fa-layer-group",
                    "Evaluando si tu proyecto encaja mejor como landing, web app, app móvil o flujo de automatización…",
                ),
                LoadingTip::new(
                    "fa-solid fa-cloud",
                    "Seleccionando stacks modernos como Next.js, Node.js, Flutter o n8n según tus respuestas…",
                ),
                LoadingTip::new(
                    "fa-solid fa-gauge-high",
                    "Ajustando el alcance del MVP para que sea realista en tiempo y esfuerzo…",
                ),
                LoadingTip::new(
                    "fa-solid fa-code-branch",
                    "Pensando en fases y roadmap para que puedas lanzar rápido y mejorar después…",
                ),
            ],
            DEFAULT_TIP_INTERVAL,
        )
    }
}
