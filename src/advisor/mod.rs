//! Project advisor: a guided question/answer wizard that ends in a
//! project recommendation.
//!
//! The controller asks the recommendation API for one step at a time,
//! keeps the running history, and remembers the final recommendation per
//! audience segment so a returning user can see it again.

pub mod controller;
pub mod model;
pub mod routes;
pub mod state;
pub mod summary;
pub mod tips;

pub use controller::{ConversationController, ConversationSnapshot};
pub use model::{Answer, NextStep, Question, ServiceType};
pub use routes::{AdvisorRouteState, advisor_routes};
pub use state::{ConversationState, ConversationStatus, StepState};
pub use summary::RecommendationSummary;
