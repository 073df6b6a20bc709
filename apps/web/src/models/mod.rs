pub mod analytics;
pub mod content;
pub mod quiz;
pub mod user;

pub use analytics::Analytics;
pub use content::{AnimatedSummary, ContentItem, ContentType, DailyOptions, StoryboardStep};
pub use quiz::{Quiz, QuizQuestion, QuizStatus, QuizSubmission, QuizSubmitResult};
pub use user::StatsEnvelope;
