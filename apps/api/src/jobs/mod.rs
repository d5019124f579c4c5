// Job and application lifecycle: posting, visibility, deletion, applying and review.

pub mod handlers;
pub mod service;
