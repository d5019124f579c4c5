// Recruiter-facing surface: account registration and login, job management,
// applicant review.

pub mod account;
pub mod handlers;
