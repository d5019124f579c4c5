// Job-seeker surface. Accounts are mirrored from the identity provider via
// signed webhooks; sessions are verified by `auth::user`.

pub mod handlers;
pub mod webhooks;
