//! User identifier (`users.user_id`, `BIGSERIAL`)

use kernel::id::Id;

pub struct UserMarker;
pub type UserId = Id<UserMarker>;
