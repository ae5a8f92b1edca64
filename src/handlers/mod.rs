// Two-tier handler layout: public routes need no session token; protected
// routes sit behind the shared JWT authentication middleware.

pub mod protected;
pub mod public;
