// Two security tiers: public token acquisition under /auth, everything
// else under /api behind the JWT middleware.
pub mod protected;
pub mod public;
