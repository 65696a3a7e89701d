// Resume builder: the seven-step wizard, its validators and score, the in-memory
// session store, and the HTTP handlers that drive them.

pub mod handlers;
pub mod score;
pub mod session;
pub mod validation;
pub mod wizard;
