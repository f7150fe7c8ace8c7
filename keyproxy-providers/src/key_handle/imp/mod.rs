pub mod callback;
pub mod token_session;
