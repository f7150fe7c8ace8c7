pub mod error;
pub mod handle_service;

#[cfg(test)]
mod test;
