pub mod api_session;
pub mod dto;
pub mod urls;

pub use api_session::ApiSession;
pub use urls::*;

#[cfg(test)]
pub(crate) mod test_server;
