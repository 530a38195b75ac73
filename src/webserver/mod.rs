mod server;

pub mod middleware;
pub mod routes;
pub mod state;
pub mod utils;

pub use server::start_server;
