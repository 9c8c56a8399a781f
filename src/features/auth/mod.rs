pub mod clients;
pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;

pub use clients::{AuthProvider, HostedAuthClient};
pub use handlers::AuthState;
pub use services::{SessionGate, SessionObserver};
