pub mod drafts;
pub mod handlers;
pub mod routes;

pub use drafts::DraftStore;
pub use handlers::ViewState;
pub use routes::routes;
