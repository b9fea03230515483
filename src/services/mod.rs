pub mod book_service;
pub mod progress_service;
pub mod purchase_service;

/// Error type for service operations
#[derive(Debug)]
pub enum ServiceError {
    Database(String),
    NotFound,
    Conflict(String),
    InvalidState(String),
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self {
        let msg = e.to_string();
        // SQLite reports uniqueness violations as plain DbErr; surface them
        // separately so handlers can answer 409 instead of 500
        if msg.contains("UNIQUE constraint failed") {
            ServiceError::Conflict(msg)
        } else {
            ServiceError::Database(msg)
        }
    }
}
