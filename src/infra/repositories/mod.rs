pub mod document_booking_repo;
pub mod document_youth_repo;
pub mod postgres_document_store;
pub mod sqlite_document_store;
