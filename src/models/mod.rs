pub mod book;
pub mod category;
pub mod payment_method;
pub mod purchase;
pub mod reading_progress;
pub mod review;
pub mod user;

pub use book::BookDto;
pub use purchase::PurchaseDto;
