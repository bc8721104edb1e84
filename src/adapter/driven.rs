pub mod book_repository;
pub mod console_logger;
pub mod sale_repository;

pub use book_repository::MySqlBookRepository;
pub use console_logger::ConsoleLogger;
pub use sale_repository::MySqlSaleRepository;
