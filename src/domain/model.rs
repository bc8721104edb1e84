// ドメインモデル（エンティティと値オブジェクト）

mod value_objects;
mod book;
mod sale;

pub use value_objects::{
    BookId, SaleId, SellerId,
    Money,
    BookFormat,
};

pub use book::{Book, BookUpdate};
pub use sale::{Sale, SaleWithBook};
