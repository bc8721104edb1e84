use crate::domain::error::DomainError;
use crate::domain::model::{BookFormat, BookId, Money, SellerId};
use chrono::NaiveDate;

/// 書籍集約
/// 販売者が所有する書籍と在庫数を管理する
/// 在庫数の変更は販売トランザクションまたは明示的な更新操作のみを通して行う
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    id: BookId,
    name: String,
    author: String,
    price: Money,
    release_date: NaiveDate,
    publisher: String,
    isbn: Option<String>,
    language: String,
    series: Option<String>,
    genres: Vec<String>,
    format: BookFormat,
    page_count: u32,
    quantity: u32,
    seller_id: SellerId,
}

/// 書籍の部分更新内容
/// 指定されたフィールドのみを上書きする
#[derive(Debug, Clone, Default)]
pub struct BookUpdate {
    pub name: Option<String>,
    pub author: Option<String>,
    pub price: Option<Money>,
    pub release_date: Option<NaiveDate>,
    pub publisher: Option<String>,
    pub isbn: Option<String>,
    pub language: Option<String>,
    pub series: Option<String>,
    pub genres: Option<Vec<String>>,
    pub format: Option<BookFormat>,
    pub page_count: Option<u32>,
    pub quantity: Option<u32>,
}

impl Book {
    /// 新しい書籍を作成
    ///
    /// # Arguments
    /// * `id` - 書籍ID
    /// * `seller_id` - 所有する販売者のID
    ///
    /// # Returns
    /// * `Ok(Book)` - 作成成功
    /// * `Err(DomainError)` - 検証失敗（ジャンルが空、ページ数が0、価格が負）
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: BookId,
        name: String,
        author: String,
        price: Money,
        release_date: NaiveDate,
        publisher: String,
        isbn: Option<String>,
        language: String,
        series: Option<String>,
        genres: Vec<String>,
        format: BookFormat,
        page_count: u32,
        quantity: u32,
        seller_id: SellerId,
    ) -> Result<Self, DomainError> {
        Self::validate(&price, &genres, page_count)?;
        Ok(Self {
            id,
            name,
            author,
            price,
            release_date,
            publisher,
            isbn,
            language,
            series,
            genres,
            format,
            page_count,
            quantity,
            seller_id,
        })
    }

    /// データベースから取得したデータで書籍を再構築
    /// リポジトリでの使用を想定
    #[allow(clippy::too_many_arguments)]
    pub fn reconstruct(
        id: BookId,
        name: String,
        author: String,
        price: Money,
        release_date: NaiveDate,
        publisher: String,
        isbn: Option<String>,
        language: String,
        series: Option<String>,
        genres: Vec<String>,
        format: BookFormat,
        page_count: u32,
        quantity: u32,
        seller_id: SellerId,
    ) -> Result<Self, DomainError> {
        Self::new(
            id,
            name,
            author,
            price,
            release_date,
            publisher,
            isbn,
            language,
            series,
            genres,
            format,
            page_count,
            quantity,
            seller_id,
        )
    }

    /// 書籍の不変条件を検証
    fn validate(price: &Money, genres: &[String], page_count: u32) -> Result<(), DomainError> {
        if price.amount() < 0 {
            return Err(DomainError::BookValidation(
                "価格は0以上である必要があります".to_string(),
            ));
        }
        if genres.is_empty() {
            return Err(DomainError::BookValidation(
                "少なくとも1つのジャンルが必要です".to_string(),
            ));
        }
        if page_count == 0 {
            return Err(DomainError::BookValidation(
                "ページ数は1以上である必要があります".to_string(),
            ));
        }
        Ok(())
    }

    /// 書籍IDを取得
    pub fn id(&self) -> BookId {
        self.id
    }

    /// 書籍名を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 著者名を取得
    pub fn author(&self) -> &str {
        &self.author
    }

    /// 価格を取得
    pub fn price(&self) -> Money {
        self.price
    }

    /// 発売日を取得
    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    /// 出版社を取得
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// ISBNを取得
    pub fn isbn(&self) -> Option<&str> {
        self.isbn.as_deref()
    }

    /// 言語を取得
    pub fn language(&self) -> &str {
        &self.language
    }

    /// シリーズ名を取得
    pub fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    /// ジャンルのリストを取得
    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    /// 書籍形態を取得
    pub fn format(&self) -> BookFormat {
        self.format
    }

    /// ページ数を取得
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// 在庫数を取得
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// 所有する販売者のIDを取得
    pub fn seller_id(&self) -> SellerId {
        self.seller_id
    }

    /// 指定された数量の在庫が利用可能かチェック
    pub fn has_available_stock(&self, quantity: u32) -> bool {
        self.quantity >= quantity
    }

    /// 販売により在庫を引き落とす
    ///
    /// # Arguments
    /// * `quantity` - 販売する数量
    ///
    /// # Returns
    /// * `Ok(())` - 引き落とし成功
    /// * `Err(DomainError::InsufficientStock)` - 在庫不足
    pub fn deduct_stock(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity);
        }
        if !self.has_available_stock(quantity) {
            return Err(DomainError::InsufficientStock {
                book_name: self.name.clone(),
                requested: quantity,
                available: self.quantity,
            });
        }
        self.quantity -= quantity;
        Ok(())
    }

    /// 部分更新を適用する
    /// 更新後も書籍の不変条件を満たすことを検証する
    pub fn apply_update(&mut self, update: BookUpdate) -> Result<(), DomainError> {
        let price = update.price.unwrap_or(self.price);
        let genres = update.genres.clone().unwrap_or_else(|| self.genres.clone());
        let page_count = update.page_count.unwrap_or(self.page_count);
        Self::validate(&price, &genres, page_count)?;

        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(author) = update.author {
            self.author = author;
        }
        self.price = price;
        if let Some(release_date) = update.release_date {
            self.release_date = release_date;
        }
        if let Some(publisher) = update.publisher {
            self.publisher = publisher;
        }
        if let Some(isbn) = update.isbn {
            self.isbn = Some(isbn);
        }
        if let Some(language) = update.language {
            self.language = language;
        }
        if let Some(series) = update.series {
            self.series = Some(series);
        }
        self.genres = genres;
        if let Some(format) = update.format {
            self.format = format;
        }
        self.page_count = page_count;
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        Ok(())
    }
}
