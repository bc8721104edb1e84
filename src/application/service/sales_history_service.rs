use crate::application::ApplicationError;
use crate::domain::model::SellerId;
use crate::domain::port::SaleRepository;
use crate::domain::report::{
    bucket_sales, paginate, sort_buckets, SalesPeriod, SalesReport, SortField, SortOrder,
};
use std::sync::Arc;

/// 販売履歴の問い合わせパラメータ
/// 未指定の項目には既定値が適用される
#[derive(Debug, Clone, Default)]
pub struct SalesHistoryQuery {
    pub period: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// 販売履歴サービス
/// 販売実績の取得と期間バケット集計を提供する
pub struct SalesHistoryService {
    sale_repository: Arc<dyn SaleRepository>,
}

impl SalesHistoryService {
    /// 新しい販売履歴サービスを作成
    ///
    /// # Arguments
    /// * `sale_repository` - 販売リポジトリ
    pub fn new(sale_repository: Arc<dyn SaleRepository>) -> Self {
        Self { sale_repository }
    }

    /// 販売者の販売履歴を期間単位で集計して取得
    ///
    /// 集計はバケット化 → ソート → ページングの順に適用される
    /// 単価は集計時点の書籍価格が使われる
    ///
    /// # Arguments
    /// * `seller_id` - 要求した販売者のID（認証済み）
    /// * `query` - 問い合わせパラメータ
    ///
    /// # Returns
    /// * `Ok(SalesReport)` - メタ情報付きの集計レポート
    /// * `Err(ApplicationError::InvalidRequest)` - 期間やページングパラメータの不正
    pub async fn get_sales_history(
        &self,
        seller_id: SellerId,
        query: SalesHistoryQuery,
    ) -> Result<SalesReport, ApplicationError> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(10);
        if page < 1 || limit < 1 {
            return Err(ApplicationError::InvalidRequest(
                "Page and limit must be positive integers".to_string(),
            ));
        }

        let period = match query.period.as_deref() {
            None | Some("") => SalesPeriod::default(),
            Some(value) => SalesPeriod::from_string(value).map_err(|_| {
                ApplicationError::InvalidRequest(
                    "Period must be one of: dayOfMonth, week, month, year".to_string(),
                )
            })?,
        };
        let sort_field = SortField::from_string(query.sort_by.as_deref().unwrap_or(""));
        let sort_order = SortOrder::from_string(query.sort_order.as_deref().unwrap_or(""));

        let facts = self.sale_repository.find_facts_by_seller(seller_id).await?;

        let mut buckets = bucket_sales(&facts, period);
        sort_buckets(&mut buckets, sort_field, sort_order, period);
        Ok(paginate(buckets, page, limit))
    }
}
