// 販売集計パイプライン
// 販売実績を期間キーでグループ化し、集計・ソート・ページングする
// 各ステージは副作用のない純粋関数として実装し、個別にテスト可能にする

use crate::domain::error::DomainError;
use crate::domain::model::Money;
use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;

/// 集計の期間単位
/// 販売実績をグループ化するバケットの粒度を表す
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesPeriod {
    /// 日単位（YYYY-MM-DD）
    DayOfMonth,
    /// ISO週単位（YYYY-Www）
    Week,
    /// 月単位（YYYY-MM）
    Month,
    /// 年単位（YYYY）
    Year,
}

impl SalesPeriod {
    /// 文字列からSalesPeriodを作成
    pub fn from_string(s: &str) -> Result<Self, DomainError> {
        match s {
            "dayOfMonth" => Ok(SalesPeriod::DayOfMonth),
            "week" => Ok(SalesPeriod::Week),
            "month" => Ok(SalesPeriod::Month),
            "year" => Ok(SalesPeriod::Year),
            _ => Err(DomainError::InvalidValue(
                "Period must be one of: dayOfMonth, week, month, year".to_string(),
            )),
        }
    }

    /// 販売日時からこの期間単位のバケットキーを計算する
    pub fn bucket_key(&self, sale_date: DateTime<Utc>) -> String {
        match self {
            SalesPeriod::DayOfMonth => sale_date.format("%Y-%m-%d").to_string(),
            SalesPeriod::Week => {
                // ISO週: 週番号は2桁ゼロ埋め、年はISO週年を使う
                let iso_week = sale_date.iso_week();
                format!("{}-W{:02}", iso_week.year(), iso_week.week())
            }
            SalesPeriod::Month => sale_date.format("%Y-%m").to_string(),
            SalesPeriod::Year => sale_date.format("%Y").to_string(),
        }
    }
}

impl Default for SalesPeriod {
    fn default() -> Self {
        SalesPeriod::Month
    }
}

/// ソート順
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// 文字列からSortOrderを作成
    /// "asc"以外はすべて降順として扱う
    pub fn from_string(s: &str) -> Self {
        match s {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// ソート対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// 期間バケットの次元（dayOfMonth / week / month / year のいずれか）
    Period(SalesPeriod),
    /// バケットごとの売上合計
    TotalPrice,
    /// バケットごとの販売冊数合計
    TotalBookSold,
    /// 既定: バケットキーそのもの
    BucketKey,
}

impl SortField {
    /// 文字列からSortFieldを作成
    /// 認識できない値は既定のバケットキーソートになる
    pub fn from_string(s: &str) -> Self {
        match s {
            "dayOfMonth" => SortField::Period(SalesPeriod::DayOfMonth),
            "week" => SortField::Period(SalesPeriod::Week),
            "month" => SortField::Period(SalesPeriod::Month),
            "year" => SortField::Period(SalesPeriod::Year),
            "totalPrice" => SortField::TotalPrice,
            "totalBookSold" => SortField::TotalBookSold,
            _ => SortField::BucketKey,
        }
    }
}

/// ソートの実効キー
/// 期間次元のソート指定が有効な場合はバケットキーに解決される
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EffectiveSortKey {
    Bucket,
    TotalPrice,
    TotalBookSold,
}

/// 指定されたソートフィールドを実効キーに解決する
/// 期間次元の指定が有効な期間と一致しない場合、そのソートは適用されない
fn resolve_sort_key(field: SortField, period: SalesPeriod) -> Option<EffectiveSortKey> {
    match field {
        SortField::Period(p) if p == period => Some(EffectiveSortKey::Bucket),
        SortField::Period(_) => None,
        SortField::TotalPrice => Some(EffectiveSortKey::TotalPrice),
        SortField::TotalBookSold => Some(EffectiveSortKey::TotalBookSold),
        SortField::BucketKey => Some(EffectiveSortKey::Bucket),
    }
}

/// 集計の入力となる販売実績1件
/// 単価は集計時点の書籍価格（販売時のスナップショットではない）
#[derive(Debug, Clone, PartialEq)]
pub struct SaleFact {
    pub sale_date: DateTime<Utc>,
    pub quantity: u32,
    pub unit_price: Money,
}

/// 集計結果の1バケット
#[derive(Debug, Clone, PartialEq)]
pub struct SalesBucket {
    /// バケットキー（期間単位に応じた文字列）
    pub bucket: String,
    /// 売上合計 = Σ（数量 × 単価）
    pub total_price: i64,
    /// 販売冊数合計 = Σ 数量
    pub total_book_sold: u64,
}

/// ページングのメタ情報
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    /// ページング前の全バケット数
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    /// ceil(total / limit)
    pub total_page: u64,
}

/// ページングされた集計レポート
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub meta: PageMeta,
    pub result: Vec<SalesBucket>,
}

/// 販売実績を期間キーでグループ化して集計する
/// 結果はバケットキーの昇順で返る
pub fn bucket_sales(facts: &[SaleFact], period: SalesPeriod) -> Vec<SalesBucket> {
    let mut groups: BTreeMap<String, (i64, u64)> = BTreeMap::new();
    for fact in facts {
        let key = period.bucket_key(fact.sale_date);
        let entry = groups.entry(key).or_insert((0, 0));
        entry.0 += fact.unit_price.amount() * fact.quantity as i64;
        entry.1 += fact.quantity as u64;
    }
    groups
        .into_iter()
        .map(|(bucket, (total_price, total_book_sold))| SalesBucket {
            bucket,
            total_price,
            total_book_sold,
        })
        .collect()
}

/// バケットを指定されたフィールド・順序でソートする
/// 期間次元の指定が有効な期間と一致しない場合は何もしない
pub fn sort_buckets(
    buckets: &mut [SalesBucket],
    field: SortField,
    order: SortOrder,
    period: SalesPeriod,
) {
    let Some(key) = resolve_sort_key(field, period) else {
        return;
    };

    buckets.sort_by(|a, b| {
        let ordering = match key {
            EffectiveSortKey::Bucket => a.bucket.cmp(&b.bucket),
            EffectiveSortKey::TotalPrice => a.total_price.cmp(&b.total_price),
            EffectiveSortKey::TotalBookSold => a.total_book_sold.cmp(&b.total_book_sold),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// バケットのリストをページングしてレポートを組み立てる
/// `total`はページング前の全バケット数、`total_page = ceil(total / limit)`
pub fn paginate(buckets: Vec<SalesBucket>, page: u64, limit: u64) -> SalesReport {
    let total = buckets.len() as u64;
    let total_page = if limit == 0 { 0 } else { total.div_ceil(limit) };
    // 呼び出し側の値が大きくてもオーバーフローさせない（範囲外のページは空の結果）
    let skip = (page - 1).saturating_mul(limit).min(total);

    let result = buckets
        .into_iter()
        .skip(skip as usize)
        .take(limit as usize)
        .collect();

    SalesReport {
        meta: PageMeta {
            total,
            page,
            limit,
            total_page,
        },
        result,
    }
}
