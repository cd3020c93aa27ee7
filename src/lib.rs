//! # Storefront Metrics
//!
//! The cleaning, filtering and aggregation core of a small-business sales
//! dashboard. The input is a multi-sheet workbook (sales, inventory,
//! expenses, withdrawals); the output is plain structured data, KPI scalars
//! and grouped tables, for a presentation layer to render however it
//! wishes.
//!
//! ## Core Concepts
//!
//! - **Cleaning**: each sheet's loosely-typed rows are normalized into typed
//!   records. Degraded input never fails: missing columns and unparseable
//!   cells fall back to per-field defaults (dates and sale amounts to null,
//!   quantities to 1, inventory numerics to 0).
//! - **Filtering**: a pure predicate over the cleaned sales (inclusive date
//!   range, optional channel and payment-method sets).
//! - **Aggregation**: scalar KPIs (total sales, order count, approximate
//!   COGS, gross margin, AOV) and grouped tables (monthly series, top-N,
//!   categorical breakdowns, inventory valuation, expense sums).
//!
//! Everything recomputes synchronously from the cleaned base records on
//! each filter application; the crate holds no session or cache state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use storefront_metrics::*;
//!
//! let sheets = load_workbook("HappyThings.xlsx")?;
//! let dashboard = Dashboard::from_sheets(&sheets);
//!
//! let mut criteria = FilterCriteria::default();
//! criteria.channels.insert("Web".to_string());
//!
//! let report = dashboard.report(&criteria);
//! println!("{} orders, AOV {:.0} UYU",
//!     report.kpis.order_count, report.kpis.average_order_value);
//! ```

pub mod cleaner;
pub mod currency;
pub mod error;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod sheet;

pub use cleaner::*;
pub use currency::{detect_currency, Currency};
pub use error::{DashboardError, Result};
pub use filter::*;
pub use loader::{load_workbook, read_csv_sheet};
pub use metrics::*;
pub use sheet::{CellValue, RawSheetSet, SheetRow};

use log::{debug, info};
use serde::{Deserialize, Serialize};

/// The cleaned base tables, built once per workbook load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dashboard {
    pub sales: Vec<SaleRecord>,
    pub inventory: Vec<InventoryRecord>,
    pub expenses: Vec<ExpenseRecord>,
    /// The withdrawals sheet is carried through as-is; nothing downstream
    /// consumes it yet.
    pub withdrawals: Vec<SheetRow>,
}

/// One filter application's full result set. Recomputed from scratch on
/// every call; nothing is persisted between calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub filtered_sales: Vec<SaleRecord>,
    pub kpis: KpiSummary,
    pub monthly_sales: Vec<MonthlyTotal>,
    pub top_periods: Vec<MonthlyTotal>,
    pub top_items: Vec<ItemTotal>,
    pub channel_breakdown: Vec<CategoryCount>,
    pub payment_breakdown: Vec<CategoryCount>,
    pub inventory: InventoryValuation,
    pub expenses_by_currency: Vec<CurrencyTotal>,
    pub expenses_by_payer: Vec<PayerTotal>,
}

impl Dashboard {
    /// Cleans every known sheet. A sheet missing from the workbook is
    /// treated as empty, not as an error.
    pub fn from_sheets(raw: &RawSheetSet) -> Dashboard {
        let empty: Vec<SheetRow> = Vec::new();
        let sheet = |name: &str| raw.get(name).unwrap_or(&empty);

        let dashboard = Dashboard {
            sales: clean_sales(sheet(SHEET_SALES)),
            inventory: clean_inventory(sheet(SHEET_INVENTORY)),
            expenses: clean_expenses(sheet(SHEET_EXPENSES)),
            withdrawals: sheet(SHEET_WITHDRAWALS).to_vec(),
        };

        info!(
            "Cleaned workbook: {} sales, {} inventory items, {} expenses",
            dashboard.sales.len(),
            dashboard.inventory.len(),
            dashboard.expenses.len()
        );
        dashboard
    }

    /// Earliest and latest sale dates, for a date-range widget.
    pub fn date_bounds(&self) -> Option<(chrono::NaiveDate, chrono::NaiveDate)> {
        filter::date_bounds(&self.sales)
    }

    /// Distinct sales channels, sorted.
    pub fn channel_options(&self) -> Vec<String> {
        filter::channel_options(&self.sales)
    }

    /// Distinct payment methods, sorted.
    pub fn payment_options(&self) -> Vec<String> {
        filter::payment_options(&self.sales)
    }

    /// Runs the whole pipeline for one filter state.
    pub fn report(&self, criteria: &FilterCriteria) -> DashboardReport {
        let filtered = filter_sales(&self.sales, criteria);
        debug!(
            "Filter kept {} of {} sales records",
            filtered.len(),
            self.sales.len()
        );

        let kpis = compute_kpis(&filtered, &self.inventory);
        let monthly = monthly_sales(&filtered);
        let top_periods = top_periods(&monthly, TOP_PERIODS);
        let top_items = top_items(&filtered, TOP_ITEMS);
        let channel_breakdown = channel_breakdown(&filtered);
        let payment_breakdown = payment_breakdown(&filtered);

        DashboardReport {
            kpis,
            monthly_sales: monthly,
            top_periods,
            top_items,
            channel_breakdown,
            payment_breakdown,
            inventory: inventory_valuation(&self.inventory),
            expenses_by_currency: expenses_by_currency(&self.expenses),
            expenses_by_payer: expenses_by_payer(&self.expenses),
            filtered_sales: filtered,
        }
    }
}

impl DashboardReport {
    /// JSON hand-off for presentation layers in another process.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
