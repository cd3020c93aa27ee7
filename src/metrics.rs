//! Aggregations over the filtered sales subset, the inventory table and the
//! expense table. All functions are pure reductions over cleaned records;
//! nothing here can fail.

use crate::cleaner::{ExpenseRecord, InventoryRecord, SaleRecord};
use crate::currency::Currency;
use chrono::Datelike;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// How many items the top-products table shows.
pub const TOP_ITEMS: usize = 10;
/// How many months the top-periods table shows.
pub const TOP_PERIODS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    pub total_sales: f64,
    pub order_count: usize,
    pub total_shipping: f64,
    /// Approximate: per-unit inventory cost joined on item, times quantity.
    pub cogs: f64,
    pub gross_margin: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// Calendar month key, "YYYY-MM".
    pub month: String,
    pub net_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTotal {
    pub item: String,
    pub net_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryValuation {
    pub total_units: f64,
    pub value_at_cost: f64,
    pub value_at_retail: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyTotal {
    pub currency: Currency,
    /// `None` when the group exists but no row carried a parseable amount.
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayerTotal {
    pub payer: String,
    pub total: Option<f64>,
}

/// Scalar KPIs over the filtered sales subset.
///
/// COGS joins each sale to a deduplicated item-to-cost lookup from inventory
/// (first occurrence wins); a join miss contributes 0 and is counted into a
/// debug log line.
pub fn compute_kpis(filtered: &[SaleRecord], inventory: &[InventoryRecord]) -> KpiSummary {
    let total_sales: f64 = filtered.iter().filter_map(|r| r.net_amount).sum();
    let total_shipping: f64 = filtered.iter().filter_map(|r| r.shipping).sum();
    let order_count = filtered.len();

    let mut cost_by_item: BTreeMap<&str, f64> = BTreeMap::new();
    for record in inventory {
        if let Some(item) = record.item.as_deref() {
            cost_by_item.entry(item).or_insert(record.unit_cost);
        }
    }

    let mut cogs = 0.0;
    let mut join_misses = 0usize;
    for record in filtered {
        match record.item.as_deref().and_then(|i| cost_by_item.get(i)) {
            Some(cost) => cogs += cost * record.quantity,
            None => join_misses += 1,
        }
    }
    if join_misses > 0 {
        debug!(
            "COGS join: {} of {} sales had no inventory cost match",
            join_misses, order_count
        );
    }

    KpiSummary {
        total_sales,
        order_count,
        total_shipping,
        cogs,
        gross_margin: total_sales - cogs,
        average_order_value: total_sales / order_count.max(1) as f64,
    }
}

/// Net sales summed per calendar month, in ascending chronological order.
/// Records without a date are skipped.
pub fn monthly_sales(filtered: &[SaleRecord]) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for record in filtered {
        if let Some(date) = record.date {
            let key = format!("{:04}-{:02}", date.year(), date.month());
            *totals.entry(key).or_insert(0.0) += record.net_amount.unwrap_or(0.0);
        }
    }
    totals
        .into_iter()
        .map(|(month, net_sales)| MonthlyTotal { month, net_sales })
        .collect()
}

/// The highest-grossing months out of an already-computed monthly series.
pub fn top_periods(monthly: &[MonthlyTotal], n: usize) -> Vec<MonthlyTotal> {
    let mut ranked = monthly.to_vec();
    ranked.sort_by(|a, b| descending(a.net_sales, b.net_sales));
    ranked.truncate(n);
    ranked
}

/// Net sales summed per item, descending, truncated to `n`. Fewer than `n`
/// distinct items returns them all. Records without an item are skipped.
pub fn top_items(filtered: &[SaleRecord], n: usize) -> Vec<ItemTotal> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for record in filtered {
        if let Some(item) = record.item.as_deref() {
            *totals.entry(item).or_insert(0.0) += record.net_amount.unwrap_or(0.0);
        }
    }
    let mut ranked: Vec<ItemTotal> = totals
        .into_iter()
        .map(|(item, net_sales)| ItemTotal {
            item: item.to_string(),
            net_sales,
        })
        .collect();
    ranked.sort_by(|a, b| descending(a.net_sales, b.net_sales));
    ranked.truncate(n);
    ranked
}

/// Order counts per sales channel, descending.
pub fn channel_breakdown(filtered: &[SaleRecord]) -> Vec<CategoryCount> {
    frequency(filtered.iter().filter_map(|r| r.channel.as_deref()))
}

/// Order counts per payment method, descending.
pub fn payment_breakdown(filtered: &[SaleRecord]) -> Vec<CategoryCount> {
    frequency(filtered.iter().filter_map(|r| r.payment_method.as_deref()))
}

/// Stock totals and valuations. Independent of the sales filter. Cleaning
/// zero-fills every numeric field, so these sums are never null.
pub fn inventory_valuation(inventory: &[InventoryRecord]) -> InventoryValuation {
    InventoryValuation {
        total_units: inventory.iter().map(|r| r.stock).sum(),
        value_at_cost: inventory.iter().map(|r| r.stock * r.unit_cost).sum(),
        value_at_retail: inventory.iter().map(|r| r.stock * r.public_price).sum(),
    }
}

/// Expense totals per detected currency, in currency order. A currency whose
/// rows all lack a parseable amount still appears, with a `None` total.
pub fn expenses_by_currency(expenses: &[ExpenseRecord]) -> Vec<CurrencyTotal> {
    let mut totals: BTreeMap<Currency, Option<f64>> = BTreeMap::new();
    for record in expenses {
        let entry = totals.entry(record.currency).or_insert(None);
        if let Some(amount) = record.amount {
            *entry = Some(entry.unwrap_or(0.0) + amount);
        }
    }
    totals
        .into_iter()
        .map(|(currency, total)| CurrencyTotal { currency, total })
        .collect()
}

/// Expense totals per payer, descending by amount with amountless groups
/// last. Rows without a payer are skipped.
pub fn expenses_by_payer(expenses: &[ExpenseRecord]) -> Vec<PayerTotal> {
    let mut totals: BTreeMap<&str, Option<f64>> = BTreeMap::new();
    for record in expenses {
        if let Some(payer) = record.payer.as_deref() {
            let entry = totals.entry(payer).or_insert(None);
            if let Some(amount) = record.amount {
                *entry = Some(entry.unwrap_or(0.0) + amount);
            }
        }
    }
    let mut ranked: Vec<PayerTotal> = totals
        .into_iter()
        .map(|(payer, total)| PayerTotal {
            payer: payer.to_string(),
            total,
        })
        .collect();
    ranked.sort_by(|a, b| match (a.total, b.total) {
        (Some(x), Some(y)) => descending(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    ranked
}

fn frequency<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut ranked: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(label, orders)| CategoryCount {
            label: label.to_string(),
            orders,
        })
        .collect();
    ranked.sort_by(|a, b| b.orders.cmp(&a.orders));
    ranked
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
