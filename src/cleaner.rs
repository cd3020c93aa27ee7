//! Per-sheet normalizers.
//!
//! Each cleaner turns the loosely-typed rows of one sheet into typed records,
//! never mutating its input and never failing. A missing column and an
//! unparseable cell both fall through the `Option` coercions in
//! [`crate::sheet::CellValue`] to the same per-field fill policy. The source
//! workbook's schema is not guaranteed sheet-to-sheet.

use crate::currency::{detect_currency, Currency};
use crate::sheet::{CellValue, SheetRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Sheet names as they appear in the workbook.
pub const SHEET_SALES: &str = "Ventas";
pub const SHEET_INVENTORY: &str = "Inventario";
pub const SHEET_EXPENSES: &str = "Gastos";
pub const SHEET_WITHDRAWALS: &str = "Retiro";

// Sales columns.
pub const COL_DATE: &str = "Fecha";
pub const COL_NET_AMOUNT: &str = "Monto Neto";
pub const COL_SHIPPING: &str = "Envío (UYU)";
pub const COL_TOTAL_SALES: &str = "Ventas totales";
pub const COL_QUANTITY: &str = "Cantidad";
pub const COL_ITEM: &str = "Item";
pub const COL_CHANNEL: &str = "Canal de venta";
pub const COL_PAYMENT: &str = "Forma de pago";

// Inventory columns.
pub const COL_STOCK: &str = "Stock real";
pub const COL_PUBLIC_PRICE: &str = "Precio Venta Publico";
pub const COL_WHOLESALE_PRICE: &str = "Precio Venta Mayorista";
pub const COL_COST: &str = "Costo";

// Expense columns. The secondary amount column gets its `.1` suffix from
// header deduplication in the loader: the sheet has two columns both
// labeled "Monto".
pub const COL_CURRENCY: &str = "Moneda";
pub const COL_AMOUNT_TEXT: &str = "Monto";
pub const COL_AMOUNT_NUM: &str = "Monto.1";
pub const COL_PAYER: &str = "Pago por";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub date: Option<NaiveDate>,
    pub net_amount: Option<f64>,
    pub shipping: Option<f64>,
    pub total_amount: Option<f64>,
    /// Never null after cleaning: missing or unparseable quantities become 1.
    pub quantity: f64,
    pub item: Option<String>,
    pub channel: Option<String>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub item: Option<String>,
    /// Numeric fields are never null after cleaning; unusable cells become 0
    /// so the valuation sums stay null-free.
    pub stock: f64,
    pub public_price: f64,
    pub wholesale_price: f64,
    pub unit_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub date: Option<NaiveDate>,
    /// The hand-entered currency label, as written.
    pub currency_label: Option<String>,
    /// The primary display amount, which may be non-numeric text.
    pub amount_text: Option<String>,
    pub currency: Currency,
    /// Parsed from the secondary amount column, null when unparseable.
    pub amount: Option<f64>,
    pub payer: Option<String>,
}

fn number(row: &SheetRow, column: &str) -> Option<f64> {
    row.get(column).and_then(CellValue::as_number)
}

fn date(row: &SheetRow, column: &str) -> Option<NaiveDate> {
    row.get(column).and_then(CellValue::as_date)
}

fn text(row: &SheetRow, column: &str) -> Option<String> {
    row.get(column).and_then(CellValue::as_text)
}

pub fn clean_sales(rows: &[SheetRow]) -> Vec<SaleRecord> {
    rows.iter()
        .map(|row| SaleRecord {
            date: date(row, COL_DATE),
            net_amount: number(row, COL_NET_AMOUNT),
            shipping: number(row, COL_SHIPPING),
            total_amount: number(row, COL_TOTAL_SALES),
            quantity: number(row, COL_QUANTITY).unwrap_or(1.0),
            item: text(row, COL_ITEM),
            channel: text(row, COL_CHANNEL),
            payment_method: text(row, COL_PAYMENT),
        })
        .collect()
}

pub fn clean_inventory(rows: &[SheetRow]) -> Vec<InventoryRecord> {
    rows.iter()
        .map(|row| InventoryRecord {
            item: text(row, COL_ITEM),
            stock: number(row, COL_STOCK).unwrap_or(0.0),
            public_price: number(row, COL_PUBLIC_PRICE).unwrap_or(0.0),
            wholesale_price: number(row, COL_WHOLESALE_PRICE).unwrap_or(0.0),
            unit_cost: number(row, COL_COST).unwrap_or(0.0),
        })
        .collect()
}

pub fn clean_expenses(rows: &[SheetRow]) -> Vec<ExpenseRecord> {
    rows.iter()
        .map(|row| {
            let currency_label = text(row, COL_CURRENCY);
            let amount_text = text(row, COL_AMOUNT_TEXT);
            let currency =
                detect_currency(currency_label.as_deref(), amount_text.as_deref());
            ExpenseRecord {
                date: date(row, COL_DATE),
                currency_label,
                amount_text,
                currency,
                amount: number(row, COL_AMOUNT_NUM),
                payer: text(row, COL_PAYER),
            }
        })
        .collect()
}
