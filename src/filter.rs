use crate::cleaner::SaleRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Filter state for the sales table.
///
/// Empty channel/payment sets mean "no filter selected" and accept every
/// record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Inclusive date range. When set, records without a date are excluded.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub channels: BTreeSet<String>,
    pub payment_methods: BTreeSet<String>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &SaleRecord) -> bool {
        if let Some((lower, upper)) = self.date_range {
            match record.date {
                Some(d) if d >= lower && d <= upper => {}
                _ => return false,
            }
        }
        if !self.channels.is_empty() {
            match &record.channel {
                Some(c) if self.channels.contains(c) => {}
                _ => return false,
            }
        }
        if !self.payment_methods.is_empty() {
            match &record.payment_method {
                Some(p) if self.payment_methods.contains(p) => {}
                _ => return false,
            }
        }
        true
    }
}

/// Applies the criteria over cleaned sales. Pure and order-preserving.
pub fn filter_sales(records: &[SaleRecord], criteria: &FilterCriteria) -> Vec<SaleRecord> {
    records
        .iter()
        .filter(|r| criteria.matches(r))
        .cloned()
        .collect()
}

/// Distinct channels present in the data, sorted, for filter widgets.
pub fn channel_options(records: &[SaleRecord]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.channel.as_deref()))
}

/// Distinct payment methods present in the data, sorted.
pub fn payment_options(records: &[SaleRecord]) -> Vec<String> {
    distinct(records.iter().filter_map(|r| r.payment_method.as_deref()))
}

/// Earliest and latest sale dates, for initializing the date-range widget.
/// `None` when no record carries a date.
pub fn date_bounds(records: &[SaleRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let mut dates = records.iter().filter_map(|r| r.date);
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some((min, max))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let set: BTreeSet<&str> = values.collect();
    set.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(date: Option<&str>, channel: Option<&str>, payment: Option<&str>) -> SaleRecord {
        SaleRecord {
            date: date.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
            net_amount: Some(100.0),
            shipping: None,
            total_amount: None,
            quantity: 1.0,
            item: Some("Vela".to_string()),
            channel: channel.map(str::to_string),
            payment_method: payment.map(str::to_string),
        }
    }

    #[test]
    fn test_empty_criteria_keeps_everything_in_order() {
        let records = vec![
            sale(Some("2024-01-10"), Some("Web"), Some("Tarjeta")),
            sale(None, None, None),
            sale(Some("2024-02-20"), Some("Feria"), Some("Efectivo")),
        ];

        let filtered = filter_sales(&records, &FilterCriteria::default());
        assert_eq!(filtered, records);
    }

    #[test]
    fn test_date_range_is_inclusive_and_excludes_null_dates() {
        let records = vec![
            sale(Some("2024-01-10"), None, None),
            sale(Some("2024-01-31"), None, None),
            sale(Some("2024-02-01"), None, None),
            sale(None, None, None),
        ];
        let criteria = FilterCriteria {
            date_range: Some((
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            )),
            ..Default::default()
        };

        let filtered = filter_sales(&records, &criteria);
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_channel_set_filters_and_drops_missing_channel() {
        let records = vec![
            sale(None, Some("Web"), None),
            sale(None, Some("Feria"), None),
            sale(None, None, None),
        ];
        let criteria = FilterCriteria {
            channels: ["Web".to_string()].into_iter().collect(),
            ..Default::default()
        };

        let filtered = filter_sales(&records, &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].channel.as_deref(), Some("Web"));
    }

    #[test]
    fn test_payment_set_filters() {
        let records = vec![
            sale(None, None, Some("Tarjeta")),
            sale(None, None, Some("Efectivo")),
        ];
        let criteria = FilterCriteria {
            payment_methods: ["Efectivo".to_string()].into_iter().collect(),
            ..Default::default()
        };

        assert_eq!(filter_sales(&records, &criteria).len(), 1);
    }

    #[test]
    fn test_options_are_sorted_and_distinct() {
        let records = vec![
            sale(None, Some("Web"), Some("Tarjeta")),
            sale(None, Some("Feria"), Some("Tarjeta")),
            sale(None, Some("Web"), None),
            sale(None, None, None),
        ];

        assert_eq!(channel_options(&records), vec!["Feria", "Web"]);
        assert_eq!(payment_options(&records), vec!["Tarjeta"]);
    }

    #[test]
    fn test_date_bounds() {
        let records = vec![
            sale(Some("2024-03-01"), None, None),
            sale(None, None, None),
            sale(Some("2024-01-15"), None, None),
        ];
        let (min, max) = date_bounds(&records).unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        assert_eq!(date_bounds(&[sale(None, None, None)]), None);
    }
}
