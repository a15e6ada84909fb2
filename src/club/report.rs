use std::io;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    club::{
        model::{Customer, Purchase},
        table::{Notice, PurchaseTable, SortColumn, SortOrder},
    },
    constants::CLUB,
};

pub fn format_currency(amount: f64) -> String {
    let rounded = (amount * 1000.0).round() / 1000.0;
    let sign = if rounded < 0.0 { "-" } else { "" };
    let text = format!("{:.3}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let grouped = whole
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .join(",");
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{}{}{}", sign, CLUB.currency, grouped)
    } else {
        format!("{}{}{}.{}", sign, CLUB.currency, grouped, fraction)
    }
}

pub fn summary_lines(customer: &Customer) -> Vec<String> {
    vec![
        format!("Name:           {}", customer.name),
        format!("Phone:          {}", customer.phone),
        format!("Total spent:    {}", format_currency(customer.total_value)),
        format!("Total profit:   {}", format_currency(customer.total_profit)),
        format!("Purchases:      {}", customer.num_purchases),
        format!(
            "Over {}: {}",
            format_currency(CLUB.purchase_threshold),
            customer.num_over_thresh
        ),
    ]
}

pub fn table_lines(name: &str, table: &PurchaseTable) -> Vec<String> {
    let arrow = |column: SortColumn| match (table.order_by() == column, table.order()) {
        (false, _) => "",
        (true, SortOrder::Asc) => " ^",
        (true, SortOrder::Desc) => " v",
    };
    let owner = if name.trim().is_empty() { "User" } else { name };

    let mut lines = Vec::new();
    lines.push(format!("{}'s Purchases", owner));
    match table.notice() {
        Some(Notice::Success(message)) => lines.push(format!("[ok] {}", message)),
        Some(Notice::Error(message)) => lines.push(format!("[error] {}", message)),
        None => {}
    }
    lines.push(format!(
        "{:>4}  {:>6}  {:<12}  {:>14}",
        "#",
        "id",
        format!("Date{}", arrow(SortColumn::Date)),
        format!("Amount{}", arrow(SortColumn::Amount))
    ));
    lines.push("-".repeat(42));
    if table.is_empty() {
        lines.push("  no purchases yet".to_string());
    }
    for row in table.page_rows() {
        let marker = if row.flagged { " *" } else { "" };
        lines.push(format!(
            "{:>4}  {:>6}  {:<12}  {:>14}{}",
            row.number,
            row.purchase.id,
            row.purchase.date,
            format_currency(row.purchase.amount),
            marker
        ));
    }
    lines.push("-".repeat(42));
    lines.push(format!(
        "page {}/{} ({} per page, {} total)",
        table.page() + 1,
        table.page_count(),
        table.rows_per_page(),
        table.len()
    ));
    lines
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: u64,
    date: &'a str,
    phone: &'a str,
    amount: String,
    profit: String,
    over_threshold: bool,
}

pub fn write_purchases_csv<W: io::Write>(writer: W, purchases: &[Purchase]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for purchase in purchases {
        csv_writer.serialize(CsvRow {
            id: purchase.id,
            date: &purchase.date,
            phone: &purchase.phone,
            amount: format!("{:.2}", purchase.amount),
            profit: format!("{:.2}", purchase.profit),
            over_threshold: purchase.is_over_threshold(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(id: u64, amount: f64) -> Purchase {
        Purchase {
            id,
            date: format!("2025-01-0{}", id),
            phone: "09123456789".to_string(),
            amount,
            profit: amount / 10.0,
        }
    }

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "€0");
        assert_eq!(format_currency(300.0), "€300");
        assert_eq!(format_currency(1234.5), "€1,234.5");
        assert_eq!(format_currency(1234567.891), "€1,234,567.891");
        assert_eq!(format_currency(2.3456), "€2.346");
        assert_eq!(format_currency(-1500.0), "-€1,500");
    }

    #[test]
    fn test_csv_export_has_header_and_flag() {
        let mut out = Vec::new();
        write_purchases_csv(&mut out, &[purchase(1, 350.0), purchase(2, 300.0)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,date,phone,amount,profit,over_threshold");
        assert_eq!(lines[1], "1,2025-01-01,09123456789,350.00,35.00,true");
        assert_eq!(lines[2], "2,2025-01-02,09123456789,300.00,30.00,false");
    }

    #[test]
    fn test_table_lines_mark_flagged_rows() {
        let table = PurchaseTable::new(vec![purchase(1, 350.0), purchase(2, 20.0)]);
        let lines = table_lines("", &table);
        assert_eq!(lines[0], "User's Purchases");
        assert!(lines.iter().any(|l| l.contains("€350") && l.ends_with(" *")));
        assert!(lines.iter().any(|l| l.contains("€20") && !l.ends_with(" *")));
        assert_eq!(lines.last().unwrap(), "page 1/1 (5 per page, 2 total)");
    }

    #[test]
    fn test_summary_lines() {
        let customer = Customer {
            phone: "09123456789".to_string(),
            name: "Sara".to_string(),
            total_value: 1500.0,
            total_profit: 150.25,
            num_purchases: 3,
            num_over_thresh: 1,
            purchases: Vec::new(),
        };
        let lines = summary_lines(&customer);
        assert!(lines[2].ends_with("€1,500"));
        assert!(lines[3].ends_with("€150.25"));
        assert_eq!(lines[5], "Over €300: 1");
    }
}
