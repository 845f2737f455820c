//! Summary report rendering
//!
//! Fixed-width text layout: one line per included record (description with a
//! date suffix, sign by kind), then the income/expense/net totals block.

use crate::models::{Record, RecordKind};
use crate::services::Summary;

const DESC_WIDTH: usize = 35;
const RULE_WIDTH: usize = DESC_WIDTH + 10;

/// Render a summary as report text
pub fn render_summary(summary: &Summary, symbol: &str) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&rule);
    out.push('\n');
    match summary.range {
        None => out.push_str("All Transaction Info\n"),
        Some((start, end)) => out.push_str(&format!("{} -> {} Transaction Info\n", start, end)),
    }
    out.push_str(&rule);
    out.push('\n');

    for record in &summary.entries {
        out.push_str(&render_line(record, symbol));
        out.push('\n');
    }

    if summary.entries.is_empty() && summary.range.is_some() {
        out.push_str("No transactions found in this date range.\n");
    }

    out.push_str(&rule);
    out.push('\n');
    out.push_str(&format!(
        "{:<width$}| {}{}\n",
        "Total Income",
        symbol,
        summary.total_income.to_decimal_string(),
        width = DESC_WIDTH
    ));
    out.push_str(&format!(
        "{:<width$}| {}{}\n",
        "Total Expense",
        symbol,
        summary.total_expense.to_decimal_string(),
        width = DESC_WIDTH
    ));

    let net = summary.net_cents();
    let net_display = match net {
        0 => format!("{}0", symbol),
        n if n > 0 => format!("+{}{}.{:02}", symbol, n / 100, n % 100),
        n => format!("-{}{}.{:02}", symbol, -n / 100, -n % 100),
    };
    out.push_str(&format!(
        "{:<width$}| {}\n",
        "Net Income",
        net_display,
        width = DESC_WIDTH
    ));
    out.push_str(&rule);
    out.push('\n');

    out
}

/// One report line: padded description (date-suffixed), signed amount
fn render_line(record: &Record, symbol: &str) -> String {
    let mut desc = record.description.clone();
    if let Some(date) = record.date {
        desc = format!("{} ({})", desc, date);
    }
    if desc.len() > DESC_WIDTH - 2 {
        desc = format!("{}...", &desc[..DESC_WIDTH - 5]);
    }

    let sign = match record.kind {
        RecordKind::Income => '+',
        RecordKind::Expense => '-',
    };

    format!(
        "{:<width$}| {}{}{}",
        desc,
        sign,
        symbol,
        record.amount.to_decimal_string(),
        width = DESC_WIDTH
    )
}
