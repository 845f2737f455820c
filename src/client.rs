//! Interactive console client
//!
//! A numbered menu looping until exit. Each choice gathers input, builds a
//! command envelope, routes it, and prints the structured result. The add
//! flow appends directly through the ledger store; there is no envelope for
//! it, the client owns record creation.

use std::io::{self, Write};

use chrono::NaiveDate;

use crate::models::{IdentifiedRecord, Money, Record, RecordKind, RecordPatch};
use crate::protocol::{Request, Response, Router};
use crate::storage::Storage;

const MENU: &str = "\n1. Add Income  2. Add Expense  3. View Summary  4. Search  5. Filter by Amount\n6. Edit Transaction  7. Edit History  8. Delete Transaction  9. Exit";

/// Run the interactive menu loop until exit or end of input
pub fn run(storage: &Storage, router: &mut Router) -> io::Result<()> {
    loop {
        println!("{}", MENU);
        let Some(choice) = prompt("Choose: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => add_transaction(storage, RecordKind::Income)?,
            "2" => add_transaction(storage, RecordKind::Expense)?,
            "3" => view_summary(router)?,
            "4" => search(router)?,
            "5" => filter(router)?,
            "6" => edit(router)?,
            "7" => history(router)?,
            "8" => delete(router)?,
            "9" => {
                let response = router.route(&Request::end());
                if let Some(message) = response.message {
                    println!("{}", message);
                }
                println!("Exiting program...");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }

    Ok(())
}

/// Print a labelled prompt and read one trimmed line; `None` at end of input
fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut buf = String::new();
    if io::stdin().read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

fn add_transaction(storage: &Storage, kind: RecordKind) -> io::Result<()> {
    let Some(description) = prompt(&format!("Enter {} description: ", kind))? else {
        return Ok(());
    };
    let Some(amount) = prompt(&format!("Enter {} amount: ", kind))? else {
        return Ok(());
    };

    let Ok(amount) = Money::parse(&amount) else {
        println!("Invalid input. Please try again.");
        return Ok(());
    };
    if description.is_empty() {
        println!("Invalid input. Please try again.");
        return Ok(());
    }

    let Some(date) = prompt("Enter date (YYYY-MM-DD, blank for none): ")? else {
        return Ok(());
    };
    let date = if date.is_empty() {
        None
    } else {
        match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                println!("Invalid date. Please try again.");
                return Ok(());
            }
        }
    };

    let record = Record {
        kind,
        description,
        amount,
        date,
    };
    match storage.ledger.append(&record) {
        Ok(()) => println!("{} added!", kind),
        Err(err) => println!("Error: {}", err),
    }
    Ok(())
}

fn view_summary(router: &mut Router) -> io::Result<()> {
    let Some(window) = prompt("Enter time range (\"all\" or days back): ")? else {
        return Ok(());
    };
    print_response(router.route(&Request::summary(window)));
    Ok(())
}

fn search(router: &mut Router) -> io::Result<()> {
    let Some(keyword) = prompt("Enter keyword: ")? else {
        return Ok(());
    };
    print_response(router.route(&Request::search_keyword(keyword)));
    Ok(())
}

fn filter(router: &mut Router) -> io::Result<()> {
    let Some(amount) = prompt("Enter amount: ")? else {
        return Ok(());
    };
    print_response(router.route(&Request::filter_amount(amount)));
    Ok(())
}

fn edit(router: &mut Router) -> io::Result<()> {
    let Some(id) = prompt("Enter transaction ID: ")? else {
        return Ok(());
    };

    println!("Leave a field blank to keep its current value.");
    let Some(kind) = prompt("New type (income/expense): ")? else {
        return Ok(());
    };
    let Some(description) = prompt("New description: ")? else {
        return Ok(());
    };
    let Some(amount) = prompt("New amount: ")? else {
        return Ok(());
    };
    let Some(date) = prompt("New date (YYYY-MM-DD): ")? else {
        return Ok(());
    };

    let mut patch = RecordPatch::default();
    if !kind.is_empty() {
        match kind.parse::<RecordKind>() {
            Ok(kind) => patch.kind = Some(kind),
            Err(()) => {
                println!("Invalid type. Please try again.");
                return Ok(());
            }
        }
    }
    if !description.is_empty() {
        patch.description = Some(description);
    }
    if !amount.is_empty() {
        match Money::parse(&amount) {
            Ok(amount) => patch.amount = Some(amount),
            Err(_) => {
                println!("Invalid amount. Please try again.");
                return Ok(());
            }
        }
    }
    if !date.is_empty() {
        match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
            Ok(date) => patch.date = Some(date),
            Err(_) => {
                println!("Invalid date. Please try again.");
                return Ok(());
            }
        }
    }

    print_response(router.route(&Request::edit(id, patch)));
    Ok(())
}

fn history(router: &mut Router) -> io::Result<()> {
    let Some(id) = prompt("Enter transaction ID: ")? else {
        return Ok(());
    };

    let response = router.route(&Request::history(id));
    if !response.success {
        print_response(response);
        return Ok(());
    }

    let entries = response.history.unwrap_or_default();
    if entries.is_empty() {
        println!("No edit history found");
        return Ok(());
    }
    for entry in entries {
        let date = entry
            .original
            .date
            .map(|d| format!(" ({})", d))
            .unwrap_or_default();
        println!(
            "[{}] was: {} {} {}{}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            entry.original.kind,
            entry.original.description,
            entry.original.amount,
            date
        );
    }
    Ok(())
}

fn delete(router: &mut Router) -> io::Result<()> {
    let Some(id) = prompt("Enter transaction ID: ")? else {
        return Ok(());
    };

    let response = router.route(&Request::delete(&id, false));
    if response.require_confirmation != Some(true) {
        print_response(response);
        return Ok(());
    }

    if let Some(record) = &response.transaction {
        let date = record.date.map(|d| format!(" ({})", d)).unwrap_or_default();
        println!(
            "About to delete: {} {} {}{}",
            record.kind, record.description, record.amount, date
        );
    }

    let Some(answer) = prompt("Delete this transaction? (y/n): ")? else {
        return Ok(());
    };
    if answer.eq_ignore_ascii_case("y") {
        print_response(router.route(&Request::delete(&id, true)));
    } else {
        println!("Deletion cancelled.");
    }
    Ok(())
}

/// Print a response the way a human wants to read it
pub fn print_response(response: Response) {
    if !response.success {
        println!(
            "Error: {}",
            response.message.unwrap_or_else(|| "request failed".into())
        );
        return;
    }

    if let Some(report) = response.report {
        println!("{}", report);
        return;
    }

    if let Some(results) = response.results {
        print_results(&results);
        return;
    }

    if let Some(message) = response.message {
        println!("{}", message);
    }
}

/// Print query results as a fixed-width table
pub fn print_results(results: &[IdentifiedRecord]) {
    if results.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!("{:4} {:8} {:10} {:25} {:>12}", "ID", "Type", "Date", "Description", "Amount");
    println!("{}", "-".repeat(63));
    for item in results {
        let date = item
            .record
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:4} {:8} {:10} {:25} {:>12}",
            item.id.to_string(),
            item.record.kind.to_string(),
            date,
            item.record.description,
            item.record.amount.to_string()
        );
    }
    println!("{} transaction(s) found", results.len());
}
