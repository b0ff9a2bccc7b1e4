use anyhow::{anyhow, Result};
use std::fmt::Display;
use std::io::Write as _;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::config::Settings;
use crate::store::{CascadeReport, CreateProfileRequest, ProfileStore, UpdateProfileRequest};

/// Line-oriented stdin, consumed one trimmed line per prompt.
type Input = Lines<BufReader<Stdin>>;

const MENU: &str = "\n===== MENU =====\n\
                    1. Insert Employee\n\
                    2. Update Employee\n\
                    3. Delete Employee\n\
                    4. Read Employees with Join\n\
                    5. Exit\n";

/// The displayed menu entries, mapped from the digits the user types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MenuChoice {
    Insert,
    Update,
    Delete,
    ReadJoined,
    Exit,
}

/// Maps one input line to a menu entry; `None` for anything unrecognized.
pub fn parse_menu_choice(line: &str) -> Option<MenuChoice> {
    match line.trim() {
        "1" => Some(MenuChoice::Insert),
        "2" => Some(MenuChoice::Update),
        "3" => Some(MenuChoice::Delete),
        "4" => Some(MenuChoice::ReadJoined),
        "5" => Some(MenuChoice::Exit),
        _ => None,
    }
}

/// Parses a typed field out of a raw input line.
///
/// Pure helper so field validation is testable without a terminal; the
/// error names the field for the user ("invalid salary: ...").
pub fn parse_field<T>(raw: &str, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("invalid {}: {}", what, e))
}

/// Runs the interactive menu loop until the user exits or stdin closes.
///
/// Each iteration shows the menu, reads one choice, and dispatches to the
/// store. Operation failures are reported and the loop continues; only the
/// caller's fatal errors (a closed terminal, broken stdout) end the loop
/// with an error.
pub async fn run_menu(store: &ProfileStore) -> Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{MENU}Choose option: ");
        std::io::stdout().flush()?;

        // EOF on stdin ends the session cleanly.
        let Some(line) = input.next_line().await? else {
            println!();
            return Ok(());
        };
        let choice = match parse_menu_choice(&line) {
            Some(c) => c,
            None => {
                println!("Invalid choice, try again.");
                continue;
            }
        };

        let outcome = match choice {
            MenuChoice::Insert => insert_profile(store, &mut input).await,
            MenuChoice::Update => update_profile(store, &mut input).await,
            MenuChoice::Delete => delete_profile(store, &mut input).await,
            MenuChoice::ReadJoined => read_profiles(store).await,
            MenuChoice::Exit => {
                println!("Exiting...");
                return Ok(());
            }
        };

        // Non-fatal: report and go back to the menu.
        if let Err(e) = outcome {
            println!("Operation failed: {e:#}");
        }
    }
}

/// Prompts for connection credentials and builds a URI from them.
///
/// Fallback for when neither `--uri` nor `MONGO_URI` is available.
pub async fn prompt_for_uri() -> Result<String> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let username = prompt(&mut input, "Enter MongoDB Username: ").await?;
    let password = prompt(&mut input, "Enter MongoDB Password: ").await?;
    let host = prompt(
        &mut input,
        "Enter Cluster Host (e.g. cluster0.example.mongodb.net): ",
    )
    .await?;
    Ok(Settings::uri_from_credentials(&username, &password, &host))
}

/// Reads the six profile fields and issues the cascade insert.
async fn insert_profile(store: &ProfileStore, input: &mut Input) -> Result<()> {
    let emp_id = parse_field(&prompt(input, "Enter Employee ID: ").await?, "employee id")?;
    let name = prompt(input, "Enter Name: ").await?;
    let salary = parse_field(&prompt(input, "Enter Salary: ").await?, "salary")?;
    let department = prompt(input, "Enter Department: ").await?;
    let developer_language = prompt(input, "Enter Developer Language: ").await?;
    let tester_language = prompt(input, "Enter Tester Language: ").await?;

    let req = CreateProfileRequest {
        emp_id,
        name,
        salary,
        department,
        developer_language,
        tester_language,
    };
    report_cascade("inserted", &store.create_profile(&req).await);
    Ok(())
}

/// Reads the id plus new core fields and issues the update.
async fn update_profile(store: &ProfileStore, input: &mut Input) -> Result<()> {
    let emp_id = parse_field(
        &prompt(input, "Enter Employee ID to update: ").await?,
        "employee id",
    )?;
    let name = prompt(input, "Enter new Name: ").await?;
    let salary = parse_field(&prompt(input, "Enter new Salary: ").await?, "salary")?;

    let req = UpdateProfileRequest {
        emp_id,
        name,
        salary,
    };
    let matched = store.update_profile(&req).await?;
    if matched == 0 {
        println!("No employee found with id {emp_id}; nothing updated.");
    } else {
        println!("Employee updated successfully.");
    }
    Ok(())
}

/// Reads the id and issues the cascade delete.
async fn delete_profile(store: &ProfileStore, input: &mut Input) -> Result<()> {
    let emp_id = parse_field(
        &prompt(input, "Enter Employee ID to delete: ").await?,
        "employee id",
    )?;
    report_cascade("deleted", &store.delete_profile(emp_id).await);
    Ok(())
}

/// Prints the joined profile view, one pretty-printed JSON object per profile.
async fn read_profiles(store: &ProfileStore) -> Result<()> {
    let profiles = store.read_profiles_joined().await?;

    println!("\n=== Employee Records with Full Details ===");
    if profiles.is_empty() {
        println!("(no profiles)");
    }
    for profile in profiles {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    }
    Ok(())
}

/// Tells the user how a cascade went, collection by collection on failure.
fn report_cascade(action: &str, report: &CascadeReport) {
    if report.is_complete() {
        println!("Employee {action} successfully.");
    } else {
        println!("Employee partially {action}; some collections failed:");
        for failure in report.failures() {
            println!(
                "  {}: {}",
                failure.collection,
                failure.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

/// Writes the label without a newline and reads one trimmed line back.
async fn prompt(input: &mut Input, label: &str) -> Result<String> {
    print!("{label}");
    std::io::stdout().flush()?;
    let line = input
        .next_line()
        .await?
        .ok_or_else(|| anyhow!("input stream closed"))?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices_map_to_displayed_digits() {
        assert_eq!(parse_menu_choice("1"), Some(MenuChoice::Insert));
        assert_eq!(parse_menu_choice("2"), Some(MenuChoice::Update));
        assert_eq!(parse_menu_choice("3"), Some(MenuChoice::Delete));
        assert_eq!(parse_menu_choice("4"), Some(MenuChoice::ReadJoined));
        assert_eq!(parse_menu_choice("5"), Some(MenuChoice::Exit));
    }

    #[test]
    fn menu_choice_tolerates_surrounding_whitespace() {
        assert_eq!(parse_menu_choice("  4  "), Some(MenuChoice::ReadJoined));
    }

    #[test]
    fn unrecognized_choices_are_rejected() {
        assert_eq!(parse_menu_choice("0"), None);
        assert_eq!(parse_menu_choice("6"), None);
        assert_eq!(parse_menu_choice("insert"), None);
        assert_eq!(parse_menu_choice(""), None);
    }

    #[test]
    fn parse_field_handles_typed_values() {
        assert_eq!(parse_field::<i64>(" 42 ", "employee id").unwrap(), 42);
        assert_eq!(parse_field::<f64>("50000.0", "salary").unwrap(), 50000.0);
    }

    #[test]
    fn parse_field_names_the_field_in_errors() {
        let err = parse_field::<f64>("a lot", "salary").unwrap_err();
        assert!(err.to_string().contains("invalid salary"));
    }
}
