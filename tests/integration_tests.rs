use std::fs;
use std::path::Path;

use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};
use rust_decimal_macros::dec;

use spendsort::{
    add_category, apply_user_corrections, categorize, export_csv, filter_by_flow,
    parse_statement, parse_statement_file, read_reviewed, summarize, total_by_flow,
    use_stored_names, CategorySummary, Error, Flow, RuleStore, Transaction, UNCATEGORIZED,
};

#[fixture]
fn sample_statement() -> String {
    indoc! { r#"
        Date,Details,Amount,Debit/Credit,Balance
        02 Jan 2024,Big Mart,54.30,Debit,"4,945.70"
        03 Jan 2024,Cafe Luna,12.00,Debit,"4,933.70"
        04 Jan 2024,BIG MART,10.00,Debit,"4,923.70"
        05 Jan 2024,Employer Inc,"2,500.00",Credit,"7,423.70"
        09 Jan 2024,Landlord,"1,234.50",Debit,"6,189.20"
        15 Jan 2024,Refund Desk,20.00,Credit,"6,209.20"
    "# }
    .to_string()
}

#[fixture]
fn sample_rules() -> String {
    indoc! { r#"
        {
          "Uncategorized": [],
          "Groceries": ["big mart"],
          "Dining": [],
          "Rent": ["landlord"]
        }
    "# }
    .to_string()
}

fn write_rules(dir: impl AsRef<Path>, rules: &str) -> RuleStore {
    let path = dir.as_ref().join("categories.json");
    fs::write(&path, rules).unwrap();
    RuleStore::load(path).unwrap()
}

fn categories(transactions: &[Transaction]) -> Vec<&str> {
    transactions.iter().map(|t| t.category.as_str()).collect()
}

#[rstest]
fn test_full_review_cycle(sample_statement: String, sample_rules: String) {
    let temp = tempdir::TempDir::new("test").unwrap();
    let statement = temp.path().join("statement.csv");
    fs::write(&statement, &sample_statement).unwrap();
    let mut store = write_rules(&temp, &sample_rules);

    // Parse and categorize the statement.
    let transactions = parse_statement_file(&statement).unwrap();
    let labeled = categorize(&transactions, &store);
    assert_eq!(
        categories(&labeled),
        vec![
            "Groceries",
            UNCATEGORIZED,
            "Groceries",
            UNCATEGORIZED,
            "Rent",
            UNCATEGORIZED
        ]
    );

    // The user reviews the expenses and files the cafe under Dining.
    let expenses = filter_by_flow(&labeled, Flow::Debit);
    let exported = export_csv(&expenses).unwrap();
    let edited = exported.replace(
        "Cafe Luna,12.00,Debit,Uncategorized",
        "Cafe Luna,12.00,Debit,dining",
    );
    assert_ne!(edited, exported);
    let reviewed = read_reviewed(&edited, &expenses).unwrap();
    let reviewed = use_stored_names(reviewed, &store).unwrap();

    let learned = apply_user_corrections(&expenses, &reviewed, &mut store).unwrap();
    assert_eq!(learned, 1);

    // The new rule is on disk and applies to the next statement.
    let reloaded = RuleStore::load(store.path()).unwrap();
    assert_eq!(reloaded.keywords("Dining").unwrap(), ["Cafe Luna".to_string()]);
    let next_month = indoc! { r#"
        Date,Details,Amount,Debit/Credit
        01 Feb 2024,Cafe Luna,8.75,Debit
    "# };
    let relabeled = categorize(&parse_statement(next_month.as_bytes()).unwrap(), &reloaded);
    assert_eq!(categories(&relabeled), vec!["Dining"]);

    // Summaries of the reviewed expenses and of the account payments.
    assert_eq!(
        summarize(&reviewed),
        vec![
            CategorySummary {
                category: "Groceries".to_string(),
                total_amount: dec!(64.30),
            },
            CategorySummary {
                category: "Dining".to_string(),
                total_amount: dec!(12.00),
            },
            CategorySummary {
                category: "Rent".to_string(),
                total_amount: dec!(1234.50),
            },
        ]
    );
    assert_eq!(total_by_flow(&labeled, Flow::Credit), dec!(2520.00));
    assert_eq!(total_by_flow(&labeled, Flow::Debit), dec!(1310.80));
}

#[rstest]
fn test_new_category_then_learn(sample_statement: String) {
    let temp = tempdir::TempDir::new("test").unwrap();
    let mut store = RuleStore::load(temp.path().join("rules").join("categories.json")).unwrap();

    assert!(add_category(&mut store, "dining").unwrap());
    assert!(!store.add_category("  Dining ").unwrap());

    let labeled = categorize(&parse_statement(sample_statement.as_bytes()).unwrap(), &store);
    assert!(labeled.iter().all(|t| t.category == UNCATEGORIZED));

    let edited: Vec<Transaction> = labeled
        .iter()
        .map(|t| match t.details.trim() {
            "Cafe Luna" => t.clone().with_category("Dining"),
            _ => t.clone(),
        })
        .collect();
    assert_eq!(apply_user_corrections(&labeled, &edited, &mut store).unwrap(), 1);

    let again = categorize(&labeled, &store);
    assert_eq!(categories(&again)[1], "Dining");
}

#[rstest]
fn test_correction_to_missing_category_is_refused(sample_statement: String, sample_rules: String) {
    let temp = tempdir::TempDir::new("test").unwrap();
    let mut store = write_rules(&temp, &sample_rules);
    let before = fs::read_to_string(store.path()).unwrap();

    let labeled = categorize(&parse_statement(sample_statement.as_bytes()).unwrap(), &store);
    let mut edited = labeled.clone();
    edited[1].category = "Coffee".to_string();

    assert!(matches!(
        apply_user_corrections(&labeled, &edited, &mut store),
        Err(Error::UnknownCategory(_))
    ));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[rstest]
#[case(
    indoc! { r#"
        Date,Amount,Debit/Credit
        02 Jan 2024,54.30,Debit
    "# },
)]
#[case(
    indoc! { r#"
        Date,Details,Amount,Debit/Credit
        02 Jan 2024,Big Mart,54.30,Debit
        2024-01-03,Cafe Luna,12.00,Debit
    "# },
)]
#[case(
    indoc! { r#"
        Date,Details,Amount,Debit/Credit
        02 Jan 2024,Big Mart,54.30,Debit
        03 Jan 2024,Cafe Luna,12.00,Transfer
    "# },
)]
#[case(
    indoc! { r#"
        Date,Details,Amount,Debit/Credit
        05 Jan 24,Big Mart,54.30,Debit
    "# },
)]
fn test_bad_statements_produce_nothing(#[case] statement: &str) {
    let result = parse_statement(statement.as_bytes());
    assert!(matches!(
        result,
        Err(Error::Schema { .. }) | Err(Error::Parse { .. })
    ));
}

#[test]
fn test_corrupt_rules_are_not_replaced() {
    let temp = tempdir::TempDir::new("test").unwrap();
    let path = temp.path().join("categories.json");
    fs::write(&path, r#"{"Groceries": ["big mart"]}"#).unwrap();

    assert!(matches!(
        RuleStore::load(&path),
        Err(Error::CorruptStore { .. })
    ));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"{"Groceries": ["big mart"]}"#
    );
}
