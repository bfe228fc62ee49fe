use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use spendsort::{
    apply_user_corrections, categorize, export_csv, filter_by_flow, format_amount,
    normalize_category_name, normalize_path, parse_statement_file, read_reviewed, settings_path,
    summarize, total_by_flow, use_stored_names, Flow, RuleStore, Settings, Transaction,
    STARTER_SETTINGS,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Use this rule document instead of the configured one.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Print the statement with a category for every transaction")]
    Categorize { file: PathBuf },
    #[command(about = "Show spending per category and the total of account payments")]
    Summary { file: PathBuf },
    #[command(about = "Review the categories of the statement's expenses in an editor")]
    Review { file: PathBuf },
    #[command(about = "Add a spending category")]
    AddCategory { name: String },
    #[command(about = "Teach a category to recognize a transaction description")]
    AddKeyword { category: String, keyword: String },
    #[command(about = "List the categories and their keywords")]
    List {},
    #[command(about = "Show the location of the settings.toml file")]
    ShowConfig {},
    #[command(about = "Create the settings.toml file")]
    CreateConfig {},
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateConfig {} => {
            let settings_file = settings_path()?;
            if settings_file.is_file() {
                return Err(anyhow!(
                    "The settings file {:#?} already exists.",
                    settings_file
                ));
            }
            let parent = settings_file
                .parent()
                .ok_or(anyhow!("Cannot identify parent of {:#?}", settings_file))?;
            if !parent.is_dir() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&settings_file, STARTER_SETTINGS)?;
            println!("Created {:#?}.\n", settings_file);
            println!("Edit this file to meet your needs.");
        }
        Commands::ShowConfig {} => {
            println!("{}", settings_path()?.display());
        }
        Commands::Categorize { file } => {
            let store = load_store(cli.rules)?;
            let labeled = categorize(&parse_statement_file(&file)?, &store);
            print!("{}", export_csv(&labeled)?);
        }
        Commands::Summary { file } => {
            let store = load_store(cli.rules)?;
            let labeled = categorize(&parse_statement_file(&file)?, &store);
            print_summary(&labeled);
        }
        Commands::Review { file } => {
            let mut store = load_store(cli.rules)?;
            let labeled = categorize(&parse_statement_file(&file)?, &store);
            let expenses = filter_by_flow(&labeled, Flow::Debit);
            let reviewed = review_in_editor(&expenses, &store)?;

            let learned = apply_user_corrections(&expenses, &reviewed, &mut store)?;
            info!(learned, "applied corrections");
            println!("Learned {learned} new keyword(s).\n");

            let mut updated = reviewed;
            updated.extend(filter_by_flow(&labeled, Flow::Credit));
            print_summary(&updated);
        }
        Commands::AddCategory { name } => {
            let mut store = load_store(cli.rules)?;
            if store.add_category(&name)? {
                println!("Added the category {:?}.", normalize_category_name(&name));
            } else {
                println!("The category {:?} already exists.", name.trim());
            }
        }
        Commands::AddKeyword { category, keyword } => {
            let mut store = load_store(cli.rules)?;
            let added = store.add_keyword(&category, &keyword)?;
            println!("{}", keyword_outcome(&category, &keyword, added));
        }
        Commands::List {} => {
            let store = load_store(cli.rules)?;
            for (category, keywords) in store.iter() {
                println!("{category}");
                for keyword in keywords {
                    println!("    {keyword}");
                }
            }
        }
    }

    Ok(())
}

/// Load the rule document named on the command line, or the configured one.
fn load_store(rules: Option<PathBuf>) -> Result<RuleStore> {
    let path = match rules {
        Some(path) => normalize_path(path)?,
        None => {
            let settings_file = settings_path()?;
            Settings::from_file(&settings_file)?.rules_path(&settings_file)?
        }
    };
    info!(path = %path.display(), "loading rules");
    RuleStore::load(&path).map_err(|e| {
        anyhow!("{e}\nFix or move the file aside to start from an empty rule set.")
    })
}

/// Let the user relabel transactions in their editor, until the result reads back.
///
/// Categories in the returned batch carry the store's spelling.
fn review_in_editor(expenses: &[Transaction], store: &RuleStore) -> Result<Vec<Transaction>> {
    let mut text = export_csv(expenses)?;
    loop {
        text = edit::edit_with_builder(&text, edit::Builder::new().suffix(".csv"))?;
        let problem = match read_reviewed(&text, expenses)
            .and_then(|reviewed| use_stored_names(reviewed, store))
        {
            Ok(reviewed) => return Ok(reviewed),
            Err(e) => e.to_string(),
        };
        warn!(problem = %problem, "review rejected");
        eprintln!("The reviewed statement cannot be used: {problem}");
        if !confirm("Edit again?")? {
            return Err(anyhow!("Review abandoned, no rules were changed."));
        }
    }
}

/// Describe the result of `add-keyword`.
fn keyword_outcome(category: &str, keyword: &str, added: bool) -> String {
    if added {
        format!("{category:?} now recognizes {:?}.", keyword.trim())
    } else {
        format!("{category:?} already recognizes {:?}.", keyword.trim())
    }
}

/// Ask a yes/no question on the terminal.
fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Print expenses per category followed by the total of account payments.
fn print_summary(labeled: &[Transaction]) {
    let expenses = filter_by_flow(labeled, Flow::Debit);
    let summaries = summarize(&expenses);
    let width = summaries
        .iter()
        .map(|s| s.category.len())
        .max()
        .unwrap_or(0)
        .max("Total".len());

    println!("Expenses");
    for summary in &summaries {
        println!(
            "  {:<width$}  {:>14}",
            summary.category,
            format_amount(summary.total_amount)
        );
    }
    println!(
        "  {:<width$}  {:>14}",
        "Total",
        format_amount(total_by_flow(labeled, Flow::Debit))
    );
    println!();
    println!(
        "Account payments  {}",
        format_amount(total_by_flow(labeled, Flow::Credit))
    );
}
