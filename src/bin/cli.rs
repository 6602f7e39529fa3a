use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lingora::models::product::list_products;
use lingora::models::store::ContentStore;
use lingora::models::user::{hash_password, list_admin_users, AdminUser, Role};
use lingora::search::{
    JsonFileStore, Key, RecentSearches, SearchAction, SearchBox, SearchOptions, Searcher,
};
use tracing::Level;

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the seeded admin accounts
    ListUsers,
    /// List the seeded product catalog
    ListProducts,
    /// Prompt for a password and print its hash for the config file
    HashPassword,
    /// Run a query through the debounced search box
    Search { query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing/logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let cli = Cli::parse();

    match &cli.command {
        Commands::ListUsers => {
            let store = demo_store();
            for user in list_admin_users(&store).await {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.login_name,
                    user.display_name,
                    user.role.as_str(),
                    if user.is_active() { "active" } else { "inactive" },
                );
            }
        }
        Commands::ListProducts => {
            let store = demo_store();
            for product in list_products(&store).await {
                println!(
                    "{}\t{}\t{}\t{}.{:02}",
                    product.id,
                    product.name,
                    product.category,
                    product.price_cents / 100,
                    product.price_cents % 100,
                );
            }
        }
        Commands::HashPassword => {
            let password = rpassword::prompt_password("Password: ")?;
            if password.len() < 8 {
                return Err(anyhow::anyhow!("password must be at least 8 characters"));
            }
            println!("{}", hash_password(&password)?);
        }
        Commands::Search { query } => {
            run_search(query).await?;
        }
    }

    Ok(())
}

fn demo_store() -> ContentStore {
    ContentStore::seeded(AdminUser::new(
        "admin",
        "unset",
        "Administrator",
        "admin@localhost",
        Role::Admin,
    ))
}

/// Feed the query through the search box one keystroke at a time, print the
/// result dropdown, then submit it the way Enter would.
async fn run_search(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(anyhow::anyhow!("query must not be empty"));
    }

    let store = Arc::new(demo_store());
    let recents = RecentSearches::load(Arc::new(JsonFileStore::new("recent_searches.json")));
    let searcher: Arc<dyn Searcher> = store;
    let (search_box, mut actions) = SearchBox::spawn(searcher, recents, SearchOptions::default());

    let mut typed = String::new();
    for ch in query.chars() {
        typed.push(ch);
        search_box.input(typed.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tokio::time::sleep(Duration::from_millis(400)).await;

    let state = search_box.state();
    if let Some(error) = state.error {
        println!("search failed: {}", error);
        return Ok(());
    }

    if state.results.is_empty() {
        println!("no results for {:?}", query);
    }
    for (index, result) in state.results.iter().enumerate() {
        match &result.subtitle {
            Some(subtitle) => println!(
                "{:2}. [{}] {} / {} ({})",
                index + 1,
                result.kind.as_str(),
                result.title,
                subtitle,
                result.url
            ),
            None => println!(
                "{:2}. [{}] {} ({})",
                index + 1,
                result.kind.as_str(),
                result.title,
                result.url
            ),
        }
    }

    search_box.key(Key::Enter);
    if let Some(SearchAction::Navigate(target)) = actions.recv().await {
        println!("submit -> {}", target);
    }
    println!("recent searches: {:?}", search_box.state().recents);

    Ok(())
}
