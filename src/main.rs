use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use rust_profile_db::{config::Settings, menu, store::ProfileStore};
use tracing_subscriber::{fmt, EnvFilter};

/// Main entry point for the employee profile tool.
///
/// This function:
/// 1. Parses command-line arguments for the database name and optional URI
/// 2. Initializes structured logging with tracing
/// 3. Resolves the connection URI (flag, then MONGO_URI, then prompted credentials)
/// 4. Connects and pings MongoDB (fatal on failure)
/// 5. Optionally reloads the sample data, then runs the interactive menu
///
/// # Arguments
/// - `--database NAME`: Database holding the four profile collections (default: unified_demo)
/// - `--uri URI`: Connection string, overriding MONGO_URI
/// - `--seed`: Drop the collections and reload sample data before the menu
///
/// # Example Usage
/// ```bash
/// MONGO_URI=mongodb://localhost:27017 cargo run -- --database unified_demo --seed
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let matches = Command::new("rust_profile_db")
        .about("Employee profile CRUD across four MongoDB collections with a $lookup join view")
        .arg(Arg::new("database")
            .long("database")
            .value_name("NAME")
            .default_value("unified_demo")
            .help("Database holding the Employee/Department/Developer/Tester collections"))
        .arg(Arg::new("uri")
            .long("uri")
            .value_name("URI")
            .help("MongoDB connection string (overrides MONGO_URI)"))
        .arg(Arg::new("seed")
            .long("seed")
            .action(ArgAction::SetTrue)
            .help("Drop the four collections and reload the bundled sample data"))
        .get_matches();

    let database = matches.get_one::<String>("database").unwrap().to_string();

    // Initialize structured logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // Resolve the URI: explicit flag, then environment, then prompted credentials
    let settings = match matches.get_one::<String>("uri") {
        Some(uri) => Settings::new(uri, database),
        None => match Settings::from_env(&database) {
            Ok(settings) => settings,
            Err(_) => {
                println!("MONGO_URI is not set; enter credentials to build one.");
                Settings::new(menu::prompt_for_uri().await?, database)
            }
        },
    };

    // Connect and ping; a failure here is fatal
    let store = ProfileStore::connect(&settings).await?;

    if matches.get_flag("seed") {
        store.load_sample_data().await?;
    }

    let result = menu::run_menu(&store).await;

    // Release the client even when the menu loop failed
    store.close().await;
    result
}
