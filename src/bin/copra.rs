//! Copra CLI — co-purchase recommendations from historical orders.
//!
//! Usage:
//!   copra build --orders orders.csv [--name NAME] [--db path]
//!   copra recommend --model NAME [--top-n N] [--db path] ITEM...
//!   copra batch (--config pipeline.yaml | --orders A --carts B --output C)
//!   copra model <subcommand> [--db path]

use clap::{Parser, Subcommand};
use copra::ingest::{OrderCsvReader, DEFAULT_ORDERS_COLUMN};
use copra::recommend::DEFAULT_TOP_N;
use copra::{
    pipeline, CopraEngine, ModelBuilder, OpenStore, PipelineConfig, RecommendQuery, SqliteStore,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "copra",
    version,
    about = "Co-purchase recommendation engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a co-purchase model from an order history CSV
    Build {
        /// Path to the order history CSV
        #[arg(long)]
        orders: PathBuf,
        /// Column holding the comma-separated item list
        #[arg(long, default_value = DEFAULT_ORDERS_COLUMN)]
        column: String,
        /// Name for the new model
        #[arg(long, default_value = "order-history")]
        name: String,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Recommend items for a cart using a stored model
    Recommend {
        /// Name of the stored model to query
        #[arg(long)]
        model: String,
        /// Number of recommendations to return
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,
        /// Path to SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Items already in the cart
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Run the batch pipeline: order history in, recommendation file out
    Batch {
        /// YAML pipeline config file
        #[arg(long, conflicts_with_all = ["orders", "carts", "output"])]
        config: Option<PathBuf>,
        /// Path to the order history CSV
        #[arg(long, requires_all = ["carts", "output"])]
        orders: Option<PathBuf>,
        /// Path to the cart query CSV
        #[arg(long)]
        carts: Option<PathBuf>,
        /// Path for the output CSV
        #[arg(long)]
        output: Option<PathBuf>,
        /// Number of recommendations per cart
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Manage stored models
    Model {
        #[command(subcommand)]
        action: ModelAction,
        /// Path to SQLite database file
        #[arg(long, global = true)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// List all stored models
    List,
    /// Show details of a stored model
    Info {
        /// Name of the model
        name: String,
    },
    /// Delete a stored model by name
    Delete {
        /// Name of the model to delete
        name: String,
    },
}

/// Get the default database path (~/.local/share/copra/copra.db)
fn default_db_path() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    let copra_dir = data_dir.join("copra");
    std::fs::create_dir_all(&copra_dir).ok();
    copra_dir.join("copra.db")
}

fn open_engine(db: Option<PathBuf>) -> Result<CopraEngine, String> {
    let db_path = db.unwrap_or_else(default_db_path);
    let store =
        SqliteStore::open(&db_path).map_err(|e| format!("Failed to open database: {}", e))?;
    let engine = CopraEngine::with_store(Arc::new(store));
    engine
        .load_all()
        .map_err(|e| format!("Failed to load models: {}", e))?;
    Ok(engine)
}

fn cmd_build(engine: &CopraEngine, orders: &PathBuf, column: &str, name: &str) -> i32 {
    if engine.find_model_by_name(name).is_some() {
        eprintln!("Error: model '{}' already exists", name);
        return 1;
    }

    let orders_read = match OrderCsvReader::with_column(column).read_path(orders) {
        Ok(orders) => orders,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", orders.display(), e);
            return 1;
        }
    };

    let mut builder = ModelBuilder::new().with_source(orders.display().to_string());
    builder.add_orders(&orders_read);
    let model = builder.build(name);

    let (items, pairs, count) = (model.item_count(), model.pair_count(), orders_read.len());
    match engine.insert_model(model) {
        Ok(id) => {
            println!(
                "Built model '{}' ({}) from {} orders: {} items, {} pairs",
                name, id, count, items, pairs
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_recommend(engine: &CopraEngine, name: &str, items: &[String], top_n: usize) -> i32 {
    let model = match engine.find_model_by_name(name) {
        Some(model) => model,
        None => {
            eprintln!("Error: model '{}' not found", name);
            return 1;
        }
    };

    let recommendation = match RecommendQuery::for_cart(items.iter().cloned())
        .top_n(top_n)
        .execute(&model)
    {
        Ok(recommendation) => recommendation,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    println!("{:<4}  {:<24}  {:>8}", "RANK", "ITEM", "SCORE");
    println!("{}", "-".repeat(40));
    for (rank, item) in recommendation.items.iter().enumerate() {
        match recommendation.candidates.get(rank) {
            Some(candidate) => {
                println!("{:<4}  {:<24}  {:>8.2}", rank + 1, item, candidate.score)
            }
            None => println!("{:<4}  {:<24}  {:>8}", rank + 1, item, "(fill)"),
        }
    }
    0
}

fn cmd_batch(
    config: Option<PathBuf>,
    orders: Option<PathBuf>,
    carts: Option<PathBuf>,
    output: Option<PathBuf>,
    top_n: Option<usize>,
) -> i32 {
    let mut pipeline_config = match (config, orders, carts, output) {
        (Some(path), _, _, _) => match PipelineConfig::from_yaml_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: cannot load '{}': {}", path.display(), e);
                return 1;
            }
        },
        (None, Some(orders), Some(carts), Some(output)) => {
            PipelineConfig::new(orders, carts, output)
        }
        _ => {
            eprintln!("error: pass either --config or all of --orders/--carts/--output");
            return 1;
        }
    };
    if let Some(top_n) = top_n {
        pipeline_config.top_n = top_n;
    }

    match pipeline::run(&pipeline_config) {
        Ok(summary) => {
            println!(
                "Processed {} carts against {} orders ({} items); {} rows needed fallback fill",
                summary.carts_processed,
                summary.orders_read,
                summary.distinct_items,
                summary.filled_rows
            );
            println!("Wrote {}", pipeline_config.output.display());
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_model_list(engine: &CopraEngine) -> i32 {
    let ids = engine.list_models();
    if ids.is_empty() {
        println!("No models stored.");
        return 0;
    }
    println!(
        "{:<36}  {:<24}  {:>7}  {:>7}",
        "ID", "NAME", "ITEMS", "ORDERS"
    );
    println!("{}", "-".repeat(80));
    for id in ids {
        if let Some(model) = engine.get_model(&id) {
            println!(
                "{:<36}  {:<24}  {:>7}  {:>7}",
                id,
                model.name(),
                model.item_count(),
                model.order_count()
            );
        }
    }
    0
}

fn cmd_model_info(engine: &CopraEngine, name: &str) -> i32 {
    let model = match engine.find_model_by_name(name) {
        Some(model) => model,
        None => {
            eprintln!("Error: model '{}' not found", name);
            return 1;
        }
    };

    println!("Model:   {} ({})", model.name(), model.id());
    println!("Orders:  {}", model.order_count());
    println!("Items:   {}", model.item_count());
    println!("Pairs:   {}", model.pair_count());
    if let Some(built_at) = model.metadata().built_at {
        println!("Built:   {}", built_at.to_rfc3339());
    }
    if let Some(source) = &model.metadata().source {
        println!("Source:  {}", source);
    }

    // Top of the popularity table, most popular first
    let mut popularity: Vec<_> = model.popularity_table().collect();
    popularity.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    if !popularity.is_empty() {
        println!();
        println!("{:<24}  {:>7}", "TOP ITEMS", "ORDERS");
        for (item, orders) in popularity.into_iter().take(10) {
            println!("{:<24}  {:>7}", item, orders);
        }
    }
    0
}

fn cmd_model_delete(engine: &CopraEngine, name: &str) -> i32 {
    let id = match engine.find_model_by_name(name) {
        Some(model) => model.id().clone(),
        None => {
            eprintln!("Error: model '{}' not found", name);
            return 1;
        }
    };
    match engine.remove_model(&id) {
        Ok(true) => {
            println!("Deleted model '{}'", name);
            0
        }
        Ok(false) => {
            eprintln!("Error: model '{}' not found", name);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            orders,
            column,
            name,
            db,
        } => {
            let engine = match open_engine(db) {
                Ok(engine) => engine,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            std::process::exit(cmd_build(&engine, &orders, &column, &name));
        }
        Commands::Recommend {
            model,
            top_n,
            db,
            items,
        } => {
            let engine = match open_engine(db) {
                Ok(engine) => engine,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            std::process::exit(cmd_recommend(&engine, &model, &items, top_n));
        }
        Commands::Batch {
            config,
            orders,
            carts,
            output,
            top_n,
        } => {
            std::process::exit(cmd_batch(config, orders, carts, output, top_n));
        }
        Commands::Model { action, db } => {
            let engine = match open_engine(db) {
                Ok(engine) => engine,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let code = match action {
                ModelAction::List => cmd_model_list(&engine),
                ModelAction::Info { name } => cmd_model_info(&engine, &name),
                ModelAction::Delete { name } => cmd_model_delete(&engine, &name),
            };
            std::process::exit(code);
        }
    }
}
