use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use trivia_api::config::get_configuration;
use trivia_api::db::{self, Category, PgStore, Question, TriviaStore};
use trivia_api::telemetry::init_tracing;

const CATEGORIES_FILE: &str = "categories.csv";
const QUESTIONS_FILE: &str = "questions.csv";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Settings file layered under the DB_* environment variables
    #[clap(long)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import categories.csv and questions.csv from a directory
    Import { path: PathBuf },
    /// Export categories and questions into a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = get_configuration(cli.config.as_deref()).context("Failed to read settings")?;
    let pool = db::establish_connection(&settings.database)
        .await
        .context("Cannot connect to DB")?;
    db::run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    match cli.command {
        Commands::Export { path } => export_data(&store, &path).await.context("Cannot export"),
        Commands::Import { path } => import_data(&store, &path).await.context("Cannot import"),
    }
}

fn write_to(path: &Path, data: Vec<impl Serialize>) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);
    for line in data {
        wtr.serialize(line)?;
    }
    wtr.flush()?;
    Ok(())
}

fn read_from<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let file = std::fs::File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    for record in rdr.deserialize() {
        let record: T = record?;
        out.push(record);
    }
    Ok(out)
}

async fn export_data(store: &PgStore, path: &Path) -> anyhow::Result<()> {
    let categories = store.categories().await?;
    let questions = store.questions().await?;
    if !path.exists() {
        std::fs::create_dir_all(path)?
    }
    tracing::info!(
        "Exporting {} categories and {} questions to {}",
        categories.len(),
        questions.len(),
        path.display()
    );
    write_to(&path.join(CATEGORIES_FILE), categories)?;
    write_to(&path.join(QUESTIONS_FILE), questions)?;
    Ok(())
}

async fn import_data(store: &PgStore, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_from(&path.join(CATEGORIES_FILE))?;
    let questions: Vec<Question> = read_from(&path.join(QUESTIONS_FILE))?;
    tracing::info!(
        "Importing {} categories and {} questions from {}",
        categories.len(),
        questions.len(),
        path.display()
    );
    store.import(categories, questions).await?;
    Ok(())
}
