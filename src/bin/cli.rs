//! abroad-data CLI
//!
//! Fetches catalogue data through the resilient loaders, and checks or
//! repairs JSON exports offline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use abroad_data::{
    config::Config,
    error::{AppError, Result},
    models::{BlogPost, Course},
    sanitize::{sanitize_course, sanitize_courses},
    services::{ApiClient, BlogRepository, CourseRepository, JsonSource},
    validation::{Entity, ValidationReport},
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Value, json};

/// abroad-data - study-abroad catalogue loader
#[derive(Parser, Debug)]
#[command(
    name = "abroad-data",
    version,
    about = "Load and check study-abroad course and blog data"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "abroad-data.toml")]
    config: PathBuf,

    /// Override the API base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every valid course
    Courses,

    /// Show one course
    Course { id: String },

    /// List blog posts
    Blog {
        /// Only posts in this category (case-insensitive)
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one blog post
    Post { id: String },

    /// List blog categories
    Categories,

    /// Validate a JSON file of records without touching the network
    Check {
        file: PathBuf,

        #[arg(long, value_enum, default_value_t = Kind::Course)]
        kind: Kind,
    },

    /// Print sanitized courses from a JSON file
    Sanitize { file: PathBuf },

    /// Fetch courses and blog posts, then print circuit breaker states
    Breakers,

    /// Validate configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Course,
    Blog,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Validate a single record or every element of a list.
fn check_records<E: Entity>(value: &Value) -> ValidationReport {
    match value {
        Value::Array(items) => {
            let mut report = ValidationReport::default();
            for (index, item) in items.iter().enumerate() {
                report.merge(E::validate(item).prefixed(&format!("{} {}", E::LABEL, index + 1)));
            }
            report
        }
        other => E::validate(other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        log::debug!("No config at {}, using defaults", cli.config.display());
        Config::default()
    };
    config.apply_env();
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    match &cli.command {
        Command::Check { file, kind } => {
            let value = read_json(file)?;
            let report = match kind {
                Kind::Course => check_records::<Course>(&value),
                Kind::Blog => check_records::<BlogPost>(&value),
            };
            for warning in &report.warnings {
                log::warn!("{}", warning);
            }
            for error in &report.errors {
                log::error!("{}", error);
            }
            if !report.is_valid() {
                return Err(AppError::validation(format!(
                    "{} validation error(s) in {}",
                    report.errors.len(),
                    file.display()
                )));
            }
            log::info!("✓ {} is valid", file.display());
            return Ok(());
        }

        Command::Sanitize { file } => {
            let value = read_json(file)?;
            let courses = match &value {
                Value::Array(_) => sanitize_courses(&value),
                other => sanitize_course(other).into_iter().collect(),
            };
            log::info!("Recovered {} course(s)", courses.len());
            return print_json(&courses);
        }

        Command::Config => {
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
            return print_json(&config);
        }

        _ => {}
    }

    config.validate()?;
    log::info!("Using API at {}", config.api.base_url);

    let source: Arc<dyn JsonSource> = Arc::new(ApiClient::new(&config.api)?);
    let courses = CourseRepository::from_config(Arc::clone(&source), &config);
    let blog = BlogRepository::from_config(source, &config);

    match cli.command {
        Command::Courses => {
            let loaded = courses.load_courses().await?;
            if loaded.has_errors {
                log::warn!("{} problem(s) while loading courses", loaded.errors.len());
            }
            print_json(&loaded.data)?;
        }

        Command::Course { id } => match courses.get_course_by_id(&id).await {
            Some(course) => print_json(&course)?,
            None => return Err(AppError::not_found(format!("course {id}"))),
        },

        Command::Blog { category } => {
            let posts = match category {
                Some(category) => blog.get_blog_posts_by_category(&category).await,
                None => blog.get_all_blog_posts().await,
            };
            log::info!("{} post(s)", posts.len());
            print_json(&posts)?;
        }

        Command::Post { id } => match blog.get_blog_post_by_id(&id).await {
            Some(post) => print_json(&post)?,
            None => return Err(AppError::not_found(format!("blog post {id}"))),
        },

        Command::Categories => print_json(&blog.get_blog_categories().await)?,

        Command::Breakers => {
            let (course_list, posts) =
                futures::join!(courses.get_course_data_for_server(), blog.get_all_blog_posts());
            log::info!("Fetched {} course(s), {} post(s)", course_list.len(), posts.len());
            print_json(&json!({
                "courses": courses.breaker().get_state(),
                "blog": blog.breaker().get_state(),
            }))?;
        }

        Command::Check { .. } | Command::Sanitize { .. } | Command::Config => {}
    }

    Ok(())
}
