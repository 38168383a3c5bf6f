pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "feedandeat")]
#[command(about = "FeedAndEat - Recipe sharing API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, env = "HOST")]
        host: Option<String>,
    },

    /// Run database migrations
    Migrate,

    /// Import recipes from a JSON file
    ImportRecipes {
        /// JSON array of recipes
        file: PathBuf,

        /// Email of the user that will own the imported recipes
        #[arg(long, env = "SYSTEM_EMAIL", default_value = "admin@feedandeat.local")]
        system_email: String,

        /// Username of that user
        #[arg(long, env = "SYSTEM_USERNAME", default_value = "admin")]
        system_username: String,

        /// Delete all existing recipes before importing
        #[arg(long)]
        replace: bool,
    },

    /// Import tag names from a JSON file
    ImportTags {
        /// JSON array of tag names
        file: PathBuf,
    },

    /// Search recipes on a running server
    Search {
        /// Search query
        query: Option<String>,

        /// Comma-separated tags, any of which may match
        #[arg(long)]
        tags: Option<String>,

        /// Sort order: new, rating or popularity
        #[arg(long)]
        sort: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<i64>,
    },
}
