use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use idea_board_engine::{
    find_similar, normalize_snapshot, rank, FeedFilter, Idea, RankMode, SimilarOptions,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "idea-board-cli")]
#[command(about = "Idea Board ranking CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON array of idea documents
    #[arg(short, long, global = true, default_value = "ideas.json")]
    input: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ranked feed
    Rank {
        /// chronological, new, top or hot
        #[arg(short, long, default_value = "chronological")]
        mode: RankMode,

        /// Reference instant (RFC 3339), defaults to now
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Maximum ideas to print
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Search text
        #[arg(short, long)]
        search: Option<String>,

        /// Tag category
        #[arg(short, long)]
        tag: Option<String>,

        /// Only ideas submitted by this user id
        #[arg(long)]
        owner: Option<String>,
    },

    /// Look for near-duplicates of a text
    Similar {
        /// Candidate idea text
        text: String,

        #[arg(long, default_value = "0.3")]
        threshold: f64,

        #[arg(long, default_value = "3")]
        max_results: usize,

        #[arg(long, default_value = "20")]
        min_length: usize,
    },
}

fn load_ideas(path: &Path) -> anyhow::Result<Vec<Idea>> {
    let raw = std::fs::read_to_string(path)?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    Ok(normalize_snapshot(values))
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let ideas = load_ideas(&cli.input)?;

    match cli.command {
        Commands::Rank {
            mode,
            now,
            limit,
            search,
            tag,
            owner,
        } => {
            let now = now.unwrap_or_else(Utc::now);
            let filtered = FeedFilter::new(search, tag).with_owner(owner).apply(&ideas);
            let ranked = rank(&filtered, mode, now);

            println!("📋 {} ideas ({} shown, mode: {})", ranked.len(), ranked.len().min(limit), mode);
            for (i, idea) in ranked.iter().take(limit).enumerate() {
                let tags = if idea.tags.is_empty() {
                    String::new()
                } else {
                    format!("  #{}", idea.tags.join(" #"))
                };
                println!(
                    "   {:>3}. [{:>4}] {} ({}, {}){}",
                    i + 1,
                    idea.score_label(),
                    idea.text,
                    idea.display_author(),
                    idea.created_at.format("%Y-%m-%d %H:%M"),
                    tags
                );
            }
        }

        Commands::Similar { text, threshold, max_results, min_length } => {
            let options = SimilarOptions {
                min_length,
                threshold,
                max_results,
            };

            let matches = find_similar(&text, &ideas, &options);
            if matches.is_empty() {
                println!("✅ No similar ideas found");
            } else {
                println!("⚠️ {} similar idea(s):", matches.len());
                for m in &matches {
                    println!("   {:>3}%  {} [{}]", m.percent(), m.idea.text, m.idea.id);
                }
            }
        }
    }

    Ok(())
}
