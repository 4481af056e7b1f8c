use clap::Subcommand;
use serde_json::{json, Value};

use crate::api::Column;
use crate::cli::config::CliContext;
use crate::cli::utils::{output_record, output_table};
use crate::cli::OutputFormat;
use crate::dashboard::{Dashboard, PAGE_SIZE, POPULAR_LIMIT, POSTS_TAB_LIMIT};
use crate::models::{format_date, format_date_time, or_na};

#[derive(Subcommand)]
pub enum DashboardCommands {
    #[command(about = "Totals of articles, authors and comments")]
    Stats,

    #[command(about = "Articles ranked by comment count")]
    Popular {
        #[arg(long, default_value_t = POPULAR_LIMIT)]
        limit: usize,
    },

    #[command(about = "Most recently published articles")]
    Recent {
        #[arg(long, default_value_t = POSTS_TAB_LIMIT)]
        limit: usize,
    },

    #[command(about = "Recent activity across news, comments and users")]
    Activity {
        #[arg(long, default_value_t = PAGE_SIZE, help = "Entries per page")]
        limit: usize,
        #[arg(long, default_value_t = 1, help = "Pages to show, as if pressing \"load more\"")]
        pages: usize,
    },

    #[command(about = "Latest comments")]
    Comments {
        #[arg(long, default_value_t = PAGE_SIZE, help = "Comments per page")]
        limit: usize,
        #[arg(long, default_value_t = 1, help = "Pages to show, as if pressing \"load more\"")]
        pages: usize,
    },
}

pub async fn handle(cmd: DashboardCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let api = ctx.api()?;
    let dashboard = Dashboard::load(&api).await?;

    match cmd {
        DashboardCommands::Stats => output_record(&output_format, &serde_json::to_value(dashboard.stats())?),
        DashboardCommands::Popular { limit } => {
            const COLUMNS: &[Column] = &[
                Column::new("ID", "id"),
                Column::new("Title", "title"),
                Column::new("Comments", "comment_count"),
            ];
            let rows: Vec<Value> = dashboard
                .popular(limit)
                .iter()
                .map(|post| {
                    json!({
                        "id": post.news.id,
                        "title": or_na(post.news.title.as_deref()),
                        "comment_count": post.comment_count,
                    })
                })
                .collect();
            output_table(&output_format, "popular", COLUMNS, &rows)
        }
        DashboardCommands::Recent { limit } => {
            const COLUMNS: &[Column] = &[
                Column::new("ID", "id"),
                Column::new("Title", "title"),
                Column::new("Publish Date", "publish_date"),
            ];
            let rows: Vec<Value> = dashboard
                .recent(limit)
                .iter()
                .map(|news| {
                    json!({
                        "id": news.id,
                        "title": or_na(news.title.as_deref()),
                        "publish_date": format_date(news.publish_date.as_deref()),
                    })
                })
                .collect();
            output_table(&output_format, "recent", COLUMNS, &rows)
        }
        DashboardCommands::Activity { limit, pages } => {
            const COLUMNS: &[Column] = &[
                Column::new("", "marker"),
                Column::new("When", "when"),
                Column::new("Type", "type"),
                Column::new("Who", "title"),
                Column::new("What", "text"),
            ];
            let rows: Vec<Value> = dashboard
                .activity_page(limit, pages)
                .iter()
                .map(|entry| {
                    json!({
                        "marker": if entry.active { "*" } else { "" },
                        "when": entry.at.format("%d/%m/%Y, %H:%M:%S").to_string(),
                        "type": entry.kind.label(),
                        "title": entry.title,
                        "text": entry.text,
                        "active": entry.active,
                    })
                })
                .collect();
            output_table(&output_format, "activity", COLUMNS, &rows)
        }
        DashboardCommands::Comments { limit, pages } => {
            const COLUMNS: &[Column] = &[
                Column::new("Author", "author"),
                Column::new("Created At", "created_at"),
                Column::new("Content", "content"),
            ];
            let rows: Vec<Value> = dashboard
                .comments_page(limit, pages)
                .iter()
                .map(|comment| {
                    json!({
                        "id": comment.id,
                        "author": comment.author_name(),
                        "created_at": format_date_time(comment.created_at.as_deref()),
                        "content": comment.content.clone().unwrap_or_default(),
                    })
                })
                .collect();
            output_table(&output_format, "comments", COLUMNS, &rows)?;
            if matches!(output_format, OutputFormat::Text) && dashboard.has_more_comments(limit, pages) {
                eprintln!("More comments available, use --pages {}", pages.max(1) + 1);
            }
            Ok(())
        }
    }
}
