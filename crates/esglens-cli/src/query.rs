//! The `news` subcommand: threshold-filtered reads over the store.

use chrono::NaiveDate;
use clap::Args;
use sqlx::SqlitePool;

use esglens_core::AppConfig;
use esglens_db::{NewsFilters, QueryThresholds};

#[derive(Debug, Args)]
pub struct NewsArgs {
    /// Organization to query.
    pub organization: String,

    /// Restrict to one sustainability topic.
    #[arg(long)]
    pub topic: Option<String>,

    /// Sentiment ceiling; only articles at or below it are returned.
    #[arg(long, default_value_t = 10.0)]
    pub max_sentiment: f64,

    /// Earliest publication date (YYYY-MM-DD). Defaults to all time.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Print (min, max, avg) sentiment over the filtered set instead of
    /// listing articles.
    #[arg(long)]
    pub stats: bool,

    /// Print only the article with the lowest sentiment.
    #[arg(long)]
    pub lowest: bool,
}

pub async fn run_news_query(
    pool: &SqlitePool,
    config: &AppConfig,
    args: &NewsArgs,
) -> anyhow::Result<()> {
    if !(0.0..=10.0).contains(&args.max_sentiment) {
        anyhow::bail!("--max-sentiment must be in [0, 10]");
    }

    if esglens_db::get_organization(pool, &args.organization)
        .await?
        .is_none()
    {
        anyhow::bail!("organization '{}' is not tracked", args.organization);
    }

    if let Some(topic) = args.topic.as_deref() {
        if esglens_db::get_topic(pool, topic).await?.is_none() {
            anyhow::bail!("topic '{topic}' is not part of the catalog");
        }
    }

    let filters = NewsFilters {
        organization: &args.organization,
        topic: args.topic.as_deref(),
        max_sentiment: args.max_sentiment,
        from_date: args.from.unwrap_or_else(crate::min_date),
    };
    let thresholds = QueryThresholds::from_app_config(config);

    if args.stats {
        match esglens_db::sentiment_stats(pool, &filters, &thresholds).await? {
            Some(stats) => println!(
                "sentiment over {}: min {:.2}, max {:.2}, avg {:.2}",
                args.organization, stats.min, stats.max, stats.avg
            ),
            None => println!("no result"),
        }
        return Ok(());
    }

    if args.lowest {
        match esglens_db::lowest_sentiment_news(pool, &filters, &thresholds).await? {
            Some(article) => print_article(&article),
            None => println!("no result"),
        }
        return Ok(());
    }

    let articles = esglens_db::list_news(pool, &filters, &thresholds).await?;
    if articles.is_empty() {
        println!("no result");
        return Ok(());
    }
    for article in &articles {
        print_article(article);
    }

    Ok(())
}

fn print_article(article: &esglens_db::ArticleRow) {
    println!(
        "{:>5.2}  {}  {}  {}",
        article.sentiment, article.published_on, article.title, article.link
    );
}
