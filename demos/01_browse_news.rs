use chrono::Utc;
use finnews_rs::{
    Feed, FeedOptions, FeedQuery, FilterState, ListDisplay, NewsCategory, NewsClientBuilder,
    format_relative,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // FINNEWS_API_URL points the client at another host.
    let client = NewsClientBuilder::from_env()?.build()?;

    println!("--- Latest market news ---");
    let filters = FilterState::default().set_category(Some(NewsCategory::Market));
    let mut feed = Feed::new(&client, FeedQuery::from_filters(&filters), FeedOptions::default());

    // Load up to three pages.
    for _ in 0..3 {
        if !feed.fetch_next().await? {
            break;
        }
    }

    let now = Utc::now();
    match feed.display() {
        ListDisplay::Items {
            items, has_more, ..
        } => {
            for item in &items {
                println!(
                    "  [{}] {} ({})",
                    item.source,
                    item.headline,
                    format_relative(item.published_at, now)
                );
            }
            if !has_more {
                println!("  All news loaded.");
            }
        }
        ListDisplay::Empty => println!("  No news found."),
        ListDisplay::Error { message } => println!("  Failed to load news: {message}"),
        ListDisplay::Loading => {}
    }
    println!();

    println!("--- One article ---");
    if let Some(first) = feed.items().first() {
        let detail = client.news_detail(&first.id).await?;
        println!("  {}", detail.headline);
        println!("  {}", detail.summary);
        println!("  Symbols: {}", detail.symbols.join(", "));
        println!("  {}", detail.url);
    }

    Ok(())
}
