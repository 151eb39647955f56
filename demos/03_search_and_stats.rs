use std::time::Duration;

use finnews_rs::{
    CacheMode, FilterState, FilterStore, NewsClient, RetryConfig, SearchBox, UrlHistory,
};
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = NewsClient::builder()
        .base_url(Url::parse("http://localhost:3000")?)
        .timeout(Duration::from_secs(10))
        .retry_config(RetryConfig::default())
        .build()?;

    println!("--- News statistics ---");
    let stats = client.news_stats().await?;
    println!("  {} articles in total", stats.total);
    for entry in stats.top_sources(3) {
        println!("    {:<8} {}", entry.source, entry.count);
    }
    for entry in &stats.by_category {
        println!("    {:<14} {}", entry.category.label(), entry.count);
    }
    println!();

    println!("--- Debounced search box ---");
    let page = Url::parse("https://app.example.com/news")?;
    let mut filters: FilterStore<UrlHistory> = FilterStore::from_url(page);
    let mut search_box = SearchBox::new(filters.state().query());

    // Simulated typing: only the settled text is committed.
    for text in ["n", "nv", "nvd", "nvda"] {
        search_box.input(text);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    search_box.settle_into(&mut filters).await;
    println!("  Shareable URL: {}", filters.history().current());

    let query = filters.state().query().to_string();
    let results = client
        .search(query.as_str())
        .cache_mode(CacheMode::Refresh)
        .fetch()
        .await?;
    println!(
        "  Found {} results for '{query}' ({} shown).",
        results.meta.total,
        results.items.len()
    );
    for item in &results.items {
        println!("    - {} [{}]", item.headline, item.category);
    }

    search_box.clear(&mut filters);
    assert_eq!(filters.state(), FilterState::default());
    println!("  Back to browsing: {}", filters.history().current());

    Ok(())
}
