use std::time::Duration;

use finnews_rs::{FilterStore, NewsClientBuilder, NewsSource, NewsView, Phase};
use tracing_subscriber::EnvFilter;
use url::Url;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finnews_rs=debug")),
        )
        .init();

    let client = NewsClientBuilder::from_env()?.build()?;
    let filters = FilterStore::from_url(Url::parse("https://app.example.com/news?source=finnhub")?);
    let mut view = NewsView::new(&client, filters);

    view.load_more().await?;
    println!("Loaded {} items from Finnhub.", view.feed().items().len());

    println!("--- Watching for new items for 60 seconds ---");
    let mut rx = view.stream().subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(60));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            () = &mut deadline => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                match state.phase {
                    Phase::Connected if state.new_count > 0 => {
                        println!("  {} new items", state.new_count);
                    }
                    Phase::Reconnecting => println!("  connecting... (attempt {})", state.retry_count),
                    Phase::Failed => {
                        println!("  live updates unavailable");
                        break;
                    }
                    _ => {}
                }
                if state.new_count >= 5 {
                    println!("  Showing new items...");
                    view.show_new_items().await?;
                    println!("  Now showing {} items.", view.feed().items().len());
                }
            }
        }
    }

    println!("--- Switching to SEC filings ---");
    view.set_filters(|s| s.set_source(Some(NewsSource::Sec)));
    view.load_more().await?;
    println!("Loaded {} SEC items.", view.feed().items().len());

    view.shutdown().await;
    Ok(())
}
