use std::time::Duration;

use finnews_rs::filters::{DEFAULT_DEBOUNCE, Debouncer};
use finnews_rs::{FilterState, FilterStore, NewsSource, SearchBox};
use tokio::time::{Instant, advance};

#[tokio::test(start_paused = true)]
async fn value_settles_after_quiet_period() {
    let mut d = Debouncer::new(Duration::from_millis(300));
    let start = Instant::now();

    d.push("a");
    advance(Duration::from_millis(200)).await;
    assert_eq!(d.take_ready(), None);

    d.push("ab");
    advance(Duration::from_millis(200)).await;
    assert_eq!(d.take_ready(), None, "new input restarts the quiet period");

    assert_eq!(d.settled().await, Some("ab"));
    assert_eq!(start.elapsed(), Duration::from_millis(500));
    assert!(!d.is_pending());
}

#[tokio::test(start_paused = true)]
async fn nothing_pending_settles_immediately() {
    let mut d: Debouncer<String> = Debouncer::new(DEFAULT_DEBOUNCE);
    assert_eq!(d.settled().await, None);

    d.push("x".into());
    assert_eq!(d.cancel().as_deref(), Some("x"));
    assert_eq!(d.settled().await, None);
}

#[tokio::test(start_paused = true)]
async fn keystrokes_commit_once_after_typing_stops() {
    let mut store = FilterStore::new(
        FilterState::default().set_source(Some(NewsSource::Sec)),
        Vec::<FilterState>::new(),
    );
    let mut search = SearchBox::new("");

    for text in ["a", "ap", "app", "appl", "apple"] {
        search.input(text);
        advance(Duration::from_millis(100)).await;
    }
    assert_eq!(search.text(), "apple");
    assert_eq!(store.state().query(), "", "nothing committed while typing");

    assert!(search.settle_into(&mut store).await);

    assert_eq!(store.state().query(), "apple");
    assert_eq!(store.state().source(), None);
    assert_eq!(store.history().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn unchanged_text_is_not_committed() {
    let mut store = FilterStore::new(FilterState::default().set_search("fed"), ());
    let mut search = SearchBox::new("fed");

    search.input("fe");
    search.input("fed");
    assert!(!search.settle_into(&mut store).await);
}

#[tokio::test(start_paused = true)]
async fn emptied_box_leaves_search_mode() {
    let mut store = FilterStore::new(FilterState::default().set_search("fed"), ());
    let mut search = SearchBox::new("fed");

    search.input("");
    assert!(search.settle_into(&mut store).await);
    assert!(!store.state().is_search_mode());
}

#[tokio::test(start_paused = true)]
async fn clear_button_is_immediate() {
    let mut store = FilterStore::new(FilterState::default().set_search("fed"), ());
    let mut search = SearchBox::new("fed");
    search.input("fed r");

    search.clear(&mut store);

    assert_eq!(search.text(), "");
    assert!(!store.state().is_search_mode());
    assert_eq!(search.settled().await, None, "pending input was dropped");
}

#[test]
fn sync_mirrors_external_changes_without_committing() {
    let mut search = SearchBox::new("old");
    search.sync("new");
    assert_eq!(search.text(), "new");
}
