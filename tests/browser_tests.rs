//! Fetch-summarize engine tests: admission gate, retry policy, timeouts and
//! discarding of blocked or irrelevant pages.

mod common;

use ares_research::research::{BrowserConfig, FetchSummarizeEngine, LinkMap};
use ares_research::types::WebPage;
use common::mocks::{fetch_error, source_url, PromptKind, ScriptedFetch, ScriptedLLM};
use std::sync::Arc;
use std::time::Duration;

fn fast_config() -> BrowserConfig {
    BrowserConfig::default()
        .with_retry_backoff(Duration::from_millis(1))
        .with_fetch_timeout(Duration::from_secs(2))
}

fn links(entries: &[(&str, &[&str])]) -> LinkMap {
    entries
        .iter()
        .map(|(query, urls)| (query.to_string(), urls.iter().map(|u| u.to_string()).collect()))
        .collect()
}

/// Summarizes every page as "Summary of <url>".
fn summarizing_llm() -> Arc<ScriptedLLM> {
    ScriptedLLM::new(|prompt| {
        Ok(format!("Summary of {}", source_url(prompt).unwrap_or("unknown")))
    })
}

#[tokio::test]
async fn test_admission_gate_caps_in_flight_fetches() {
    let urls: Vec<String> = (0..12).map(|i| format!("https://site{}.gov/page", i)).collect();
    let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let links = links(&[
        ("q1", &url_refs[0..4]),
        ("q2", &url_refs[4..8]),
        ("q3", &url_refs[8..12]),
    ]);

    let fetch = ScriptedFetch::serving("Battery chemistry overview")
        .with_delay(Duration::from_millis(30))
        .shared();
    let engine = FetchSummarizeEngine::new(summarizing_llm(), fetch.clone(), fast_config().with_max_concurrent(3));

    let summaries = engine.summarize_all(&links, &[], 3).await;

    assert_eq!(summaries.len(), 12);
    assert_eq!(fetch.max_in_flight(), 3);
}

#[tokio::test]
async fn test_permanent_failure_is_retried_then_dropped() {
    let fetch = ScriptedFetch::new(|url, _| {
        if url.contains("broken") {
            Err(fetch_error(url))
        } else {
            Ok(WebPage::new(url, "Recycling rates by state"))
        }
    })
    .shared();
    let llm = summarizing_llm();
    let engine = FetchSummarizeEngine::new(llm.clone(), fetch.clone(), fast_config());

    let links = links(&[("recycling", &["https://epa.gov/a", "https://broken.edu/b", "https://doe.gov/c"])]);
    let summaries = engine.summarize_all(&links, &[], 3).await;

    assert_eq!(fetch.attempts("https://broken.edu/b"), 3);
    assert_eq!(fetch.attempts("https://epa.gov/a"), 1);
    assert_eq!(summaries.len(), 2);
    assert!(summaries.iter().all(|(url, _)| !url.contains("broken")));
    assert_eq!(llm.count(PromptKind::Summarize), 2);
}

#[tokio::test]
async fn test_transient_failure_recovers_on_a_later_attempt() {
    let fetch = ScriptedFetch::new(|url, attempt| {
        if attempt < 3 {
            Err(fetch_error(url))
        } else {
            Ok(WebPage::new(url, "Third time lucky"))
        }
    })
    .shared();
    let engine = FetchSummarizeEngine::new(summarizing_llm(), fetch.clone(), fast_config());

    let summaries = engine
        .summarize_all(&links(&[("q", &["https://flaky.org/x"])]), &[], 1)
        .await;

    assert_eq!(fetch.attempts("https://flaky.org/x"), 3);
    assert_eq!(
        summaries,
        vec![("https://flaky.org/x".to_string(), "Summary of https://flaky.org/x".to_string())]
    );
}

#[tokio::test]
async fn test_timeout_counts_as_a_failed_attempt() {
    let fetch = ScriptedFetch::serving("never seen")
        .with_delay(Duration::from_millis(200))
        .shared();
    let config = fast_config()
        .with_fetch_timeout(Duration::from_millis(20))
        .with_max_retries(1);
    let engine = FetchSummarizeEngine::new(summarizing_llm(), fetch.clone(), config);

    let summaries = engine
        .summarize_all(&links(&[("q", &["https://slow.gov/report"])]), &[], 1)
        .await;

    assert!(summaries.is_empty());
    assert_eq!(fetch.attempts("https://slow.gov/report"), 2);
}

#[tokio::test]
async fn test_blocked_pages_and_null_summaries_contribute_nothing() {
    let fetch = ScriptedFetch::new(|url, _| {
        let text = match url {
            "https://blocked.gov/a" => "Access Denied",
            "https://empty.gov/b" => "   ",
            _ => "Cobalt recovery techniques",
        };
        Ok(WebPage::new(url, text))
    })
    .shared();
    let llm = ScriptedLLM::new(|prompt| match source_url(prompt) {
        Some("https://offtopic.org/d") => Ok("null".to_string()),
        Some(url) => Ok(format!("Summary of {}", url)),
        None => Ok("null".to_string()),
    });
    let engine = FetchSummarizeEngine::new(llm.clone(), fetch, fast_config());

    let links = links(&[(
        "cobalt",
        &[
            "https://blocked.gov/a",
            "https://empty.gov/b",
            "https://mit.edu/c",
            "https://offtopic.org/d",
        ],
    )]);
    let summaries = engine.summarize_all(&links, &[], 3).await;

    assert_eq!(
        summaries,
        vec![("https://mit.edu/c".to_string(), "Summary of https://mit.edu/c".to_string())]
    );
    // Discarded pages never reach the model.
    assert_eq!(llm.count(PromptKind::Summarize), 2);
}

#[tokio::test]
async fn test_summarization_failure_drops_only_that_page() {
    let fetch = ScriptedFetch::serving("Policy overview").shared();
    let llm = ScriptedLLM::new(|prompt| match source_url(prompt) {
        Some("https://a.gov/1") => Err(ares_research::AppError::LLM("overloaded".to_string())),
        Some(url) => Ok(format!("Summary of {}", url)),
        None => Ok("null".to_string()),
    });
    let engine = FetchSummarizeEngine::new(llm, fetch, fast_config());

    let summaries = engine
        .summarize_all(&links(&[("q", &["https://a.gov/1", "https://b.gov/2"])]), &[], 1)
        .await;

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].0, "https://b.gov/2");
}

#[tokio::test]
async fn test_fan_out_is_capped_per_query() {
    let fetch = ScriptedFetch::serving("Lithium supply chain").shared();
    let engine = FetchSummarizeEngine::new(summarizing_llm(), fetch.clone(), fast_config());

    let urls: Vec<String> = (0..6).map(|i| format!("https://site{}.edu/p", i)).collect();
    let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let links = links(&[("lithium", &url_refs)]);

    assert_eq!(engine.build_tasks(&links).len(), 4);

    let summaries = engine.summarize_all(&links, &[], 3).await;
    assert_eq!(summaries.len(), 4);
    assert_eq!(fetch.total_attempts(), 4);
    assert_eq!(fetch.attempts("https://site5.edu/p"), 0);
}

#[tokio::test]
async fn test_summaries_arrive_in_completion_order() {
    let submitted = ["https://slow.gov/a", "https://medium.edu/b", "https://fast.org/c"];
    let fetch = ScriptedFetch::serving("Cathode recovery data")
        .with_delay_for(submitted[0], Duration::from_millis(300))
        .with_delay_for(submitted[1], Duration::from_millis(150))
        .with_delay_for(submitted[2], Duration::from_millis(10))
        .shared();
    let engine = FetchSummarizeEngine::new(summarizing_llm(), fetch, fast_config());

    let links = links(&[("cathodes", &submitted)]);
    let submission: Vec<String> = engine.build_tasks(&links).into_iter().map(|t| t.url).collect();
    assert_eq!(submission, submitted);

    let summaries = engine.summarize_all(&links, &[], 3).await;
    let completed: Vec<&str> = summaries.iter().map(|(url, _)| url.as_str()).collect();

    assert_eq!(
        completed,
        vec!["https://fast.org/c", "https://medium.edu/b", "https://slow.gov/a"]
    );
}
