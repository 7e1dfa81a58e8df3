//! Prompt templates for every research stage.
//!
//! Templates are plain functions so each stage formats exactly what it needs
//! and tests can assert on the rendered text.

use crate::types::SearchHit;

/// Report-writer persona used as the first context line during synthesis.
pub const RESEARCH_BASE_SYSTEM: &str = "You are an advanced AI research assistant.

Your task is to analyze and synthesize information into a clear, objective, and well-structured research report based on the following user input.
Instructions:
1. Extract the core research topic from the line starting with 'Topic:'.
2. Carefully consider each item under 'User Feedback:' as specific user instructions or modifications (e.g., adding focus areas, improving coverage, or preferred sources).
3. Integrate these feedback points into the report without repeating them explicitly.
4. Uphold academic integrity, evidence-based reasoning, and clarity in your writing.
5. The final output must be in Markdown format and suitable for professional or academic use.";

/// Sent on its own when a synthesized report falls short of the length floor.
pub const CONTINUE_REPORT_PROMPT: &str = "Continue to expand the content of this report and be as detailed as possible, expand the report to meet length requirements";

/// Languages the prompts have been exercised with.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en-us", "zh-cn"];

/// Topic/feedback system text shared by all stages, plus a language directive.
pub fn research_system_text(topic: &str, feedback: &str, language: &str) -> String {
    format!(
        "You are tasked with conducting an in-depth, structured investigation on the topic: {topic}.
Guidelines:
1. Prioritize information from .gov/.edu/.org/.com/ domains
2. Cross-validate facts with multiple sources.
3. Clearly distinguish between verified facts and interpretations.
4. You need to also consider the following additional needs of the user (if any): {feedback}
Please respond in {language}."
    )
}

/// System text for link collection.
pub fn collect_links_system_text(base: &str) -> String {
    format!("{base}\nFocus on finding authoritative sources.")
}

/// System text for browsing and summarization.
pub fn browse_system_text(base: &str) -> String {
    format!(
        "{base}\nAnalyze content critically and summarize the content in detail and comprehensively."
    )
}

pub fn search_topic_prompt(topic: &str, feedback: &str) -> String {
    format!(
        "Generate 2-3 optimal search queries for researching: \"{topic}\" and You need to also consider the following additional needs of the user (if any): {feedback}
Respond in JSON format like: [\"query1\", \"query2\"]"
    )
}

/// Refinement prompt. `results` pairs each query with the hits shown for it.
pub fn summarize_search_prompt(decomposition_nums: usize, results: &[(String, Vec<SearchHit>)]) -> String {
    let search_results = results
        .iter()
        .map(|(query, hits)| {
            let rendered = hits
                .iter()
                .map(|h| format!("- {} ({}): {}", h.title, h.link, h.snippet))
                .collect::<Vec<_>>()
                .join("\n");
            format!("Query: {query}\nResults:\n{rendered}")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze these search results and generate {decomposition_nums} refined queries:
Search Results:
{search_results}
Respond with JSON array of queries ordered by priority: [\"query1\", \"query2\"]"
    )
}

pub fn rank_urls_prompt(topic: &str, query: &str, results: &[SearchHit], time_stamp: &str) -> String {
    let listing = results
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{}. {} ({})", i, r.title, r.link))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are evaluating {count} search results for a query on the following task:

{topic}

Query: \"{query}\"
Current Time: {time_stamp}

Results:
{listing}

Instructions:
1. Remove off-topic or low-quality results
2. Favor .gov/.edu/.org domains
3. Prioritize up-to-date content if applicable

Return ranked indices as JSON array (e.g., [1, 3, 0])",
        count = results.len()
    )
}

pub fn browse_and_summarize_prompt(query: &str, url: &str, content: &str) -> String {
    format!(
        "Analyze this content regarding \"{query}\":
Source: {url}
Content:
{content}

Summarize key points relevant to the research topic, including:
- Key findings/data
- Methodology (if research)
- Limitations/caveats
- Source credibility indicators

If irrelevant, respond only with \"null\"."
    )
}

pub fn conduct_research_prompt(topic: &str, feedback: &str, sources: &str) -> String {
    format!(
        "Based on the provided web search results, generate a rigorous, well-structured, and in-depth knowledge report on the topic: \"{topic}\" and You need to also consider the following additional needs of the user (if any): {feedback}
Sources:
{sources}

1. 4000+ word academic-quality analysis
2. APA style in-text citations with the source URL
3. Comparative tables for quantitative data
4. Critical evaluation of source reliability
5. Professional, academic tone

Structure:
1. Introduction
   - Define the topic's scope and relevance in 1-2 paragraphs
   - Briefly explain the purpose of this report and what the reader can expect to learn
2. Key Findings
   - Organize this section into thematic or topical subheadings
   - Summarize important facts, statistics, insights, and positions found in the sources
   - Include comparative tables or lists where useful to show patterns, differences, or trends
   - Highlight conflicting data or viewpoints, and identify gaps in the available information
3. Conclusion

Start with a single level-one heading. Do not write a references section; it is appended separately."
    )
}

pub fn review_report_prompt(topic: &str, citations: &str, content: &str, min_sources: usize) -> String {
    format!(
        "You are a strict research auditor. Carefully review the following research report.

Topic: \"{topic}\"

Sources:
{citations}

--- Report Content ---
{content}
--- End ---

Instructions:
- Check for factual errors, missing citations, vague or unsupported claims.
- Ensure the writing is clear, logically structured, and professional.
- Verify that at least {min_sources} different valid sources were used.
- If good, reply exactly: \"APPROVED\"
- If issues exist, reply exactly: \"REJECTED: <feedback>\"

Your Response:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_text_embeds_topic_feedback_and_language() {
        let text = research_system_text("Battery recycling", "focus on EU", "zh-cn");
        assert!(text.contains("topic: Battery recycling."));
        assert!(text.contains("(if any): focus on EU"));
        assert!(text.ends_with("Please respond in zh-cn."));

        assert!(collect_links_system_text(&text).ends_with("authoritative sources."));
        assert!(browse_system_text(&text).contains("summarize the content in detail"));
    }

    #[test]
    fn test_rank_prompt_lists_indexed_results() {
        let hits = vec![
            SearchHit::new("EPA guide", "https://epa.gov/batteries", ""),
            SearchHit::new("Blog", "https://blog.example.com/post", ""),
        ];
        let prompt = rank_urls_prompt("Battery recycling", "lithium recovery", &hits, "2026-10-18");

        assert!(prompt.starts_with("You are evaluating 2 search results"));
        assert!(prompt.contains("0. EPA guide (https://epa.gov/batteries)"));
        assert!(prompt.contains("1. Blog (https://blog.example.com/post)"));
        assert!(prompt.contains("Current Time: 2026-10-18"));
    }

    #[test]
    fn test_summarize_search_prompt_groups_by_query() {
        let results = vec![(
            "battery recycling policy".to_string(),
            vec![SearchHit::new("DOE", "https://energy.gov", "Federal programs")],
        )];
        let prompt = summarize_search_prompt(3, &results);

        assert!(prompt.contains("generate 3 refined queries"));
        assert!(prompt.contains("Query: battery recycling policy\nResults:\n- DOE (https://energy.gov): Federal programs"));
    }

    #[test]
    fn test_review_prompt_mentions_verdict_protocol() {
        let prompt = review_report_prompt("t", "- https://a.org", "# Report", 3);
        assert!(prompt.contains("at least 3 different valid sources"));
        assert!(prompt.contains("\"APPROVED\""));
        assert!(prompt.contains("\"REJECTED: <feedback>\""));
    }
}
