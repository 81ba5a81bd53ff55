//! Canned Responder
//! Mission: Pick a scripted reply by keyword, quoting the user's documents when nothing else fits
//!
//! There is no model behind this: the first matching rule wins.

use crate::documents::Document;
use serde::{Deserialize, Serialize};

/// How many of the caller's documents a reply may quote
pub const MAX_CONTEXT_DOCUMENTS: usize = 2;

const GREETING: &str =
    "Hello! I'm your AI assistant. I can answer questions about your uploaded documents.";
const SERVICES: &str =
    "Our services include: AI chatbot development, custom software solutions, and consulting.";
const PRICING: &str =
    "Pricing starts at $99/month for basic plans. Enterprise solutions are customized.";
const CONTACT: &str = "Contact us at: email@example.com or visit our website.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    pub tokens_used: i64,
    pub sources: Vec<SourceRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Greeting,
    Services,
    Pricing,
    Contact,
}

impl Topic {
    fn canned(self) -> &'static str {
        match self {
            Topic::Greeting => GREETING,
            Topic::Services => SERVICES,
            Topic::Pricing => PRICING,
            Topic::Contact => CONTACT,
        }
    }
}

/// Build the reply for `query`. `documents` are the caller's most recent
/// uploads, newest first.
pub fn respond(query: &str, documents: &[Document]) -> ChatReply {
    let (response, sources) = match classify(query) {
        Some(topic) => (topic.canned().to_string(), Vec::new()),
        None if !documents.is_empty() => document_reply(documents),
        None => (
            format!(
                "I understand you're asking about '{}'. You can upload documents for more specific answers.",
                query.trim()
            ),
            Vec::new(),
        ),
    };

    ChatReply {
        tokens_used: response.split_whitespace().count() as i64,
        response,
        sources,
    }
}

fn classify(query: &str) -> Option<Topic> {
    let lowered = query.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    // Greetings must be whole words: "hi" is inside far too many others.
    let is_word = |target: &str| words.iter().any(|w| *w == target);
    let has_stem = |stem: &str| words.iter().any(|w| w.starts_with(stem));

    if is_word("hello") || is_word("hi") {
        Some(Topic::Greeting)
    } else if has_stem("service") {
        Some(Topic::Services)
    } else if has_stem("price") || has_stem("pricing") || has_stem("cost") {
        Some(Topic::Pricing)
    } else if has_stem("contact") {
        Some(Topic::Contact)
    } else {
        None
    }
}

fn document_reply(documents: &[Document]) -> (String, Vec<SourceRef>) {
    let quoted = &documents[..documents.len().min(MAX_CONTEXT_DOCUMENTS)];

    let mut response = String::from("Based on your documents:\n");
    for (i, doc) in quoted.iter().enumerate() {
        response.push_str(&format!("{}. {}\n", i + 1, doc.original_filename));
    }
    response.push_str("\nIs there anything specific you'd like to know?");

    let sources = quoted
        .iter()
        .map(|doc| SourceRef {
            filename: doc.original_filename.clone(),
        })
        .collect();

    (response, sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> Document {
        Document {
            id: 1,
            user_id: 1,
            filename: format!("1_x_{name}"),
            original_filename: name.to_string(),
            file_type: "txt".to_string(),
            file_size: 1,
            content: String::new(),
            chunk_count: 0,
            uploaded_at: "2025-01-01T00:00:00+00:00".to_string(),
            is_processed: true,
        }
    }

    #[test]
    fn test_keyword_ladder() {
        assert_eq!(respond("Hello there", &[]).response, GREETING);
        assert_eq!(respond("hi!", &[]).response, GREETING);
        assert_eq!(respond("What services do you offer?", &[]).response, SERVICES);
        assert_eq!(respond("How much does it cost?", &[]).response, PRICING);
        assert_eq!(respond("Tell me about pricing", &[]).response, PRICING);
        assert_eq!(respond("How do I contact you", &[]).response, CONTACT);
    }

    #[test]
    fn test_first_rule_wins() {
        // Greeting outranks pricing.
        assert_eq!(respond("hi, what's the price?", &[]).response, GREETING);
    }

    #[test]
    fn test_hi_inside_words_is_not_a_greeting() {
        let reply = respond("which history?", &[]);
        assert_ne!(reply.response, GREETING);
        assert!(reply.response.contains("which history?"));
    }

    #[test]
    fn test_fallback_without_documents() {
        let reply = respond("  quantum widgets ", &[]);
        assert_eq!(
            reply.response,
            "I understand you're asking about 'quantum widgets'. You can upload documents for more specific answers."
        );
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_document_context_quotes_two_newest() {
        let docs = vec![doc("c.txt"), doc("b.md"), doc("a.pdf")];
        let reply = respond("summarize please", &docs);

        assert!(reply.response.starts_with("Based on your documents:\n1. c.txt\n2. b.md\n"));
        assert!(!reply.response.contains("a.pdf"));
        assert_eq!(
            reply.sources,
            vec![
                SourceRef { filename: "c.txt".into() },
                SourceRef { filename: "b.md".into() },
            ]
        );
    }

    #[test]
    fn test_canned_topics_ignore_documents() {
        let reply = respond("hello", &[doc("a.txt")]);
        assert_eq!(reply.response, GREETING);
        assert!(reply.sources.is_empty());
    }

    #[test]
    fn test_tokens_used_counts_words() {
        let reply = respond("hello", &[]);
        assert_eq!(reply.tokens_used, GREETING.split_whitespace().count() as i64);
    }
}
