//! Chat use case: ground a question in the graph, then ask the answer service.

use serde::Serialize;

use crate::context::format_context;
use crate::engine::Engine;
use crate::llm::AnswerGenerator;
use crate::search::SearchResult;

/// Question substituted for blank or placeholder input.
pub const DEFAULT_QUERY: &str = "Give me an overview of Ayurveda and how this chatbot can help.";

const BASE_PROMPT: &str = "You are an expert Ayurvedic consultant chatbot. \
    Provide a clear, complete, and actionable answer based on Ayurvedic principles. \
    Include specific herbs, treatments, and dosha-balancing methods when relevant. \
    Structure the response with sections (e.g., Herbs, Treatments, Dosha Balance). \
    This is for educational purposes only; always recommend consulting a professional for medical advice.";

const GROUNDED_SUFFIX: &str = "\nUse the Knowledge Graph context below to ground your answer with specific details. \
    Highlight relevant entities and relationships from the KG. \
    If something is uncertain, state likely options and what to observe.";

const UNGROUNDED_SUFFIX: &str = "\nNo specific KG data is provided. \
    Use general Ayurvedic principles to provide a comprehensive answer. \
    Include likely dosha involvement, lifestyle guidance, and commonly used herbs. \
    Offer safe, general suggestions and note contraindications when appropriate.";

/// Where an answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    KgAndLlm,
    LlmOnly,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// One answered chat turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub query: String,
    pub response: String,
    pub source: AnswerSource,
    /// The search the answer was grounded on; absent when the search failed.
    pub kg_data: Option<SearchResult>,
    pub confidence: Confidence,
}

/// Replace blank or placeholder input with [`DEFAULT_QUERY`].
pub fn normalize_query(raw: &str) -> String {
    let query = raw.trim();
    match query.to_lowercase().as_str() {
        "" | "undefined" | "null" | "none" => DEFAULT_QUERY.to_string(),
        _ => query.to_string(),
    }
}

/// System prompt for a grounded or ungrounded answer.
pub fn system_prompt(grounded: bool) -> String {
    let suffix = if grounded {
        GROUNDED_SUFFIX
    } else {
        UNGROUNDED_SUFFIX
    };
    format!("{BASE_PROMPT}{suffix}")
}

/// Answers questions from the engine plus an answer generator.
pub struct Chatbot<'a, G: AnswerGenerator> {
    engine: &'a Engine,
    generator: G,
}

impl<'a, G: AnswerGenerator> Chatbot<'a, G> {
    pub fn new(engine: &'a Engine, generator: G) -> Self {
        Self { engine, generator }
    }

    /// Answer one question. Never fails; errors become an error-tagged response.
    pub fn process_query(&self, raw: &str) -> ChatResponse {
        let query = normalize_query(raw);
        let result = self.engine.search(&query);

        if let Some(ref error) = result.error {
            tracing::error!(error = %error, query = %query, "error processing query");
            return ChatResponse {
                response: format!("Error processing query: {error}"),
                query,
                source: AnswerSource::Error,
                kg_data: None,
                confidence: Confidence::Low,
            };
        }

        let context = format_context(&result);
        let context = context.trim();
        let grounded = !context.is_empty();

        let response = self
            .generator
            .generate(&system_prompt(grounded), &query, context);

        let (source, confidence) = if grounded {
            (AnswerSource::KgAndLlm, Confidence::High)
        } else {
            (AnswerSource::LlmOnly, Confidence::Medium)
        };

        ChatResponse {
            query,
            response,
            source,
            kg_data: Some(result),
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::config::EngineConfig;
    use crate::graph::sparql::SparqlStore;

    const TURTLE: &str = r#"
        @prefix ayur: <http://example.org/ayurvedic/> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

        ayur:h_ashwagandha a ayur:Herb ; rdfs:label "Ashwagandha" ;
            ayur:description "Adaptogen for stress." ;
            ayur:recommendedFor ayur:c_stress .
        ayur:c_stress a ayur:Condition ; rdfs:label "Stress" .
    "#;

    /// Records each call and answers with a fixed string.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl AnswerGenerator for &Recorder {
        fn generate(&self, system_prompt: &str, user_message: &str, context: &str) -> String {
            self.calls.lock().unwrap().push((
                system_prompt.to_string(),
                user_message.to_string(),
                context.to_string(),
            ));
            "answer".into()
        }
    }

    fn engine() -> Engine {
        Engine::from_store(SparqlStore::from_turtle(TURTLE).unwrap(), &EngineConfig::default())
    }

    #[test]
    fn placeholders_become_default_question() {
        for raw in ["", "   ", "undefined", "NULL", " None "] {
            assert_eq!(normalize_query(raw), DEFAULT_QUERY);
        }
        assert_eq!(normalize_query("  tulsi "), "tulsi");
    }

    #[test]
    fn grounded_answer_passes_context() {
        let engine = engine();
        let recorder = Recorder::default();
        let bot = Chatbot::new(&engine, &recorder);

        let reply = bot.process_query("ashwagandha");
        assert_eq!(reply.response, "answer");
        assert_eq!(reply.source, AnswerSource::KgAndLlm);
        assert_eq!(reply.confidence, Confidence::High);
        assert!(reply.kg_data.is_some());

        let calls = recorder.calls.lock().unwrap();
        let (system, user, context) = &calls[0];
        assert!(system.ends_with(GROUNDED_SUFFIX));
        assert_eq!(user, "ashwagandha");
        assert!(context.starts_with("Entities:\n- Ashwagandha (herbs): Adaptogen for stress."));
    }

    #[test]
    fn ungrounded_answer_sends_no_context() {
        let engine = engine();
        let recorder = Recorder::default();
        let bot = Chatbot::new(&engine, &recorder);

        let reply = bot.process_query("zzzzzz");
        assert_eq!(reply.source, AnswerSource::LlmOnly);
        assert_eq!(reply.confidence, Confidence::Medium);

        let calls = recorder.calls.lock().unwrap();
        let (system, _, context) = &calls[0];
        assert!(system.ends_with(UNGROUNDED_SUFFIX));
        assert!(context.is_empty());
    }

    #[test]
    fn response_serializes_wire_names() {
        let engine = engine();
        let recorder = Recorder::default();
        let reply = Chatbot::new(&engine, &recorder).process_query("zzzzzz");
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["source"], "llm_only");
        assert_eq!(json["confidence"], "medium");
        assert_eq!(json["kg_data"]["query"], "zzzzzz");
    }

    #[test]
    fn prompts_share_base() {
        assert!(system_prompt(true).starts_with(BASE_PROMPT));
        assert!(system_prompt(false).starts_with(BASE_PROMPT));
        assert_ne!(system_prompt(true), system_prompt(false));
    }
}
