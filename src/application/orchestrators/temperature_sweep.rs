//! Temperature sweep orchestrator.
//!
//! Answers the same question at three temperatures, then asks the provider to
//! compare the three answers.

use std::sync::Arc;
use tracing::info;

use super::{ask, notify, report_failure, typing};
use crate::application::errors::InteractionError;
use crate::domain::foundation::ConversationId;
use crate::ports::{AiClient, ChatTransport};

/// Temperatures used for the three answers, in order.
pub const SWEEP_TEMPERATURES: [f32; 3] = [0.0, 0.4, 0.9];

const COMPARISON_TEMPERATURE: f32 = 0.5;

fn sweep_prompt(question: &str) -> String {
    format!(
        "IMPORTANT: Answer in the same language as the question.\n\nQuestion: {}",
        question
    )
}

fn comparison_prompt(question: &str, answers: &[String]) -> String {
    format!(
        "IMPORTANT: Answer in the same language as the original question.

Analyze and compare these three answers to the question: \"{question}\"

The answers were generated with different creativity levels:

Answer 1 (Temperature 0.0 - Most deterministic, focused):
{first}

Answer 2 (Temperature 0.4 - Balanced):
{second}

Answer 3 (Temperature 0.9 - Most creative, diverse):
{third}

Compare the answers and discuss:
1. How temperature affected the response style and content
2. Which temperature level produced the most appropriate answer for this question
3. Key differences in approach, detail, and creativity
4. Recommendations for optimal temperature for similar questions",
        first = answers[0],
        second = answers[1],
        third = answers[2],
    )
}

/// Orchestrates the temperature comparison.
pub struct TemperatureSweepOrchestrator {
    client: Arc<dyn AiClient>,
    transport: Arc<dyn ChatTransport>,
}

impl TemperatureSweepOrchestrator {
    pub fn new(client: Arc<dyn AiClient>, transport: Arc<dyn ChatTransport>) -> Self {
        Self { client, transport }
    }

    /// Runs the sweep and reports a failure to the user if it aborts.
    pub async fn process(&self, id: ConversationId, question: &str) {
        if let Err(err) = self.run(id, question).await {
            report_failure(self.transport.as_ref(), id, &err).await;
        }
    }

    pub async fn run(&self, id: ConversationId, question: &str) -> Result<(), InteractionError> {
        let transport = self.transport.as_ref();
        typing(transport, id).await;
        info!(conversation_id = %id, "Starting temperature sweep");

        notify(
            transport,
            id,
            "🌡️ *Temperature Comparison Analysis*\n\nProcessing question with different temperature settings...\n",
        )
        .await;

        let mut answers = Vec::with_capacity(SWEEP_TEMPERATURES.len());
        for temperature in SWEEP_TEMPERATURES {
            notify(transport, id, &format!("📊 *Temperature: {:.1}*", temperature)).await;
            let answer = ask(self.client.as_ref(), sweep_prompt(question), temperature).await?;
            notify(transport, id, &answer).await;
            answers.push(answer);
        }

        notify(transport, id, "\n🔍 *Comparison Analysis*").await;
        let comparison = ask(
            self.client.as_ref(),
            comparison_prompt(question, &answers),
            COMPARISON_TEMPERATURE,
        )
        .await?;
        notify(transport, id, &format!("📝 *Analysis:*\n{}", comparison)).await;

        notify(transport, id, "\n✨ *Temperature comparison complete!*").await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAiClient, MockError};
    use crate::adapters::chat::RecordingTransport;

    fn id() -> ConversationId {
        ConversationId::new(11)
    }

    #[tokio::test]
    async fn answers_at_three_temperatures_then_compares() {
        let client = MockAiClient::new()
            .with_response("cold")
            .with_response("warm")
            .with_response("hot")
            .with_response("they differ");
        let transport = RecordingTransport::new();
        let orchestrator =
            TemperatureSweepOrchestrator::new(Arc::new(client.clone()), Arc::new(transport.clone()));

        orchestrator.run(id(), "What is ML?").await.unwrap();

        assert_eq!(client.temperatures(), vec![0.0, 0.4, 0.9, 0.5]);
        let comparison = client.get_calls()[3].last_content().to_string();
        assert!(comparison.contains("Answer 1 (Temperature 0.0 - Most deterministic, focused):\ncold"));
        assert!(comparison.contains("Answer 3 (Temperature 0.9 - Most creative, diverse):\nhot"));

        assert!(comparison.contains("The answers were generated with different creativity levels:"));
        assert!(comparison.contains("4. Recommendations for optimal temperature for similar questions"));

        let texts = transport.texts_for(id());
        assert_eq!(
            &texts[1..7],
            &[
                "📊 *Temperature: 0.0*",
                "cold",
                "📊 *Temperature: 0.4*",
                "warm",
                "📊 *Temperature: 0.9*",
                "hot",
            ]
        );
        assert_eq!(texts[7], "\n🔍 *Comparison Analysis*");
        assert_eq!(texts[8], "📝 *Analysis:*\nthey differ");
        assert_eq!(texts.last().unwrap(), "\n✨ *Temperature comparison complete!*");
    }

    #[tokio::test]
    async fn every_answer_is_asked_in_the_question_language() {
        let client = MockAiClient::new();
        let transport = RecordingTransport::new();
        let orchestrator =
            TemperatureSweepOrchestrator::new(Arc::new(client.clone()), Arc::new(transport));

        orchestrator.run(id(), "Что такое ML?").await.unwrap();

        for call in &client.get_calls()[..3] {
            assert_eq!(
                call.last_content(),
                "IMPORTANT: Answer in the same language as the question.\n\nQuestion: Что такое ML?"
            );
        }
    }

    #[tokio::test]
    async fn failed_answer_stops_the_sweep() {
        let client = MockAiClient::new()
            .with_response("cold")
            .with_error(MockError::RateLimited { retry_after_secs: 30 });
        let transport = RecordingTransport::new();
        let orchestrator =
            TemperatureSweepOrchestrator::new(Arc::new(client.clone()), Arc::new(transport.clone()));

        orchestrator.process(id(), "q").await;

        assert_eq!(client.call_count(), 2);
        let texts = transport.texts_for(id());
        assert!(texts.iter().all(|t| !t.contains("Comparison Analysis")));
        assert!(texts.last().unwrap().starts_with("❌ Sorry"));
    }
}
