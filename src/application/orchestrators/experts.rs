//! Experts orchestrator.
//!
//! Builds a validation rubric, then answers the question with three prompting
//! strategies. Every answer is validated; when a secondary provider is
//! configured it answers too and the primary compares both answers.

use std::sync::Arc;
use tracing::info;

use super::{ask, notify, report_failure, typing};
use crate::application::errors::InteractionError;
use crate::domain::foundation::ConversationId;
use crate::ports::{AiClient, ChatTransport};

const RUBRIC_TEMPERATURE: f32 = 0.3;
const VALIDATION_TEMPERATURE: f32 = 0.3;
const COMPARISON_TEMPERATURE: f32 = 0.5;

const SAME_LANGUAGE: &str = "IMPORTANT: Answer in the same language as the question.";

/// One prompting strategy.
struct Strategy {
    heading: &'static str,
    label: &'static str,
    temperature: f32,
    prompt: fn(&str) -> String,
}

const STRATEGIES: [Strategy; 3] = [
    Strategy {
        heading: "\n🤖 *Step 2: Simple Question Processing*",
        label: "Answer",
        temperature: 0.7,
        prompt: direct_prompt,
    },
    Strategy {
        heading: "\n📋 *Step 3: Step-by-Step Analysis*",
        label: "Step-by-Step",
        temperature: 0.5,
        prompt: step_by_step_prompt,
    },
    Strategy {
        heading: "\n👥 *Step 4: Expert Group Analysis*",
        label: "Expert Group",
        temperature: 0.7,
        prompt: expert_panel_prompt,
    },
];

fn rubric_prompt(question: &str) -> String {
    format!(
        "Create a validation prompt for evaluating answers to the following question.
Do NOT decide right answer from question, listen to arguments from answer.
The validation prompt should check for:
1. Accuracy and correctness
2. Completeness of the answer
3. Clarity and structure
4. Relevance to the question

Question: {question}

IMPORTANT: Answer in the same language as the question.
Provide only the validation prompt text."
    )
}

fn direct_prompt(question: &str) -> String {
    format!("{SAME_LANGUAGE}\n\nQuestion: {question}")
}

fn step_by_step_prompt(question: &str) -> String {
    format!(
        "{SAME_LANGUAGE}

Analyze the following question step by step:
1. Identify the key components of the question
2. Break down what information is needed
3. Provide a structured answer addressing each component

Question: {question}"
    )
}

fn expert_panel_prompt(question: &str) -> String {
    format!(
        "{SAME_LANGUAGE}

Imagine you are assembling a group of experts to answer this question.

1. First, identify what types of experts would be needed (e.g., domain specialists, researchers, analysts)
2. List 3-4 specific expert roles
3. For each expert, provide their perspective on the question
4. Finally, synthesize their insights into a comprehensive answer

Question: {question}"
    )
}

fn validation_prompt(rubric: &str, answer: &str) -> String {
    format!("{rubric}\n\nAnswer to validate:\n{answer}")
}

fn comparison_prompt(
    question: &str,
    primary_label: &str,
    primary_answer: &str,
    secondary_label: &str,
    secondary_answer: &str,
) -> String {
    format!(
        "IMPORTANT: Answer in the same language as the original question.

Compare these two answers to the question: \"{question}\"

{primary_label}'s answer:
{primary_answer}

{secondary_label}'s answer:
{secondary_answer}

Provide a brief comparison highlighting strengths and differences."
    )
}

/// Orchestrates the experts analysis.
pub struct ExpertsOrchestrator {
    primary: Arc<dyn AiClient>,
    secondary: Option<Arc<dyn AiClient>>,
    transport: Arc<dyn ChatTransport>,
    primary_label: String,
    secondary_label: String,
}

impl ExpertsOrchestrator {
    pub fn new(
        primary: Arc<dyn AiClient>,
        secondary: Option<Arc<dyn AiClient>>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            primary,
            secondary,
            transport,
            primary_label: "Claude".to_string(),
            secondary_label: "Yandex".to_string(),
        }
    }

    /// Sets the display names of the two providers.
    pub fn with_labels(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.primary_label = primary.into();
        self.secondary_label = secondary.into();
        self
    }

    /// Runs the analysis and reports a failure to the user if it aborts.
    pub async fn process(&self, id: ConversationId, question: &str) {
        if let Err(err) = self.run(id, question).await {
            report_failure(self.transport.as_ref(), id, &err).await;
        }
    }

    /// Runs the analysis, stopping at the first failed call.
    pub async fn run(&self, id: ConversationId, question: &str) -> Result<(), InteractionError> {
        let transport = self.transport.as_ref();
        typing(transport, id).await;

        info!(
            conversation_id = %id,
            secondary = self.secondary.is_some(),
            "Starting experts analysis"
        );

        if self.secondary.is_none() {
            notify(
                transport,
                id,
                &format!(
                    "ℹ️ *Note:* {} is not configured. Only {} will be used.\n",
                    self.secondary_label, self.primary_label
                ),
            )
            .await;
        }

        notify(
            transport,
            id,
            "🔍 *Step 1: Creating Answer Validation Prompt with AI*",
        )
        .await;
        let rubric = ask(self.primary.as_ref(), rubric_prompt(question), RUBRIC_TEMPERATURE).await?;
        notify(
            transport,
            id,
            &format!("*Generated Validation Prompt:*\n\n{}", rubric),
        )
        .await;

        for strategy in &STRATEGIES {
            notify(transport, id, strategy.heading).await;
            self.run_strategy(id, question, &rubric, strategy).await?;
        }

        notify(
            transport,
            id,
            "\n✨ *Analysis Complete!*\n\nAll approaches have been processed and validated successfully.",
        )
        .await;
        Ok(())
    }

    async fn run_strategy(
        &self,
        id: ConversationId,
        question: &str,
        rubric: &str,
        strategy: &Strategy,
    ) -> Result<(), InteractionError> {
        let transport = self.transport.as_ref();
        let prompt = (strategy.prompt)(question);

        let primary_answer = ask(self.primary.as_ref(), prompt.as_str(), strategy.temperature).await?;
        notify(
            transport,
            id,
            &format!("*{} {}:*\n{}", self.primary_label, strategy.label, primary_answer),
        )
        .await;

        let primary_validation = ask(
            self.primary.as_ref(),
            validation_prompt(rubric, &primary_answer),
            VALIDATION_TEMPERATURE,
        )
        .await?;
        notify(
            transport,
            id,
            &format!("*{} Answer Validation:*\n{}", self.primary_label, primary_validation),
        )
        .await;

        let Some(secondary) = self.secondary.as_deref() else {
            return Ok(());
        };

        let secondary_answer = ask(
            secondary,
            format!(
                "IMPORTANT: Keep your answer concise and under 300 words.\n\n{}",
                prompt
            ),
            strategy.temperature,
        )
        .await?;
        notify(
            transport,
            id,
            &format!("*{} {}:*\n{}", self.secondary_label, strategy.label, secondary_answer),
        )
        .await;

        let secondary_validation = ask(
            secondary,
            format!(
                "IMPORTANT: Keep validation concise, max 150 words.\n\n{}",
                validation_prompt(rubric, &secondary_answer)
            ),
            VALIDATION_TEMPERATURE,
        )
        .await?;
        notify(
            transport,
            id,
            &format!(
                "*{} Answer Validation:*\n{}",
                self.secondary_label, secondary_validation
            ),
        )
        .await;

        let comparison = ask(
            self.primary.as_ref(),
            comparison_prompt(
                question,
                &self.primary_label,
                &primary_answer,
                &self.secondary_label,
                &secondary_answer,
            ),
            COMPARISON_TEMPERATURE,
        )
        .await?;
        notify(transport, id, &format!("📊 *Comparison:*\n{}", comparison)).await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAiClient, MockError};
    use crate::adapters::chat::RecordingTransport;

    fn id() -> ConversationId {
        ConversationId::new(5)
    }

    #[tokio::test]
    async fn primary_only_makes_seven_calls() {
        let primary = MockAiClient::new();
        let transport = RecordingTransport::new();
        let orchestrator =
            ExpertsOrchestrator::new(Arc::new(primary.clone()), None, Arc::new(transport.clone()));

        orchestrator.run(id(), "What is Rust?").await.unwrap();

        assert_eq!(primary.call_count(), 1 + 3 * 2);
        assert_eq!(
            primary.temperatures(),
            vec![0.3, 0.7, 0.3, 0.5, 0.3, 0.7, 0.3]
        );
        let texts = transport.texts_for(id());
        assert!(texts[0].contains("Yandex is not configured"));
        assert!(texts.last().unwrap().contains("Analysis Complete!"));
        assert!(texts.iter().all(|t| !t.contains("Comparison")));
    }

    #[tokio::test]
    async fn with_secondary_makes_sixteen_calls() {
        let primary = MockAiClient::new();
        let secondary = MockAiClient::new();
        let transport = RecordingTransport::new();
        let orchestrator = ExpertsOrchestrator::new(
            Arc::new(primary.clone()),
            Some(Arc::new(secondary.clone())),
            Arc::new(transport.clone()),
        );

        orchestrator.run(id(), "What is Rust?").await.unwrap();

        assert_eq!(primary.call_count() + secondary.call_count(), 1 + 3 * 5);
        assert_eq!(primary.call_count(), 1 + 3 * 3);
        assert_eq!(secondary.temperatures(), vec![0.7, 0.3, 0.5, 0.3, 0.7, 0.3]);

        let secondary_prompts: Vec<String> = secondary
            .get_calls()
            .iter()
            .map(|c| c.last_content().to_string())
            .collect();
        assert!(secondary_prompts[0].starts_with("IMPORTANT: Keep your answer concise and under 300 words."));
        assert!(secondary_prompts[1].starts_with("IMPORTANT: Keep validation concise, max 150 words."));

        let comparisons = transport
            .texts_for(id())
            .into_iter()
            .filter(|t| t.starts_with("📊 *Comparison:*"))
            .count();
        assert_eq!(comparisons, 3);
    }

    #[tokio::test]
    async fn rubric_is_embedded_in_validation_prompts() {
        let primary = MockAiClient::new()
            .with_response("RUBRIC")
            .with_response("direct answer");
        let transport = RecordingTransport::new();
        let orchestrator =
            ExpertsOrchestrator::new(Arc::new(primary.clone()), None, Arc::new(transport));

        orchestrator.run(id(), "q").await.unwrap();

        let validation = primary.get_calls()[2].last_content().to_string();
        assert_eq!(validation, "RUBRIC\n\nAnswer to validate:\ndirect answer");
    }

    #[tokio::test]
    async fn failure_aborts_remaining_steps_and_is_reported() {
        let primary = MockAiClient::new()
            .with_response("rubric")
            .with_error(MockError::Unavailable {
                message: "overloaded".to_string(),
            });
        let transport = RecordingTransport::new();
        let orchestrator =
            ExpertsOrchestrator::new(Arc::new(primary.clone()), None, Arc::new(transport.clone()));

        orchestrator.process(id(), "q").await;

        assert_eq!(primary.call_count(), 2);
        let last = transport.last_for(id()).unwrap().text;
        assert!(last.starts_with(super::super::FAILURE_PREFIX));
        assert!(last.contains("overloaded"));
    }
}
