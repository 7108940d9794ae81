// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based follow-up question suggestions attached to the final
//! update of an interaction.

/// Suggests follow-up questions based on the assistant's final response.
pub fn follow_up_questions(response_text: &str) -> Vec<String> {
    let lower = response_text.to_lowercase();
    let mut questions = Vec::new();

    if lower.contains("quantitative zielerreichung") {
        questions.push("Wie erreiche ich meine persönlichen Ziele?".to_string());
        questions.push("Wie erreichen wir unsere Teamziele?".to_string());
        questions.push(
            "Welcher Vertriebsschwerpunkt könnte mir dabei helfen, meine persönlichen Ziele \
             zu erreichen?"
                .to_string(),
        );
    }
    if lower.contains("persönlichen ziele") {
        questions.push("Wird einer der Top Accounts zukünftig produktiv?".to_string());
        questions.push(
            "Haben andere KollegInnen im MV ähnliche Vertriebsschwerpunkte und \
             Geschäftsverteilungen?"
                .to_string(),
        );
    }
    if questions.is_empty() {
        questions.push("Erzähle mir mehr.".to_string());
    }
    questions
}
