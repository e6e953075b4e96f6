//! Prompt templates for the ogiri flow

use crate::core::topic::Topic;
use crate::game::history::ConversationHistory;

/// Templates for generating prompts at each turn
pub struct PromptTemplate;

impl PromptTemplate {
    /// Default system prompt: the rules every participant follows
    pub fn default_system() -> &'static str {
        r#"これから大喜利をします。あなたは大喜利の回答者です。大喜利のルールは以下の通りです。
1. 大喜利の回答は100文字以内で回答してください。
2. 大喜利の回答は日本語で回答してください。
3. 大喜利の回答はスマートで楽しいものを回答してください。
4. 他の参加者の回答も会話に含めます。前の回答も考慮して回答をしてください。"#
    }

    /// User prompt asking for one answer to the topic
    pub fn answer_prompt(topic: &Topic) -> String {
        format!(
            "以下のお題で面白い回答を考えてください。\nお題: {}\n",
            topic.content()
        )
    }

    /// User prompt that inlines previous answers ahead of the request
    ///
    /// Used by chat APIs that require the first message to come from the user.
    pub fn answer_prompt_with_history(topic: &Topic, history: &ConversationHistory) -> String {
        if history.is_empty() {
            return Self::answer_prompt(topic);
        }
        format!(
            "これまでの回答:\n{}\n\n{}",
            history.render(),
            Self::answer_prompt(topic)
        )
    }

    /// System prompt with previous answers appended
    ///
    /// Used by single-turn APIs that only carry context in the system slot.
    pub fn system_with_history(system_prompt: &str, history: &ConversationHistory) -> String {
        if history.is_empty() {
            return system_prompt.to_string();
        }
        format!("{}\n{}", system_prompt, history.render())
    }
}
