use colloquy_llm::Message;

/// What the model gets to see for one turn, before the new user message
#[derive(Debug, Clone, PartialEq)]
pub struct ContextWindow {
    pub system_prompt: String,
    pub messages: Vec<Message>,
}

impl ContextWindow {
    pub fn new(system_prompt: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            messages,
        }
    }

    /// Build the completion request body: system prompt, stored history in
    /// order, then the new user message.
    pub fn into_prompt(self, user_message: Message) -> Vec<Message> {
        let mut prompt = Vec::with_capacity(self.messages.len() + 2);
        prompt.push(Message::system(self.system_prompt));
        prompt.extend(self.messages);
        prompt.push(user_message);
        prompt
    }
}

/// Exactly `[system] + history + [user]`, nothing reordered or repeated
pub fn assemble_prompt(
    system_prompt: &str,
    history: Vec<Message>,
    user_message: Message,
) -> Vec<Message> {
    ContextWindow::new(system_prompt, history).into_prompt(user_message)
}
