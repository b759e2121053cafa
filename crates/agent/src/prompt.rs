//! Prompt assembly: system prompt, recent history, and the new message
//! rendered into the single string the provider receives.

use taskbot_core::message::{Role, Turn};

/// Built-in persona and rules for the task-manager assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"Você é um assistente especializado em gerenciamento de tarefas e produtividade.

**Seu papel:**
- Ajudar usuários a organizar tarefas e projetos
- Responder perguntas sobre o app de gerenciamento
- Sugerir melhorias de produtividade
- Motivar e encorajar os usuários
- Explicar funcionalidades do app

**Funcionalidades do app que você deve conhecer:**
1. Criar quadros (boards) para projetos
2. Criar listas dentro dos quadros (ex: A Fazer, Fazendo, Feito)
3. Criar tarefas com título, descrição, prazo e responsável
4. Marcar tarefas como concluídas
5. Dashboard com estatísticas
6. Chat com IA (você!)

**Como responder perguntas:**
- "Como criar tarefa?" → Explique o processo passo a passo
- "Estou atrasado" → Dê dicas de priorização
- "O que é dashboard?" → Explique as estatísticas

**Tom de voz:**
- Amigável e profissional
- Conciso mas completo
- Use emojis quando apropriado
- Sempre em português

**IMPORTANTE:**
- SEMPRE responda em português brasileiro
- Seja objetivo mas empático
- Se não souber algo específico, admita e sugira alternativas
"#;

/// Builds provider prompts from conversation history.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    system_prompt: String,
    history_window: usize,
}

impl PromptAssembler {
    /// Create an assembler with the built-in system prompt and a six-turn window.
    pub fn new() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            history_window: 6,
        }
    }

    /// Replace the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set how many of the most recent turns are rendered.
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Render the prompt for `message` given the stored `history`.
    pub fn build(&self, history: &[Turn], message: &str) -> String {
        format!(
            "{}\n\nHistórico da conversa:\n{}\n\nMensagem atual do usuário: {}\n\nResponda de forma útil e amigável:",
            self.system_prompt,
            self.render_history(history),
            message
        )
    }

    /// The last `history_window` turns, one per line.
    pub fn render_history(&self, history: &[Turn]) -> String {
        let start = history.len().saturating_sub(self.history_window);
        history[start..]
            .iter()
            .map(|turn| {
                let label = match turn.role() {
                    Role::User => "Usuário",
                    Role::Bot => "Bot",
                };
                format!("{label}: {}", turn.text())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_roles_in_order() {
        let history = vec![Turn::user("oi"), Turn::bot("Olá!"), Turn::user("tudo bem?")];
        let rendered = PromptAssembler::new().render_history(&history);
        assert_eq!(rendered, "Usuário: oi\nBot: Olá!\nUsuário: tudo bem?");
    }

    #[test]
    fn only_last_six_turns() {
        let history: Vec<Turn> = (0..10).map(|i| Turn::user(format!("m{i}"))).collect();
        let rendered = PromptAssembler::new().render_history(&history);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "Usuário: m4");
        assert_eq!(lines[5], "Usuário: m9");
    }

    #[test]
    fn full_prompt_layout() {
        let assembler = PromptAssembler::new().with_system_prompt("SYSTEM");
        let history = vec![Turn::user("Como criar tarefa?")];
        let prompt = assembler.build(&history, "Como criar tarefa?");
        assert_eq!(
            prompt,
            "SYSTEM\n\nHistórico da conversa:\nUsuário: Como criar tarefa?\n\n\
             Mensagem atual do usuário: Como criar tarefa?\n\n\
             Responda de forma útil e amigável:"
        );
    }

    #[test]
    fn empty_history_leaves_blank_section() {
        let prompt = PromptAssembler::new()
            .with_system_prompt("S")
            .build(&[], "oi");
        assert!(
            prompt.contains("Histórico da conversa:\n\n\nMensagem atual do usuário: oi")
        );
    }

    #[test]
    fn default_prompt_is_portuguese_persona() {
        let assembler = PromptAssembler::default();
        assert!(
            assembler.system_prompt().starts_with("Você é um assistente")
        );
        assert!(
            assembler.system_prompt().contains("SEMPRE responda em português brasileiro")
        );
        assert_eq!(assembler.history_window(), 6);
    }

    #[test]
    fn custom_window() {
        let history: Vec<Turn> = (0..4).map(|i| Turn::bot(format!("b{i}"))).collect();
        let rendered = PromptAssembler::new()
            .with_history_window(2)
            .render_history(&history);
        assert_eq!(rendered, "Bot: b2\nBot: b3");
    }
}
