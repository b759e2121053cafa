//! Canned replies used when the AI provider is unavailable.
//!
//! Rules are checked in order against the lowercased message; the first
//! match wins. Matching is plain substring containment.

pub const GREETING: &str =
    "Olá! 👋 Sou seu assistente de gerenciamento de tarefas. Como posso ajudar você hoje?";

pub const CREATE_TASK: &str = "Para criar uma tarefa, siga estes passos:

1️⃣ Abra um quadro
2️⃣ Clique no botão \"+\" dentro de uma lista
3️⃣ Preencha:
   • Título da tarefa
   • Descrição (opcional)
   • Prazo (AAAA-MM-DD)
   • Responsável
4️⃣ Clique em \"Criar\"

Pronto! Sua tarefa foi criada! ✅";

pub const DASHBOARD: &str = "O Dashboard mostra estatísticas do seu projeto:

📊 **Estatísticas:**
• Total de tarefas
• Tarefas concluídas
• Tarefas atrasadas
• Tarefas vencendo hoje
• Tarefas próximas

Acesse clicando no ícone 📊 na barra inferior!";

pub const PRIORITIZE: &str = "Tarefas atrasadas? Aqui estão dicas rápidas:

⚡ **Priorize:**
1. Identifique as mais urgentes
2. Quebre tarefas grandes em menores
3. Foque em uma de cada vez

💡 **Dica:** Use o Dashboard para ver todas as tarefas atrasadas em um só lugar!

Você consegue! 💪";

pub const HELP: &str = "Posso ajudar você com:

📋 **Tarefas:**
• Como criar, editar e organizar tarefas
• Dicas de priorização

📊 **Dashboard:**
• Entender estatísticas
• Visualizar progresso

💬 **Chat:**
• Tirar dúvidas
• Obter dicas de produtividade

O que você precisa saber?";

const GREETING_WORDS: [&str; 5] = ["oi", "olá", "ola", "hey", "alo"];

/// Pick the canned reply for `message`.
pub fn fallback_reply(message: &str) -> String {
    let lower = message.to_lowercase();
    let has = |needle: &str| lower.contains(needle);

    if GREETING_WORDS.iter().any(|w| has(w)) {
        return GREETING.to_string();
    }

    if has("criar") && has("tarefa") {
        return CREATE_TASK.to_string();
    }

    if has("dashboard") {
        return DASHBOARD.to_string();
    }

    if has("atrasad") || has("prazo") {
        return PRIORITIZE.to_string();
    }

    if has("help") || has("ajuda") {
        return HELP.to_string();
    }

    generic_reply(message)
}

/// The catch-all reply, quoting the original message verbatim.
fn generic_reply(message: &str) -> String {
    format!(
        "Entendi sua mensagem: \"{message}\"

Posso ajudar você com:
• Criar e organizar tarefas
• Entender o dashboard
• Dicas de produtividade

O que você gostaria de saber? 😊"
    )
}
