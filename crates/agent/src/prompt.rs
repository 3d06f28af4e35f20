use ventura_core::domain::caller::Caller;
use ventura_core::domain::conversation::ConversationTurn;

use crate::context::ContextBlock;

pub const CONTEXT_START: &str = "=== DATOS DE LA PLATAFORMA ===";
pub const CONTEXT_END: &str = "=== FIN DE LOS DATOS ===";

/// Builds the system message that frames every model call.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    platform_name: String,
}

impl PromptBuilder {
    pub fn new(platform_name: impl Into<String>) -> Self {
        Self { platform_name: platform_name.into() }
    }

    pub fn system_prompt(&self, caller: &Caller, context: &ContextBlock) -> String {
        let mut prompt = format!(
            "Eres el asistente virtual de {platform}, una plataforma que conecta \
             emprendedores con inversores. Ayudas a los usuarios a entender sus \
             emprendimientos, encontrar inversores, dar seguimiento a solicitudes de \
             financiamiento y organizar sus conversaciones. Responde siempre en el idioma \
             del usuario, con frases claras y breves, en texto plano.\n\n\
             Usuario actual: ID {user_id} (rol: {role}).",
            platform = self.platform_name,
            user_id = caller.user_id,
            role = caller.role.display_name(),
        );

        if !context.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(CONTEXT_START);
            prompt.push('\n');
            prompt.push_str(&context.render());
            prompt.push('\n');
            prompt.push_str(CONTEXT_END);
            prompt.push_str(
                "\n\nUsa estos datos para responder con precisión. Si algo no aparece en \
                 los datos, dilo con honestidad en lugar de inventarlo.",
            );
        }

        prompt.push_str(
            "\n\nNunca menciones la base de datos, consultas internas ni cómo obtuviste \
             la información.",
        );
        prompt
    }

    /// The system message followed by the caller's transcript, untouched.
    pub fn build(
        &self,
        caller: &Caller,
        context: &ContextBlock,
        transcript: &[ConversationTurn],
    ) -> Vec<ConversationTurn> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(ConversationTurn::system(self.system_prompt(caller, context)));
        messages.extend_from_slice(transcript);
        messages
    }
}

#[cfg(test)]
mod tests {
    use ventura_core::domain::caller::{Caller, UserId, UserRole};
    use ventura_core::domain::conversation::{ConversationTurn, TurnRole};
    use ventura_core::domain::platform::UserStatistics;

    use super::{PromptBuilder, CONTEXT_END, CONTEXT_START};
    use crate::capabilities::CapabilityOutput;
    use crate::context::{ContextAssembler, ContextBlock};

    fn caller() -> Caller {
        Caller { user_id: UserId(17), role: UserRole::Investor }
    }

    #[test]
    fn empty_context_omits_delimiters() {
        let prompt = PromptBuilder::new("Ventura").system_prompt(&caller(), &ContextBlock::default());

        assert!(!prompt.contains(CONTEXT_START));
        assert!(!prompt.contains(CONTEXT_END));
        assert!(prompt.contains("ID 17"));
        assert!(prompt.contains("Ventura"));
        assert!(prompt.contains("Nunca menciones la base de datos"));
    }

    #[test]
    fn context_is_wrapped_in_delimiters() {
        let context = ContextAssembler::new()
            .assemble(&[CapabilityOutput::Statistics(UserStatistics::default())]);

        let prompt = PromptBuilder::new("Ventura").system_prompt(&caller(), &context);

        let start = prompt.find(CONTEXT_START).expect("start delimiter");
        let body = prompt.find("Tus estadísticas:").expect("context body");
        let end = prompt.find(CONTEXT_END).expect("end delimiter");
        assert!(start < body && body < end);
    }

    #[test]
    fn system_turn_is_prepended_to_unmodified_transcript() {
        let transcript = vec![
            ConversationTurn::user("hola"),
            ConversationTurn::assistant("¡Hola! ¿En qué te ayudo?"),
            ConversationTurn::user("  ¿qué tal?  "),
        ];

        let messages =
            PromptBuilder::new("Ventura").build(&caller(), &ContextBlock::default(), &transcript);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, TurnRole::System);
        assert_eq!(&messages[1..], transcript.as_slice());
    }
}
