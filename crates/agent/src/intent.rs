use once_cell::sync::Lazy;
use regex::Regex;

use ventura_core::domain::caller::Caller;
use ventura_core::domain::conversation::{last_user_message, ConversationTurn};

use crate::capabilities::{
    CapabilityId, IntentSignal, ListFundingRequestsParams, ListInvestorsParams,
    ListVenturesParams, SearchVenturesParams, UserConversationsParams, UserStatisticsParams,
};

/// Row limit every detector-issued list request asks for.
pub const DETECTED_LIST_LIMIT: u32 = 5;

const VENTURE_TERMS: &[&str] =
    &["emprendimiento", "proyecto", "negocio", "venture", "project", "business"];
const STATISTICS_TERMS: &[&str] = &["estadística", "estadistica", "statistic"];
const POSSESSIVE_WORDS: &[&str] = &["mi", "mis", "my"];
const PERSONAL_DATA_TERMS: &[&str] =
    &["datos", "información", "informacion", "data", "information"];
const CONVERSATION_TERMS: &[&str] =
    &["conversación", "conversacion", "chat", "mensaje", "conversation", "message"];
const INVESTOR_TERMS: &[&str] = &["inversor", "inversionista", "investor"];
const REQUEST_TERMS: &[&str] = &["solicitud", "request"];
const FUNDING_TERMS: &[&str] = &["financiamiento", "financing", "funding"];
const CATEGORY_CUES: &[&str] =
    &["emprendimiento", "tecnolog", "salud", "venture", "technolog", "health"];
const CATEGORY_STOPWORDS: &[&str] =
    &["la", "el", "los", "las", "un", "una", "mi", "mis", "the", "a", "an", "my"];

static SEARCH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:busca|buscar|encuentra|encontrar|search|find)\s+(?:"([^"]+)"|“([^”]+)”|'([^']+)'|‘([^’]+)’|([^\s"“”'‘’?¿!¡.,;:]+))"#,
    )
    .expect("search pattern is a valid regex")
});

static CATEGORY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bcategor(?:[ií]as?|y|ies)\s+(?:(?:de|of)\s+)?([\p{L}\p{N}_-]+)")
        .expect("category pattern is a valid regex")
});

static CATEGORY_FALLBACK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:de|of)\s+(?:(?:la|el|los|las|the)\s+)?([\p{L}\p{N}_-]+)")
        .expect("category fallback pattern is a valid regex")
});

/// The latest user message in the shapes triggers match against.
struct MessageView<'a> {
    original: &'a str,
    lowered: String,
    words: Vec<String>,
}

impl<'a> MessageView<'a> {
    fn new(original: &'a str) -> Self {
        let lowered = original.to_lowercase();
        let words = lowered
            .split(|character: char| !character.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_owned)
            .collect();
        Self { original, lowered, words }
    }

    fn contains_any(&self, terms: &[&str]) -> bool {
        terms.iter().any(|term| self.lowered.contains(term))
    }

    fn has_word(&self, candidates: &[&str]) -> bool {
        self.words.iter().any(|word| candidates.contains(&word.as_str()))
    }
}

struct Trigger {
    name: &'static str,
    capability: CapabilityId,
    detect: fn(&MessageView<'_>, &Caller) -> Option<IntentSignal>,
}

/// Evaluated in order, each independently of the others.
const TRIGGERS: &[Trigger] = &[
    Trigger {
        name: "venture_terms",
        capability: CapabilityId::ListVentures,
        detect: detect_ventures,
    },
    Trigger {
        name: "statistics_terms",
        capability: CapabilityId::UserStatistics,
        detect: detect_statistics,
    },
    Trigger {
        name: "conversation_terms",
        capability: CapabilityId::UserConversations,
        detect: detect_conversations,
    },
    Trigger {
        name: "investor_terms",
        capability: CapabilityId::ListInvestors,
        detect: detect_investors,
    },
    Trigger {
        name: "funding_request_terms",
        capability: CapabilityId::ListFundingRequests,
        detect: detect_funding_requests,
    },
    Trigger {
        name: "search_pattern",
        capability: CapabilityId::SearchVentures,
        detect: detect_search,
    },
    Trigger {
        name: "category_pattern",
        capability: CapabilityId::ListVentures,
        detect: detect_category,
    },
];

fn detect_ventures(message: &MessageView<'_>, _caller: &Caller) -> Option<IntentSignal> {
    message.contains_any(VENTURE_TERMS).then(|| {
        IntentSignal::ListVentures(ListVenturesParams { limit: DETECTED_LIST_LIMIT, category: None })
    })
}

fn detect_statistics(message: &MessageView<'_>, caller: &Caller) -> Option<IntentSignal> {
    let asks_for_statistics = message.contains_any(STATISTICS_TERMS)
        || (message.has_word(POSSESSIVE_WORDS) && message.contains_any(PERSONAL_DATA_TERMS));
    asks_for_statistics
        .then(|| IntentSignal::UserStatistics(UserStatisticsParams { user_id: caller.user_id }))
}

fn detect_conversations(message: &MessageView<'_>, caller: &Caller) -> Option<IntentSignal> {
    message.contains_any(CONVERSATION_TERMS).then(|| {
        IntentSignal::UserConversations(UserConversationsParams { user_id: caller.user_id })
    })
}

fn detect_investors(message: &MessageView<'_>, _caller: &Caller) -> Option<IntentSignal> {
    message
        .contains_any(INVESTOR_TERMS)
        .then(|| IntentSignal::ListInvestors(ListInvestorsParams { limit: DETECTED_LIST_LIMIT }))
}

fn detect_funding_requests(message: &MessageView<'_>, _caller: &Caller) -> Option<IntentSignal> {
    (message.contains_any(REQUEST_TERMS) && message.contains_any(FUNDING_TERMS)).then(|| {
        IntentSignal::ListFundingRequests(ListFundingRequestsParams {
            limit: DETECTED_LIST_LIMIT,
            status: None,
        })
    })
}

fn detect_search(message: &MessageView<'_>, _caller: &Caller) -> Option<IntentSignal> {
    let captures = SEARCH_PATTERN.captures(message.original)?;
    let name = (1..=5)
        .find_map(|group| captures.get(group))
        .map(|capture| capture.as_str().trim())
        .filter(|name| !name.is_empty())?;
    Some(IntentSignal::SearchVentures(SearchVenturesParams { name: name.to_owned() }))
}

fn detect_category(message: &MessageView<'_>, _caller: &Caller) -> Option<IntentSignal> {
    if !message.contains_any(CATEGORY_CUES) {
        return None;
    }
    let category = CATEGORY_PATTERN
        .captures(message.original)
        .and_then(|captures| captures.get(1))
        .map(|capture| capture.as_str())
        .filter(|word| is_category_name(word))
        .or_else(|| {
            CATEGORY_FALLBACK_PATTERN
                .captures_iter(message.original)
                .filter_map(|captures| captures.get(1))
                .map(|capture| capture.as_str())
                .find(|word| is_category_name(word))
        })?;
    Some(IntentSignal::ListVentures(ListVenturesParams {
        limit: DETECTED_LIST_LIMIT,
        category: Some(category.to_owned()),
    }))
}

/// Articles and the venture nouns themselves never name a category.
fn is_category_name(word: &str) -> bool {
    let lowered = word.to_lowercase();
    !CATEGORY_STOPWORDS.contains(&lowered.as_str())
        && !VENTURE_TERMS.iter().any(|term| lowered.starts_with(term))
}

/// Keyword and pattern matcher that decides which platform facts a message
/// needs before the model is called.
#[derive(Clone, Debug, Default)]
pub struct IntentDetector;

impl IntentDetector {
    pub fn new() -> Self {
        Self
    }

    /// Signals for the last `user` turn; none when there is no such turn.
    pub fn detect(&self, caller: &Caller, transcript: &[ConversationTurn]) -> Vec<IntentSignal> {
        last_user_message(transcript).map(|text| self.detect_text(caller, text)).unwrap_or_default()
    }

    pub fn detect_text(&self, caller: &Caller, text: &str) -> Vec<IntentSignal> {
        let message = MessageView::new(text);
        TRIGGERS
            .iter()
            .filter_map(|trigger| {
                let signal = (trigger.detect)(&message, caller)?;
                tracing::debug!(
                    event_name = "assistant.intent.fired",
                    trigger = trigger.name,
                    capability = trigger.capability.as_str(),
                    "intent trigger fired"
                );
                Some(signal)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use ventura_core::domain::caller::{Caller, UserId, UserRole};
    use ventura_core::domain::conversation::ConversationTurn;

    use super::IntentDetector;
    use crate::capabilities::{
        IntentSignal, ListFundingRequestsParams, ListInvestorsParams, ListVenturesParams,
        SearchVenturesParams, UserConversationsParams, UserStatisticsParams,
    };

    fn caller() -> Caller {
        Caller { user_id: UserId(42), role: UserRole::Entrepreneur }
    }

    fn detect(text: &str) -> Vec<IntentSignal> {
        IntentDetector::new().detect_text(&caller(), text)
    }

    #[test]
    fn small_talk_fires_nothing() {
        assert!(detect("Hola, ¿cómo estás hoy?").is_empty());
    }

    #[test]
    fn quoted_search_keeps_original_casing() {
        assert_eq!(
            detect(r#"busca "Agrotech""#),
            vec![IntentSignal::SearchVentures(SearchVenturesParams {
                name: "Agrotech".to_owned()
            })]
        );
    }

    #[test]
    fn bare_word_search_captures_one_word() {
        assert_eq!(
            detect("Puedes buscar Agrotech por favor?"),
            vec![IntentSignal::SearchVentures(SearchVenturesParams {
                name: "Agrotech".to_owned()
            })]
        );
    }

    #[test]
    fn quoted_search_captures_whole_phrase() {
        assert_eq!(
            detect(r#"find "Agrotech Andina""#),
            vec![IntentSignal::SearchVentures(SearchVenturesParams {
                name: "Agrotech Andina".to_owned()
            })]
        );
    }

    #[test]
    fn single_quoted_search_drops_the_quotes() {
        assert_eq!(
            detect("busca 'Agrotech Andina'"),
            vec![IntentSignal::SearchVentures(SearchVenturesParams {
                name: "Agrotech Andina".to_owned()
            })]
        );
        assert_eq!(
            detect("busca 'Agrotech'"),
            vec![IntentSignal::SearchVentures(SearchVenturesParams {
                name: "Agrotech".to_owned()
            })]
        );
    }

    #[test]
    fn statistics_use_callers_own_id() {
        assert_eq!(
            detect("Quiero ver mis estadísticas"),
            vec![IntentSignal::UserStatistics(UserStatisticsParams { user_id: UserId(42) })]
        );
    }

    #[test]
    fn possessive_with_data_term_requests_statistics() {
        assert_eq!(
            detect("show my data"),
            vec![IntentSignal::UserStatistics(UserStatisticsParams { user_id: UserId(42) })]
        );
    }

    #[test]
    fn possessive_must_be_a_whole_word() {
        // "mientras" contains "mi" but is not a possessive.
        assert!(detect("mientras tanto, datos generales").is_empty());
    }

    #[test]
    fn venture_and_category_signals_both_fire() {
        assert_eq!(
            detect("Muéstrame emprendimientos de la categoría tecnología"),
            vec![
                IntentSignal::ListVentures(ListVenturesParams { limit: 5, category: None }),
                IntentSignal::ListVentures(ListVenturesParams {
                    limit: 5,
                    category: Some("tecnología".to_owned()),
                }),
            ]
        );
    }

    #[test]
    fn category_falls_back_to_de_phrase_skipping_articles() {
        let signals = detect("¿Qué hay de la salud digital? Algo de Salud");
        assert_eq!(
            signals,
            vec![IntentSignal::ListVentures(ListVenturesParams {
                limit: 5,
                category: Some("salud".to_owned()),
            })]
        );
    }

    #[test]
    fn english_category_keyword_names_the_category() {
        assert_eq!(
            detect("show ventures in category health"),
            vec![
                IntentSignal::ListVentures(ListVenturesParams { limit: 5, category: None }),
                IntentSignal::ListVentures(ListVenturesParams {
                    limit: 5,
                    category: Some("health".to_owned()),
                }),
            ]
        );
    }

    #[test]
    fn category_falls_back_to_of_phrase() {
        assert_eq!(
            detect("list technology ventures of the health sector"),
            vec![
                IntentSignal::ListVentures(ListVenturesParams { limit: 5, category: None }),
                IntentSignal::ListVentures(ListVenturesParams {
                    limit: 5,
                    category: Some("health".to_owned()),
                }),
            ]
        );
    }

    #[test]
    fn venture_noun_after_de_is_not_a_category() {
        assert_eq!(
            detect("dame la lista de emprendimientos"),
            vec![IntentSignal::ListVentures(ListVenturesParams { limit: 5, category: None })]
        );
    }

    #[test]
    fn category_requires_a_cue() {
        assert!(detect("la categoría deportes").is_empty());
    }

    #[test]
    fn triggers_fire_in_table_order() {
        let signals = detect("Mensajes de inversores sobre mi solicitud de financiamiento");
        assert_eq!(
            signals,
            vec![
                IntentSignal::UserConversations(UserConversationsParams { user_id: UserId(42) }),
                IntentSignal::ListInvestors(ListInvestorsParams { limit: 5 }),
                IntentSignal::ListFundingRequests(ListFundingRequestsParams {
                    limit: 5,
                    status: None,
                }),
            ]
        );
    }

    #[test]
    fn funding_trigger_needs_both_terms() {
        assert!(detect("tengo una solicitud pendiente").is_empty());
    }

    #[test]
    fn only_the_last_user_turn_is_inspected() {
        let transcript = vec![
            ConversationTurn::user("lista los inversores"),
            ConversationTurn::assistant("Claro, aquí tienes los inversores."),
            ConversationTurn::user("gracias"),
        ];

        assert!(IntentDetector::new().detect(&caller(), &transcript).is_empty());
    }

    #[test]
    fn transcript_without_user_turn_fires_nothing() {
        let transcript = vec![ConversationTurn::assistant("¿En qué te ayudo con tus proyectos?")];

        assert!(IntentDetector::new().detect(&caller(), &transcript).is_empty());
    }
}
