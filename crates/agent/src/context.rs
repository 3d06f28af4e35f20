use std::fmt::Write as _;

use ventura_core::domain::platform::{
    ConversationSummary, FundingRequestSummary, InvestorSummary, UserStatistics, VentureSummary,
};

use crate::capabilities::CapabilityOutput;

const MAX_TEXT_CHARS: usize = 160;

/// Rendered platform facts, one fragment per non-empty capability result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextBlock {
    fragments: Vec<String>,
}

impl ContextBlock {
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn render(&self) -> String {
        self.fragments.join("\n\n")
    }
}

#[derive(Clone, Debug, Default)]
pub struct ContextAssembler;

impl ContextAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, outputs: &[CapabilityOutput]) -> ContextBlock {
        let fragments = outputs
            .iter()
            .filter(|output| !output.is_empty())
            .map(render_output)
            .collect();
        ContextBlock { fragments }
    }
}

fn render_output(output: &CapabilityOutput) -> String {
    match output {
        CapabilityOutput::Ventures { category: Some(category), rows } => {
            render_ventures(&format!("Emprendimientos en la categoría \"{category}\":"), rows)
        }
        CapabilityOutput::Ventures { category: None, rows } => {
            render_ventures("Emprendimientos recientes:", rows)
        }
        CapabilityOutput::SearchResults { name, rows } => {
            render_ventures(&format!("Resultados de búsqueda para \"{name}\":"), rows)
        }
        CapabilityOutput::Investors(rows) => render_investors(rows),
        CapabilityOutput::Statistics(statistics) => render_statistics(statistics),
        CapabilityOutput::Conversations(rows) => render_conversations(rows),
        CapabilityOutput::FundingRequests { status, rows } => {
            render_funding_requests(status.as_deref(), rows)
        }
    }
}

fn render_ventures(heading: &str, rows: &[VentureSummary]) -> String {
    let mut fragment = heading.to_owned();
    for (index, venture) in rows.iter().enumerate() {
        let _ = write!(
            fragment,
            "\n{}. {} ({}) de {}; meta de financiamiento: {}",
            index + 1,
            venture.name,
            venture.category.as_deref().unwrap_or("sin categoría"),
            venture.owner_name,
            venture.funding_goal.map(format_amount).unwrap_or_else(|| "no definida".to_owned()),
        );
        if let Some(description) = venture.description.as_deref().filter(|d| !d.trim().is_empty())
        {
            let _ = write!(fragment, "\n   {}", truncate(description.trim()));
        }
    }
    fragment
}

fn render_investors(rows: &[InvestorSummary]) -> String {
    let mut fragment = String::from("Inversores en la plataforma:");
    for (index, investor) in rows.iter().enumerate() {
        let _ = write!(fragment, "\n{}. {} ({})", index + 1, investor.name, investor.email);
        if let Some(bio) = investor.bio.as_deref().filter(|bio| !bio.trim().is_empty()) {
            let _ = write!(fragment, ": {}", truncate(bio.trim()));
        }
    }
    fragment
}

fn render_statistics(statistics: &UserStatistics) -> String {
    format!(
        "Tus estadísticas:\n\
         - Emprendimientos creados: {}\n\
         - Solicitudes de financiamiento enviadas: {}\n\
         - Solicitudes de contacto recibidas: {}\n\
         - Conversaciones activas: {}",
        statistics.ventures_owned,
        statistics.funding_requests_sent,
        statistics.contact_requests_received,
        statistics.chats,
    )
}

fn render_conversations(rows: &[ConversationSummary]) -> String {
    let mut fragment = String::from("Tus conversaciones recientes:");
    for (index, conversation) in rows.iter().enumerate() {
        let _ = write!(
            fragment,
            "\n{}. Con {}: {} mensajes sin leer",
            index + 1,
            conversation.counterpart_name,
            conversation.unread_count,
        );
        if let Some(last) = conversation.last_message.as_deref() {
            let _ = write!(fragment, "; último mensaje: \"{}\"", truncate(last.trim()));
        }
    }
    fragment
}

fn render_funding_requests(status: Option<&str>, rows: &[FundingRequestSummary]) -> String {
    let mut fragment = match status {
        Some(status) => format!("Solicitudes de financiamiento (estado: {status}):"),
        None => String::from("Solicitudes de financiamiento recientes:"),
    };
    for (index, request) in rows.iter().enumerate() {
        let _ = write!(
            fragment,
            "\n{}. {}: {} solicitados por {}",
            index + 1,
            request.venture_name,
            format_amount(request.amount),
            request.requester_name,
        );
        if let Some(investor) = request.investor_name.as_deref() {
            let _ = write!(fragment, " a {investor}");
        }
        let _ = write!(fragment, "; estado: {}; fecha: {}", request.status, request.requested_at);
    }
    fragment
}

/// `$12,500` style; cents are dropped.
fn format_amount(amount: f64) -> String {
    let whole = amount.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_CHARS {
        return text.to_owned();
    }
    let mut shortened = text.chars().take(MAX_TEXT_CHARS).collect::<String>();
    shortened.push('…');
    shortened
}

#[cfg(test)]
mod tests {
    use ventura_core::domain::caller::UserId;
    use ventura_core::domain::platform::{
        ConversationSummary, InvestorSummary, UserStatistics, VentureSummary,
    };

    use super::{format_amount, truncate, ContextAssembler, MAX_TEXT_CHARS};
    use crate::capabilities::CapabilityOutput;

    fn venture(name: &str, category: &str) -> VentureSummary {
        VentureSummary {
            id: 1,
            name: name.to_owned(),
            description: Some("Sensores de riego".to_owned()),
            category: Some(category.to_owned()),
            owner_name: "Ana Torres".to_owned(),
            funding_goal: Some(50000.0),
            created_at: "2024-03-01 10:00:00".to_owned(),
        }
    }

    #[test]
    fn no_outputs_render_empty_context() {
        let block = ContextAssembler::new().assemble(&[]);

        assert!(block.is_empty());
        assert_eq!(block.render(), "");
    }

    #[test]
    fn empty_lists_are_skipped_but_statistics_always_render() {
        let outputs = vec![
            CapabilityOutput::Investors(Vec::new()),
            CapabilityOutput::Statistics(UserStatistics::default()),
            CapabilityOutput::Conversations(Vec::new()),
        ];

        let block = ContextAssembler::new().assemble(&outputs);

        assert_eq!(block.fragments().len(), 1);
        assert!(block.render().starts_with("Tus estadísticas:"));
        assert!(block.render().contains("Conversaciones activas: 0"));
    }

    #[test]
    fn overlapping_venture_fragments_both_render_in_order() {
        let outputs = vec![
            CapabilityOutput::Ventures {
                category: None,
                rows: vec![venture("Agrotech Andina", "Agricultura")],
            },
            CapabilityOutput::Ventures {
                category: Some("tecnología".to_owned()),
                rows: vec![venture("CodeCraft", "Tecnología")],
            },
        ];

        let rendered = ContextAssembler::new().assemble(&outputs).render();

        let general = rendered.find("Emprendimientos recientes:").expect("general fragment");
        let filtered = rendered
            .find("Emprendimientos en la categoría \"tecnología\":")
            .expect("category fragment");
        assert!(general < filtered);
        assert!(rendered.contains("\n\nEmprendimientos en la categoría"));
        assert!(rendered.contains("1. CodeCraft (Tecnología) de Ana Torres; meta de financiamiento: $50,000"));
    }

    #[test]
    fn conversations_show_unread_counts() {
        let outputs = vec![CapabilityOutput::Conversations(vec![ConversationSummary {
            chat_id: 2,
            counterpart_name: "Carla Méndez".to_owned(),
            unread_count: 2,
            last_message: Some("Te propongo el jueves".to_owned()),
            last_activity: "2024-06-20 15:05:00".to_owned(),
        }])];

        let rendered = ContextAssembler::new().assemble(&outputs).render();

        assert_eq!(
            rendered,
            "Tus conversaciones recientes:\n1. Con Carla Méndez: 2 mensajes sin leer; último mensaje: \"Te propongo el jueves\""
        );
    }

    #[test]
    fn investor_lines_include_contact() {
        let outputs = vec![CapabilityOutput::Investors(vec![InvestorSummary {
            id: UserId(2),
            name: "Bruno Díaz".to_owned(),
            email: "bruno@ventura.test".to_owned(),
            bio: None,
        }])];

        let rendered = ContextAssembler::new().assemble(&outputs).render();

        assert_eq!(rendered, "Inversores en la plataforma:\n1. Bruno Díaz (bruno@ventura.test)");
    }

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_amount(0.0), "$0");
        assert_eq!(format_amount(950.4), "$950");
        assert_eq!(format_amount(1_250_000.0), "$1,250,000");
    }

    #[test]
    fn long_text_is_truncated() {
        let long = "x".repeat(MAX_TEXT_CHARS + 20);
        let shortened = truncate(&long);
        assert_eq!(shortened.chars().count(), MAX_TEXT_CHARS + 1);
        assert!(shortened.ends_with('…'));
    }
}
