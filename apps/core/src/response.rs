//! Template-driven response and suggestion composition.
//!
//! Everything here is fixed configuration data: headline templates keyed by
//! intent and style, entity call-outs, per-intent content blocks, call-to-
//! action tables, and follow-up suggestion lists. Selection is deterministic;
//! equally ranked entries resolve by declared order, never randomly.

use crate::brain::analysis::{AnalysisResult, QuestionType, Sentiment};
use crate::brain::classifier::Intent;
use crate::brain::semantic::ConceptScore;
use crate::session::SessionView;

/// Presentation style of a reply, chosen by the first matching rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStyle {
    Urgent,
    Detailed,
    Comparison,
    Standard,
}

/// Maximum characters of knowledge content quoted into a reply.
const MAX_EXCERPT_CHARS: usize = 500;

/// Rule order is fixed: urgency first, then detail/complexity, then
/// comparison. Sentiment does not participate; it only wraps the body.
pub fn select_style(analysis: &AnalysisResult, concepts: &[ConceptScore]) -> ResponseStyle {
    let signals = &analysis.intent_signals;
    if signals.urgency {
        ResponseStyle::Urgent
    } else if signals.wants_details || analysis.entities.total() >= 2 || concepts.len() >= 2 {
        ResponseStyle::Detailed
    } else if signals.comparison {
        ResponseStyle::Comparison
    } else {
        ResponseStyle::Standard
    }
}

/// Everything the generator needs for one reply.
pub struct GenerationInput<'a> {
    pub intent: Intent,
    pub confidence: f32,
    pub analysis: &'a AnalysisResult,
    pub concepts: &'a [ConceptScore],
    pub view: &'a SessionView,
    /// Relevant knowledge sections, best first; may be empty.
    pub knowledge: &'a [String],
}

/// Composes reply text and follow-up suggestions from fixed template tables.
pub struct ResponseGenerator {
    max_suggestions: usize,
}

impl ResponseGenerator {
    pub fn new(max_suggestions: usize) -> Self {
        Self { max_suggestions }
    }

    /// Builds the reply and its suggestions. Deterministic for identical
    /// inputs.
    pub fn generate(&self, input: &GenerationInput<'_>) -> (String, Vec<String>) {
        let style = select_style(input.analysis, input.concepts);
        let mut parts: Vec<String> = vec![];

        if let Some(opener) = sentiment_opener(input.analysis.sentiment) {
            parts.push(opener.to_string());
        }

        parts.push(headline(input.intent, style).to_string());

        let callouts = entity_callouts(input.analysis);
        if !callouts.is_empty() {
            parts.push(callouts.join("\n"));
        }

        if let Some(block) = content_block(input.intent, input.analysis) {
            parts.push(block);
        }

        if let Some(line) = question_line(input.analysis.question_type, input.intent) {
            parts.push(line.to_string());
        }

        if let Some(content) = input.knowledge.first() {
            parts.push(excerpt(content, MAX_EXCERPT_CHARS));
        }

        parts.push(cta_block(input.intent, input.analysis));

        if let Some(closer) = sentiment_closer(input.analysis.sentiment) {
            parts.push(closer.to_string());
        }

        let reply = parts.join("\n\n");
        let suggestions = self.suggestions(input);
        (reply, suggestions)
    }

    /// Context-personalized entries first, then unseen entries from the
    /// per-intent follow-up table; anything already surfaced in the session
    /// is skipped and the result is capped.
    fn suggestions(&self, input: &GenerationInput<'_>) -> Vec<String> {
        let flags = &input.view.context_flags;
        let shown = &input.view.shown_suggestions;
        let mut out: Vec<String> = vec![];

        let push_unseen = |candidate: &str, out: &mut Vec<String>| {
            if out.len() < self.max_suggestions
                && !shown.iter().any(|s| s == candidate)
                && !out.iter().any(|s| s == candidate)
            {
                out.push(candidate.to_string());
            }
        };

        if flags.explored_programs.contains("tact") {
            push_unseen("Learn more about TACT program requirements", &mut out);
        }
        if flags.considering_application {
            push_unseen("View application deadlines and requirements", &mut out);
        }
        if !flags.explored_programs.is_empty() {
            push_unseen("Compare different program options", &mut out);
        }

        let follow_up_count = if input.analysis.intent_signals.wants_details {
            2
        } else {
            1
        };
        let mut taken = 0;
        for candidate in follow_ups(input.intent) {
            if taken >= follow_up_count {
                break;
            }
            let before = out.len();
            push_unseen(candidate, &mut out);
            if out.len() > before {
                taken += 1;
            }
        }

        out
    }
}

fn sentiment_opener(sentiment: Sentiment) -> Option<&'static str> {
    match sentiment {
        Sentiment::Positive => Some("Great to hear from you!"),
        Sentiment::Negative => {
            Some("I'm here to help make your MPTI experience better.")
        }
        Sentiment::Neutral => None,
    }
}

fn sentiment_closer(sentiment: Sentiment) -> Option<&'static str> {
    match sentiment {
        Sentiment::Positive => Some("Happy to help with anything else!"),
        Sentiment::Negative => {
            Some("If anything is still unclear, just ask - I'm here to help.")
        }
        Sentiment::Neutral => None,
    }
}

/// (intent, style) headline with a fallback chain down to the standard
/// headline for the intent.
fn headline(intent: Intent, style: ResponseStyle) -> &'static str {
    match (intent, style) {
        (Intent::Programs, ResponseStyle::Comparison) => {
            "Here's a comparison of our programs to help you decide:"
        }
        (Intent::Programs, ResponseStyle::Detailed) => {
            "Let me provide detailed information about our programs:"
        }
        (Intent::Application, ResponseStyle::Urgent) => {
            "I understand you need application information quickly! Here's what you need:"
        }
        (Intent::Application, ResponseStyle::Detailed) => {
            "Let me walk you through the complete application process:"
        }
        _ => standard_headline(intent),
    }
}

fn standard_headline(intent: Intent) -> &'static str {
    match intent {
        Intent::History => "**MPTI Technical Institute History**",
        Intent::TactProgram => "**TACT Program - Technical Advancement and Certification Training**",
        Intent::Application => "**Ready to Join MPTI Technical Institute?**",
        Intent::Programs => "**MPTI Technical Institute Programs**",
        Intent::Contact => "**Get in Touch with MPTI**",
        Intent::Greeting => "Hello! Welcome to MPTI Technical Institute!",
        Intent::Fees => "**Tuition and Financial Support at MPTI**",
        Intent::Requirements => "**Admission Requirements**",
        Intent::Schedule => "**Program Schedules and Academic Calendar**",
        Intent::General => "**Welcome to MPTI Technical Institute!**",
    }
}

/// One line per recognized entity, in the entity's extraction order.
fn entity_callouts(analysis: &AnalysisResult) -> Vec<&'static str> {
    let mut lines = vec![];

    for program in &analysis.entities.programs {
        let line = match program.as_str() {
            "tact" => "**TACT Program** - Our flagship professional development program",
            "mechanical" => "**Mechanical Engineering** - Comprehensive mechanical systems training",
            "electrical" => "**Electrical Engineering** - Power systems and electrical technology",
            "welding" => "**Welding and Fabrication** - Advanced welding techniques and certification",
            "instrumentation" => {
                "**Instrumentation and Control** - Process control and automation systems"
            }
            _ => continue,
        };
        lines.push(line);
    }

    if analysis
        .entities
        .time_periods
        .iter()
        .any(|p| p == "semester" || p == "year")
    {
        lines.push(
            "**Academic Calendar** - Programs run on a semester basis with flexible start dates",
        );
    }

    lines
}

/// Fixed per-intent content block; programs get benefits appended when the
/// user asked for detail.
fn content_block(intent: Intent, analysis: &AnalysisResult) -> Option<String> {
    match intent {
        Intent::Programs => {
            let mut block = String::from(
                "**Our Programs:**\n\
                 • **Mechanical Engineering Technology** - Hands-on training with industry equipment\n\
                 • **Electrical Engineering Technology** - Power systems and control technology\n\
                 • **Welding and Fabrication** - Advanced welding techniques and certification\n\
                 • **Instrumentation and Control** - Process control and automation systems",
            );
            if analysis.intent_signals.wants_details {
                block.push_str(
                    "\n\n**Why Choose MPTI:**\n\
                     • Industry-standard equipment and facilities\n\
                     • Experienced instructors with industry background\n\
                     • Job placement assistance after graduation\n\
                     • Flexible scheduling options available",
                );
            }
            Some(block)
        }
        Intent::Application => Some(
            "**Application Process:**\n\
             1. **Complete Application Form** - Available online or in-person\n\
             2. **Submit Required Documents** - Transcripts and identification\n\
             3. **Schedule Interview** - Meet with our admissions team\n\
             4. **Financial Planning** - Discuss payment options and aid"
                .to_string(),
        ),
        Intent::TactProgram => Some(
            "The TACT program is MPTI's professional development initiative for advanced \
             technical training, combining certification coursework with hands-on practice."
                .to_string(),
        ),
        Intent::Fees => Some(
            "• Program-specific tuition rates\n\
             • Flexible payment plans\n\
             • Scholarship opportunities for qualifying students\n\
             • Financial aid guidance from our admissions team"
                .to_string(),
        ),
        Intent::Requirements => Some(
            "• Completed application form\n\
             • Academic transcripts and identification\n\
             • Program-specific prerequisites\n\
             • Interview with the admissions team"
                .to_string(),
        ),
        Intent::Schedule => Some(
            "Programs start multiple times per year with flexible scheduling options, \
             including morning and evening classes on a semester calendar."
                .to_string(),
        ),
        Intent::Contact => Some(
            "**Website:** https://www.mptigh.com/\n\
             **Contact Page:** https://www.mptigh.com/contact"
                .to_string(),
        ),
        Intent::History => Some(
            "MPTI Technical Institute has been serving the technical education community, \
             establishing itself as a leading institution in technical and engineering \
             education in Ghana."
                .to_string(),
        ),
        Intent::General => Some(
            "I'm here to help with MPTI information - programs, admissions, the TACT \
             program, schedules, fees, and more."
                .to_string(),
        ),
        Intent::Greeting => Some(
            "I'm your MPTI Assistant. I can help you with:\n\
             • Programs and Courses\n\
             • TACT Program Information\n\
             • Admissions Process\n\
             • Contact Information"
                .to_string(),
        ),
    }
}

/// Direct answer line keyed by question type and intent, when one exists.
fn question_line(question_type: QuestionType, intent: Intent) -> Option<&'static str> {
    match (question_type, intent) {
        (QuestionType::What, Intent::Programs) => Some(
            "Our programs include technical education, engineering technology, and professional certifications.",
        ),
        (QuestionType::What, Intent::Application) => Some(
            "The application process involves completing forms, submitting documents, and meeting requirements.",
        ),
        (QuestionType::How, Intent::Programs) => Some(
            "You can explore programs through our website, campus visits, or speaking with advisors.",
        ),
        (QuestionType::How, Intent::Application) => Some(
            "Apply online through our admissions portal or visit our campus for in-person assistance.",
        ),
        (QuestionType::When, Intent::Programs) => Some(
            "Programs start multiple times per year with flexible scheduling options.",
        ),
        (QuestionType::When, Intent::Application) => Some(
            "Applications are accepted year-round with rolling admissions.",
        ),
        (QuestionType::Where, Intent::Programs) => Some(
            "Classes are held at our modern campus facilities in Ghana.",
        ),
        (QuestionType::Where, Intent::Contact) => Some(
            "Visit us at our main campus or contact us through our website.",
        ),
        _ => None,
    }
}

/// Next-steps block: per-intent base links, urgency prepends a hotline line,
/// comparison appends the comparison tool, capped at three entries.
fn cta_block(intent: Intent, analysis: &AnalysisResult) -> String {
    let base: &[&str] = match intent {
        Intent::Programs => &[
            "**Explore Programs:** https://www.mptigh.com/programs",
            "**Speak with an Advisor:** https://www.mptigh.com/contact",
        ],
        Intent::Application => &[
            "**Start Application:** https://www.mptigh.com/admissions",
            "**Chat with Admissions:** https://www.mptigh.com/contact",
        ],
        Intent::TactProgram => &[
            "**TACT Program Details:** https://www.mptigh.com/tact-program",
            "**Apply for TACT:** https://www.mptigh.com/admissions",
        ],
        Intent::Contact => &[
            "**Contact Us:** https://www.mptigh.com/contact",
            "**Visit Campus:** https://www.mptigh.com/about",
        ],
        Intent::History => &[
            "**Learn About MPTI:** https://www.mptigh.com/about",
            "**View Programs:** https://www.mptigh.com/programs",
        ],
        _ => &[
            "**Visit Website:** https://www.mptigh.com/",
            "**Contact Us:** https://www.mptigh.com/contact",
        ],
    };

    let mut ctas: Vec<&str> = vec![];
    if analysis.intent_signals.urgency {
        ctas.push("**Immediate Assistance:** Call our admissions hotline");
    }
    ctas.extend(base);
    if analysis.intent_signals.comparison {
        ctas.push("**Compare Programs:** Use our program comparison tool");
    }
    ctas.truncate(3);

    let mut block = String::from("**Next Steps:**");
    for cta in ctas {
        block.push_str("\n• ");
        block.push_str(cta);
    }
    block
}

/// Fixed per-intent follow-up questions; greeting and general intentionally
/// have none.
fn follow_ups(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Programs => &[
            "Would you like to know about specific program requirements?",
            "Are you interested in full-time or part-time study options?",
            "Do you have a particular engineering specialization in mind?",
        ],
        Intent::Application => &[
            "Do you have questions about application requirements?",
            "Would you like information about financial aid options?",
            "Are you ready to schedule a campus visit?",
        ],
        Intent::TactProgram => &[
            "Are you currently working in a technical field?",
            "Would you like to know about TACT program scheduling?",
            "Do you need information about TACT certification requirements?",
        ],
        Intent::Fees => &[
            "Would you like information about financial aid options?",
            "Do you want to know about scholarship eligibility?",
        ],
        Intent::Requirements => &[
            "Do you have questions about application requirements?",
            "Would you like to see the prerequisites for a specific program?",
        ],
        Intent::Schedule => &[
            "Would you like to know when the next semester starts?",
            "Are morning or evening classes more convenient for you?",
        ],
        Intent::Contact => &["Are you ready to schedule a campus visit?"],
        Intent::History => &["Would you like to explore our current programs?"],
        Intent::Greeting | Intent::General => &[],
    }
}

/// Cuts content at a char boundary, appending an ellipsis when truncated.
fn excerpt(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &content[..byte_index]),
        None => content.to_string(),
    }
}
