// src/triage/priority.rs — Priority, team and resolution-time rule tables
//
// Each cascade is an ordered list of named rules; the first match wins.

use crate::core::types::{category, Priority, Sentiment, Team};
use crate::util::round1;

/// What a rule looks at.
pub struct RuleInput<'a> {
    /// Lower-cased description.
    pub text: &'a str,
    pub sentiment: Sentiment,
    pub category: &'a str,
}

pub struct Rule<T: 'static> {
    pub name: &'static str,
    pub matches: fn(&RuleInput) -> bool,
    pub outcome: T,
}

/// Outcome of a cascade together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleMatch<T> {
    pub rule: &'static str,
    pub outcome: T,
}

fn evaluate<T: Copy>(
    rules: &'static [Rule<T>],
    input: &RuleInput,
    default: RuleMatch<T>,
) -> RuleMatch<T> {
    rules
        .iter()
        .find(|r| (r.matches)(input))
        .map(|r| RuleMatch {
            rule: r.name,
            outcome: r.outcome,
        })
        .unwrap_or(default)
}

fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

// ─── Priority ───────────────────────────────────────────────────────────────

const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "critical",
    "emergency",
    "immediately",
    "asap",
    "broken",
    "error",
    "not working",
];
const NETWORK_KEYWORDS: &[&str] = &["network", "connection", "internet", "wifi", "connect", "slow"];
const ACCOUNT_KEYWORDS: &[&str] = &["account", "password", "login", "locked", "security"];
const PAYMENT_KEYWORDS: &[&str] = &["payment", "charge", "refund", "billing", "invoice", "money"];
const APP_KEYWORDS: &[&str] = &["crash", "bug", "glitch", "freeze", "stuck"];

fn has_urgent_keyword(i: &RuleInput) -> bool {
    mentions_any(i.text, URGENT_KEYWORDS)
}

fn is_heated(i: &RuleInput) -> bool {
    matches!(
        i.sentiment,
        Sentiment::Urgent | Sentiment::Frustrated | Sentiment::Annoyed
    )
}

fn is_uneasy(i: &RuleInput) -> bool {
    matches!(i.sentiment, Sentiment::Anxious | Sentiment::Confused)
}

fn is_network(i: &RuleInput) -> bool {
    mentions_any(i.text, NETWORK_KEYWORDS)
}

fn is_account(i: &RuleInput) -> bool {
    mentions_any(i.text, ACCOUNT_KEYWORDS)
}

fn is_failed_payment(i: &RuleInput) -> bool {
    is_payment(i) && (i.text.contains("not") || i.text.contains("failed"))
}

fn is_payment(i: &RuleInput) -> bool {
    mentions_any(i.text, PAYMENT_KEYWORDS)
}

fn is_app_fault(i: &RuleInput) -> bool {
    mentions_any(i.text, APP_KEYWORDS)
}

pub static PRIORITY_RULES: &[Rule<Priority>] = &[
    Rule { name: "urgent_keyword", matches: has_urgent_keyword, outcome: Priority::Critical },
    Rule { name: "heated_sentiment", matches: is_heated, outcome: Priority::High },
    Rule { name: "uneasy_sentiment", matches: is_uneasy, outcome: Priority::Medium },
    Rule { name: "network_keyword", matches: is_network, outcome: Priority::Medium },
    Rule { name: "account_keyword", matches: is_account, outcome: Priority::High },
    Rule { name: "failed_payment", matches: is_failed_payment, outcome: Priority::Critical },
    Rule { name: "payment_keyword", matches: is_payment, outcome: Priority::High },
    Rule { name: "app_fault", matches: is_app_fault, outcome: Priority::Medium },
];

/// Priority plus the name of the rule that decided it.
pub fn explain_priority(sentiment: Sentiment, description: &str) -> RuleMatch<Priority> {
    let text = description.to_lowercase();
    let input = RuleInput {
        text: &text,
        sentiment,
        category: "",
    };
    evaluate(
        PRIORITY_RULES,
        &input,
        RuleMatch {
            rule: "default",
            outcome: Priority::Low,
        },
    )
}

pub fn determine_priority(sentiment: Sentiment, description: &str) -> Priority {
    explain_priority(sentiment, description).outcome
}

// ─── Resolution time ────────────────────────────────────────────────────────

const COMPLEXITY_KEYWORDS: &[&str] = &[
    "complex",
    "multiple",
    "several",
    "failed repeatedly",
    "tried everything",
];

fn base_hours(category_name: &str) -> f64 {
    match category_name {
        category::NETWORK => 2.0,
        category::SOFTWARE => 1.5,
        category::ACCOUNT => 1.0,
        category::PAYMENT => 3.0,
        category::DEVICE => 2.5,
        "General Issue" => 1.0,
        _ => 2.0,
    }
}

fn priority_multiplier(priority: Priority) -> f64 {
    match priority {
        Priority::Critical => 0.5,
        Priority::High => 0.8,
        Priority::Medium => 1.0,
        Priority::Low => 1.5,
    }
}

/// Estimated hours to resolve, rounded to one decimal.
pub fn estimate_resolution_time(category_name: &str, description: &str, priority: Priority) -> f64 {
    let mut hours = base_hours(category_name) * priority_multiplier(priority);
    if mentions_any(&description.to_lowercase(), COMPLEXITY_KEYWORDS) {
        hours *= 1.5;
    }
    round1(hours)
}

// ─── Team ───────────────────────────────────────────────────────────────────

fn mentions_payment(i: &RuleInput) -> bool {
    mentions_any(i.text, &["payment", "transaction", "credit card"])
}

fn mentions_network(i: &RuleInput) -> bool {
    mentions_any(i.text, &["network", "internet", "connection"])
}

fn mentions_account(i: &RuleInput) -> bool {
    mentions_any(i.text, &["account", "login", "password"])
}

fn mentions_software(i: &RuleInput) -> bool {
    mentions_any(i.text, &["install", "software", "app"])
}

fn in_network_category(i: &RuleInput) -> bool {
    i.category == category::NETWORK
}

fn in_software_category(i: &RuleInput) -> bool {
    i.category == category::SOFTWARE
}

fn in_account_category(i: &RuleInput) -> bool {
    i.category == category::ACCOUNT
}

fn in_payment_category(i: &RuleInput) -> bool {
    i.category == category::PAYMENT
}

fn in_device_category(i: &RuleInput) -> bool {
    i.category == category::DEVICE
}

pub static TEAM_RULES: &[Rule<Team>] = &[
    Rule { name: "payment_mention", matches: mentions_payment, outcome: Team::Payment },
    Rule { name: "network_mention", matches: mentions_network, outcome: Team::Network },
    Rule { name: "account_mention", matches: mentions_account, outcome: Team::Account },
    Rule { name: "software_mention", matches: mentions_software, outcome: Team::Software },
    Rule { name: "network_category", matches: in_network_category, outcome: Team::Network },
    Rule { name: "software_category", matches: in_software_category, outcome: Team::Software },
    Rule { name: "account_category", matches: in_account_category, outcome: Team::Account },
    Rule { name: "payment_category", matches: in_payment_category, outcome: Team::Payment },
    Rule { name: "device_category", matches: in_device_category, outcome: Team::TechSupport },
];

pub fn explain_team(category_name: &str, description: &str) -> RuleMatch<Team> {
    let text = description.to_lowercase();
    let input = RuleInput {
        text: &text,
        sentiment: Sentiment::Neutral,
        category: category_name,
    };
    evaluate(
        TEAM_RULES,
        &input,
        RuleMatch {
            rule: "default",
            outcome: Team::TechSupport,
        },
    )
}

pub fn assign_team(category_name: &str, description: &str) -> Team {
    explain_team(category_name, description).outcome
}

// ─── Urgency ────────────────────────────────────────────────────────────────

/// 1-10 urgency used for queue ordering.
pub fn urgency_score(priority: Priority, sentiment: Sentiment) -> u8 {
    let mut score: i32 = 5;
    score += match priority {
        Priority::Critical => 3,
        Priority::High => 2,
        Priority::Medium => 0,
        Priority::Low => -2,
    };
    if matches!(
        sentiment,
        Sentiment::Frustrated | Sentiment::Annoyed | Sentiment::Urgent
    ) {
        score += 1;
    }
    score.clamp(1, 10) as u8
}
