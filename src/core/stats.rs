// src/core/stats.rs — Desk-wide ticket statistics

use std::collections::BTreeMap;

use serde::Serialize;

use super::types::{Ticket, TicketStatus};
use crate::util::round1;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeskStats {
    pub open: usize,
    pub escalated: usize,
    pub closed: usize,
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    /// Open tickets per routing team.
    pub open_by_team: BTreeMap<String, usize>,
    /// Mean hours from creation to resolution over resolved tickets.
    pub avg_resolution_hours: Option<f64>,
}

pub fn compute(tickets: &[Ticket]) -> DeskStats {
    let mut stats = DeskStats {
        total: tickets.len(),
        ..DeskStats::default()
    };
    let mut resolution_hours = Vec::new();

    for t in tickets {
        match t.status {
            TicketStatus::Open => {
                stats.open += 1;
                *stats
                    .open_by_team
                    .entry(t.team.as_str().to_string())
                    .or_default() += 1;
            }
            TicketStatus::Escalated => stats.escalated += 1,
            TicketStatus::Closed => stats.closed += 1,
        }
        *stats.by_category.entry(t.category.clone()).or_default() += 1;
        *stats
            .by_priority
            .entry(t.priority.as_str().to_string())
            .or_default() += 1;

        if let Some(resolved) = t.resolution_date {
            if resolved >= t.created_at {
                resolution_hours.push((resolved - t.created_at).num_seconds() as f64 / 3600.0);
            }
        }
    }

    if !resolution_hours.is_empty() {
        let mean = resolution_hours.iter().sum::<f64>() / resolution_hours.len() as f64;
        stats.avg_resolution_hours = Some(round1(mean));
    }
    stats
}
