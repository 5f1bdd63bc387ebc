//! In-memory filtering for appointment and activity-log listings.
//!
//! Filters are pure: they take a loaded slice, apply every present
//! criterion with AND semantics, and return matching clones in the
//! input order. The source slice is never reordered or mutated.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{ActivityLog, Appointment, AppointmentFilter, LogFilter};

pub fn filter_appointments(
    appointments: &[Appointment],
    filter: &AppointmentFilter,
) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|appt| {
            if let Some(name) = &filter.name {
                if !contains_ignore_case(&appt.full_name, name) {
                    return false;
                }
            }
            if !within_range(
                &appt.appointment_date,
                filter.date_from.as_ref(),
                filter.date_to.as_ref(),
            ) {
                return false;
            }
            if let Some(purpose) = &filter.purpose {
                if !purpose_matches(&appt.purpose, purpose) {
                    return false;
                }
            }
            if let Some(status) = &filter.status {
                if appt.status != *status {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

pub fn filter_logs(logs: &[ActivityLog], filter: &LogFilter) -> Vec<ActivityLog> {
    logs.iter()
        .filter(|log| {
            if let Some(action) = &filter.action {
                if log.action != *action {
                    return false;
                }
            }
            if let Some(actor_id) = &filter.actor_id {
                if log.actor_id != *actor_id {
                    return false;
                }
            }
            within_range(
                &log.created_at,
                filter.date_from.as_ref(),
                filter.date_to.as_ref(),
            )
        })
        .cloned()
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A purpose filter ending in ':' matches any purpose under that
/// category prefix; otherwise the match is exact.
fn purpose_matches(purpose: &str, filter: &str) -> bool {
    if filter.ends_with(':') {
        purpose.starts_with(filter)
    } else {
        purpose == filter
    }
}

/// Inclusive date-range check: `date_to` covers its whole day.
fn within_range(
    instant: &NaiveDateTime,
    from: Option<&NaiveDate>,
    to: Option<&NaiveDate>,
) -> bool {
    if let Some(from) = from {
        if instant.date() < *from {
            return false;
        }
    }
    if let Some(to) = to {
        if instant.date() > *to {
            return false;
        }
    }
    true
}
