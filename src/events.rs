//! This module reads the text event files of the command-line driver
//!
//! Each non-blank line describes one particle, as whitespace-separated
//! `event_number weight pt eta phi e` fields (momenta in MeV). Consecutive
//! lines sharing an event number belong to the same event. A line holding
//! only `event_number weight` declares an event without particles. Anything
//! after a `#` is a comment.

use crate::{
    numeric::Float,
    particle::{EventInfo, IParticle, RecoParticle},
    Result,
};

use eyre::{bail, ensure, WrapErr};

use std::{fs, path::Path};

/// Storage for one event read from an event file
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Event metadata
    pub info: EventInfo,

    /// Event weight
    pub weight: Float,

    /// Particles, sorted by decreasing transverse momentum
    pub particles: Vec<RecoParticle>,
}
//
impl Event {
    /// Create an event without particles
    fn new(event_number: u64, weight: Float) -> Self {
        Self {
            info: EventInfo { event_number },
            weight,
            particles: Vec::new(),
        }
    }

    /// Order particles by decreasing pT, so that index 0 is the leading one
    fn sort_by_pt(&mut self) {
        self.particles.sort_by(|a, b| b.pt().total_cmp(&a.pt()));
    }
}

/// Read every event from an event file
pub fn load_events(file_name: impl AsRef<Path>) -> Result<Vec<Event>> {
    let file_name = file_name.as_ref();
    let text = fs::read_to_string(file_name)
        .wrap_err_with(|| format!("Failed to read {}", file_name.display()))?;
    parse_events(&text).wrap_err_with(|| format!("Invalid event file {}", file_name.display()))
}

/// Decode events from the contents of an event file
pub fn parse_events(text: &str) -> Result<Vec<Event>> {
    let mut events: Vec<Event> = Vec::new();
    for (line_idx, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default();
        let fields = content.split_whitespace().collect::<Vec<_>>();
        if fields.is_empty() {
            continue;
        }
        let line_no = line_idx + 1;

        let event_number = fields[0]
            .parse::<u64>()
            .wrap_err_with(|| format!("Bad event number on line {}", line_no))?;
        let numbers = fields[1..]
            .iter()
            .map(|field| field.parse::<Float>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .wrap_err_with(|| format!("Bad number on line {}", line_no))?;
        let weight = numbers.first().copied().unwrap_or(1.);

        // Start a new event whenever the event number changes
        match events.last() {
            Some(event) if event.info.event_number == event_number => {
                ensure!(
                    event.weight == weight,
                    "Event {} changes weight on line {}",
                    event_number,
                    line_no
                );
            }
            _ => events.push(Event::new(event_number, weight)),
        }

        match numbers[..] {
            [] | [_] => {}
            [_, pt, eta, phi, e] => {
                if let Some(event) = events.last_mut() {
                    event.particles.push(RecoParticle::new(pt, eta, phi, e));
                }
            }
            _ => bail!(
                "Expected 1, 2 or 6 fields on line {}, found {}",
                line_no,
                fields.len()
            ),
        }
    }

    for event in &mut events {
        event.sort_by_pt();
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_and_sort() {
        let events = parse_events(
            "# event weight pt eta phi e\n\
             0\n\
             1 0.5 40000 0.1 0.2 50000\n\
             1 0.5 90000 -1.0 3.0 200000 # leading\n\
             \n\
             2 1.0\n\
             3 2.0 10000 0 0 10000\n",
        )
        .unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], Event::new(0, 1.));
        assert_eq!(events[1].info.event_number, 1);
        assert_eq!(events[1].weight, 0.5);
        let pts = events[1]
            .particles
            .iter()
            .map(|part| part.pt())
            .collect::<Vec<_>>();
        assert_eq!(pts, vec![90000., 40000.]);
        assert!(events[2].particles.is_empty());
        assert_eq!(events[3].weight, 2.);
    }

    #[test]
    fn malformed_lines() {
        assert!(parse_events("x 1.0\n").is_err());
        let err = parse_events("1 1.0 2 3\n").unwrap_err();
        assert_eq!(err.to_string(), "Expected 1, 2 or 6 fields on line 1, found 4");
        assert!(parse_events("1 1.0 10 0 0 abc\n").is_err());
        assert!(parse_events("1 1.0 10 0 0 10\n1 2.0 10 0 0 10\n").is_err());
    }
}
