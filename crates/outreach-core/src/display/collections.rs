//! Collection wrapper types for displaying groups of domain objects.

use std::{fmt, ops::Index};

use crate::models::{Lead, SequenceSummary};

/// Newtype wrapper for displaying a sequence listing.
///
/// # Examples
///
/// ```rust
/// use outreach_core::display::SequenceSummaries;
///
/// let empty = SequenceSummaries(vec![]);
/// assert_eq!(empty.to_string(), "No sequences found.\n");
/// ```
pub struct SequenceSummaries(pub Vec<SequenceSummary>);

impl SequenceSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceSummary> {
        self.0.iter()
    }
}

impl Index<usize> for SequenceSummaries {
    type Output = SequenceSummary;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for SequenceSummaries {
    type Item = SequenceSummary;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SequenceSummaries {
    type Item = &'a SequenceSummary;
    type IntoIter = std::slice::Iter<'a, SequenceSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for SequenceSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No sequences found.")
        } else {
            for summary in &self.0 {
                write!(f, "{summary}")?;
            }
            Ok(())
        }
    }
}

/// Newtype wrapper for displaying a lead listing.
pub struct Leads(pub Vec<Lead>);

impl Leads {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lead> {
        self.0.iter()
    }
}

impl Index<usize> for Leads {
    type Output = Lead;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for Leads {
    type Item = Lead;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for Leads {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No leads found.");
        }
        for lead in &self.0 {
            write!(f, "- **{}** (ID: {}) {}", lead.display_name(), lead.id, lead.email)?;
            if let Some(company) = &lead.company {
                write!(f, ", {company}")?;
            }
            writeln!(f, " [{}]", lead.status)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::models::{LeadStatus, SequenceStatus, SequenceType};

    fn summary(id: u64, lead_name: &str) -> SequenceSummary {
        SequenceSummary {
            id,
            lead_id: 1,
            lead_name: lead_name.into(),
            company: Some("Initech".into()),
            sequence_type: SequenceType::Standard,
            status: SequenceStatus::Active,
            current_step: 2,
            total_steps: 5,
            completed_steps: 1,
            created_at: Timestamp::from_second(1_640_995_200).unwrap(),
        }
    }

    #[test]
    fn test_sequence_summaries_display() {
        let output = SequenceSummaries(vec![summary(1, "Peter Gibbons"), summary(2, "Milton")])
            .to_string();
        assert!(output.contains("Peter Gibbons"));
        assert!(output.contains("Milton"));
        assert!(output.contains("(1/5)"));
        assert!(!output.starts_with("# "));
    }

    #[test]
    fn test_leads_display() {
        assert_eq!(Leads(vec![]).to_string(), "No leads found.\n");

        let lead = Lead {
            id: 4,
            email: "peter@initech.com".into(),
            first_name: Some("Peter".into()),
            last_name: None,
            company: Some("Initech".into()),
            title: None,
            industry: None,
            company_size: None,
            linkedin_url: None,
            website: None,
            status: LeadStatus::Contacted,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        };
        let output = Leads(vec![lead]).to_string();
        assert_eq!(
            output,
            "- **Peter** (ID: 4) peter@initech.com, Initech [contacted]\n"
        );
    }
}
