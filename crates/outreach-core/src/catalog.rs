//! Template catalog: the fixed step layout of each sequence type.

use jiff::{SignedDuration, Timestamp};

use crate::{
    error::{OutreachError, Result},
    models::{SequenceType, StepKind, StepStatus},
};

/// One entry of a catalog sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBlueprint {
    /// Position in the sequence (1-based)
    pub step_number: u32,
    pub step_type: StepKind,
    /// Days after sequence creation the step becomes due
    pub delay_days: u32,
    pub template_key: &'static str,
}

impl StepBlueprint {
    const fn new(
        step_number: u32,
        step_type: StepKind,
        delay_days: u32,
        template_key: &'static str,
    ) -> Self {
        Self {
            step_number,
            step_type,
            delay_days,
            template_key,
        }
    }

    /// Absolute due time for a sequence created at `created_at`.
    pub fn scheduled_at(&self, created_at: Timestamp) -> Result<Timestamp> {
        let delay = SignedDuration::from_hours(i64::from(self.delay_days) * 24);
        created_at.checked_add(delay).map_err(|e| {
            OutreachError::invalid_input("delay_days")
                .with_reason(format!("Cannot schedule step {}: {e}", self.step_number))
        })
    }

    /// Step 1 is runnable as soon as the sequence exists.
    pub fn initial_status(&self) -> StepStatus {
        if self.step_number == 1 {
            StepStatus::Ready
        } else {
            StepStatus::Pending
        }
    }
}

const STANDARD: [StepBlueprint; 5] = [
    StepBlueprint::new(1, StepKind::Email, 0, "initial_outreach"),
    StepBlueprint::new(2, StepKind::FollowUp, 3, "follow_up_1"),
    StepBlueprint::new(3, StepKind::LinkedIn, 7, "linkedin_connection"),
    StepBlueprint::new(4, StepKind::Call, 10, "call_script"),
    StepBlueprint::new(5, StepKind::FinalFollowUp, 14, "final_email"),
];

const ENTERPRISE: [StepBlueprint; 5] = [
    StepBlueprint::new(1, StepKind::Research, 0, "company_research"),
    StepBlueprint::new(2, StepKind::Email, 1, "enterprise_initial"),
    StepBlueprint::new(3, StepKind::Call, 4, "discovery_call"),
    StepBlueprint::new(4, StepKind::FollowUp, 7, "proposal_follow_up"),
    StepBlueprint::new(5, StepKind::Meeting, 14, "demo_request"),
];

const QUICK_TOUCH: [StepBlueprint; 3] = [
    StepBlueprint::new(1, StepKind::Email, 0, "quick_intro"),
    StepBlueprint::new(2, StepKind::LinkedIn, 2, "linkedin_touch"),
    StepBlueprint::new(3, StepKind::FinalFollowUp, 5, "final_touch"),
];

impl SequenceType {
    /// Ordered step blueprints for this sequence type.
    pub fn blueprints(&self) -> &'static [StepBlueprint] {
        match self {
            SequenceType::Standard => &STANDARD,
            SequenceType::Enterprise => &ENTERPRISE,
            SequenceType::QuickTouch => &QUICK_TOUCH,
        }
    }

    pub fn total_steps(&self) -> u32 {
        self.blueprints().len() as u32
    }
}

/// Resolve a catalog key, defaulting to `standard` when none is given.
///
/// Unknown keys are rejected rather than silently mapped to `standard`.
pub fn resolve(name: Option<&str>) -> Result<SequenceType> {
    match name {
        None => Ok(SequenceType::default()),
        Some(name) => name
            .parse::<SequenceType>()
            .map_err(|_| OutreachError::UnknownSequenceType {
                name: name.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(SequenceType::Standard.total_steps(), 5);
        assert_eq!(SequenceType::Enterprise.total_steps(), 5);
        assert_eq!(SequenceType::QuickTouch.total_steps(), 3);
    }

    #[test]
    fn test_blueprints_are_numbered_and_delays_nondecreasing() {
        for sequence_type in SequenceType::ALL {
            let blueprints = sequence_type.blueprints();
            for (index, blueprint) in blueprints.iter().enumerate() {
                assert_eq!(blueprint.step_number as usize, index + 1);
            }
            for pair in blueprints.windows(2) {
                assert!(pair[0].delay_days <= pair[1].delay_days);
            }
            assert_eq!(blueprints[0].delay_days, 0, "{sequence_type:?}");
        }
    }

    #[test]
    fn test_only_first_step_starts_ready() {
        let statuses: Vec<_> = SequenceType::Standard
            .blueprints()
            .iter()
            .map(StepBlueprint::initial_status)
            .collect();
        assert_eq!(statuses[0], StepStatus::Ready);
        assert!(statuses[1..].iter().all(|s| *s == StepStatus::Pending));
    }

    #[test]
    fn test_scheduled_at_adds_whole_days() {
        let created = Timestamp::from_second(1_760_000_000).unwrap();
        let blueprint = SequenceType::QuickTouch.blueprints()[2];
        let due = blueprint.scheduled_at(created).unwrap();
        assert_eq!(due.as_second() - created.as_second(), 5 * 24 * 3600);
    }

    #[test]
    fn test_resolve_defaults_and_rejects_unknown() {
        assert_eq!(resolve(None).unwrap(), SequenceType::Standard);
        assert_eq!(
            resolve(Some("quick_touch")).unwrap(),
            SequenceType::QuickTouch
        );
        match resolve(Some("drip")) {
            Err(OutreachError::UnknownSequenceType { name }) => assert_eq!(name, "drip"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
