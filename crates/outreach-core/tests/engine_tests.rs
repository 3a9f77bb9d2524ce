mod common;

use std::time::Duration;

use common::{add_test_lead, create_test_engine, create_test_engine_with, second_engine, ScriptedGenerator};
use jiff::Timestamp;
use outreach_core::{
    models::{ContentRecord, GeneratedContent, MessageFormat, NewMessage, StepResult, StepKind},
    params::{CreateSequence, Id, ListSequences, UpdateLeadStatus},
    Database, ExecutionOutcome, OutreachError, SequenceStatus, SequenceType, StepStatus,
};

fn create_params(lead_id: u64, sequence_type: Option<&str>) -> CreateSequence {
    CreateSequence {
        lead_id,
        sequence_type: sequence_type.map(String::from),
    }
}

#[tokio::test]
async fn test_create_sequence_shape_for_every_type() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "shape@example.com").await;

    for sequence_type in SequenceType::ALL {
        let created = env
            .engine
            .create_outreach_sequence(&create_params(lead.id, Some(sequence_type.as_str())))
            .await
            .expect("Failed to create sequence");
        assert_eq!(created.total_steps, sequence_type.total_steps());

        let sequence = env
            .engine
            .get_sequence(&Id { id: created.sequence_id })
            .await
            .expect("Failed to get sequence")
            .expect("Sequence should exist");

        assert_eq!(sequence.status, SequenceStatus::Active);
        assert_eq!(sequence.current_step, 1);
        assert_eq!(sequence.steps.len() as u32, created.total_steps);

        let created_at = sequence.created_at;
        for (index, (step, blueprint)) in sequence
            .steps
            .iter()
            .zip(sequence_type.blueprints())
            .enumerate()
        {
            assert_eq!(step.step_number as usize, index + 1);
            assert_eq!(step.step_type, blueprint.step_type);
            assert_eq!(step.template_key, blueprint.template_key);
            let expected = if index == 0 {
                StepStatus::Ready
            } else {
                StepStatus::Pending
            };
            assert_eq!(step.status, expected);
            let delay = step.scheduled_at.as_millisecond() - created_at.as_millisecond();
            assert_eq!(delay, i64::from(blueprint.delay_days) * 24 * 3600 * 1000);
        }
    }
}

#[tokio::test]
async fn test_quick_touch_creation() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "quick@example.com").await;

    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, Some("quick_touch")))
        .await
        .expect("Failed to create sequence");
    assert_eq!(created.total_steps, 3);

    let sequence = env
        .engine
        .get_sequence(&Id { id: created.sequence_id })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sequence.steps[0].status, StepStatus::Ready);
}

#[tokio::test]
async fn test_create_sequence_validation() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "validate@example.com").await;

    let missing = env
        .engine
        .create_outreach_sequence(&create_params(9999, None))
        .await;
    assert!(matches!(missing, Err(OutreachError::LeadNotFound { id: 9999 })));

    let unknown = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, Some("drip")))
        .await;
    assert!(matches!(unknown, Err(OutreachError::UnknownSequenceType { .. })));

    let default = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, None))
        .await
        .expect("Default type should be accepted");
    assert_eq!(default.total_steps, 5);

    // A lead may hold several active sequences at once
    let listed = env
        .engine
        .lead_sequences(&Id { id: lead.id })
        .await
        .expect("Failed to list lead sequences");
    assert_eq!(listed.len(), 1);
    env.engine
        .create_outreach_sequence(&create_params(lead.id, Some("enterprise")))
        .await
        .expect("Second active sequence should be allowed");
}

#[tokio::test]
async fn test_quick_touch_runs_to_completion() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "complete@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, Some("quick_touch")))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    let first = env.engine.execute_next_step(&id).await.unwrap();
    match first {
        ExecutionOutcome::StepCompleted {
            step_number,
            step_type,
            result: StepResult::Message(content),
        } => {
            assert_eq!(step_number, 1);
            assert_eq!(step_type, StepKind::Email);
            assert_eq!(content.subject.as_deref(), Some("About quick_intro"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    env.clock.advance_days(2);
    let second = env.engine.execute_next_step(&id).await.unwrap();
    assert_eq!(second.status(), "step_completed");

    env.clock.advance_days(3);
    let third = env.engine.execute_next_step(&id).await.unwrap();
    assert!(matches!(
        third,
        ExecutionOutcome::StepCompleted { step_number: 3, .. }
    ));

    let fourth = env.engine.execute_next_step(&id).await.unwrap();
    assert_eq!(fourth, ExecutionOutcome::SequenceCompleted);

    let sequence = env.engine.get_sequence(&id).await.unwrap().unwrap();
    assert_eq!(sequence.status, SequenceStatus::Completed);
    assert!(sequence.completed_at.is_some());
    assert_eq!(sequence.completed_steps(), 3);

    let after = env.engine.execute_next_step(&id).await;
    assert!(matches!(after, Err(OutreachError::InvalidState { .. })));
}

#[tokio::test]
async fn test_pending_step_yields_no_ready_steps() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "pending@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, None))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    env.engine.execute_next_step(&id).await.unwrap();
    let before = env.engine.get_sequence(&id).await.unwrap().unwrap();
    let calls = env.generator.calls();

    let outcome = env.engine.execute_next_step(&id).await.unwrap();
    assert_eq!(outcome, ExecutionOutcome::NoReadySteps);

    let after = env.engine.get_sequence(&id).await.unwrap().unwrap();
    assert_eq!(before, after);
    assert_eq!(after.current_step, 2);
    assert_eq!(after.steps[1].status, StepStatus::Pending);
    assert_eq!(env.generator.calls(), calls);
}

#[tokio::test]
async fn test_generation_failure_leaves_step_ready() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "failure@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, None))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    env.engine.execute_next_step(&id).await.unwrap();
    env.clock.advance_days(3);
    env.generator.set_failing(true);

    let failed = env.engine.execute_next_step(&id).await.unwrap();
    match &failed {
        ExecutionOutcome::StepFailed { step_number, error } => {
            assert_eq!(*step_number, 2);
            assert!(error.contains("timed out"), "{error}");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let sequence = env.engine.get_sequence(&id).await.unwrap().unwrap();
    assert_eq!(sequence.current_step, 2);
    assert_eq!(sequence.steps[1].status, StepStatus::Ready);
    assert!(sequence.steps[1].result.is_none());
    let messages = env.engine.lead_messages(&Id { id: lead.id }).await.unwrap();
    assert_eq!(messages.len(), 1, "failed step must not store a message");

    env.generator.set_failing(false);
    let retried = env.engine.execute_next_step(&id).await.unwrap();
    assert!(matches!(
        retried,
        ExecutionOutcome::StepCompleted { step_number: 2, .. }
    ));
}

#[tokio::test]
async fn test_termination_for_every_type() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "terminate@example.com").await;

    for sequence_type in SequenceType::ALL {
        let created = env
            .engine
            .create_outreach_sequence(&create_params(lead.id, Some(sequence_type.as_str())))
            .await
            .unwrap();
        let id = Id { id: created.sequence_id };

        let mut completed = 0;
        loop {
            // Jump far enough that every remaining step is due
            env.clock.advance_days(30);
            match env.engine.execute_next_step(&id).await.unwrap() {
                ExecutionOutcome::StepCompleted { step_number, .. } => {
                    completed += 1;
                    assert_eq!(step_number, completed);
                }
                ExecutionOutcome::SequenceCompleted => break,
                other => panic!("unexpected outcome for {sequence_type:?}: {other:?}"),
            }
            assert!(completed <= created.total_steps);
        }
        assert_eq!(completed, created.total_steps);
    }
}

#[tokio::test]
async fn test_steps_complete_in_order() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "order@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, Some("standard")))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    for _ in 0..6 {
        env.clock.advance_days(4);
        env.engine.execute_next_step(&id).await.unwrap();

        let sequence = env.engine.get_sequence(&id).await.unwrap().unwrap();
        for pair in sequence.steps.windows(2) {
            if pair[1].status != StepStatus::Pending {
                assert_eq!(pair[0].status, StepStatus::Completed);
            }
        }
        let completed_at: Vec<_> = sequence
            .steps
            .iter()
            .filter_map(|step| step.completed_at)
            .collect();
        assert!(completed_at.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[tokio::test]
async fn test_concurrent_execution_completes_step_once() {
    let env = create_test_engine_with(ScriptedGenerator::with_delay(Duration::from_millis(50))).await;
    let lead = add_test_lead(&env.engine, "race@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, None))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    let (a, b) = tokio::join!(
        env.engine.execute_next_step(&id),
        env.engine.execute_next_step(&id)
    );
    let mut statuses = vec![a.unwrap().status(), b.unwrap().status()];
    statuses.sort_unstable();
    assert_eq!(statuses, vec!["no_ready_steps", "step_completed"]);

    let messages = env.engine.lead_messages(&Id { id: lead.id }).await.unwrap();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_concurrent_engines_complete_step_once() {
    let env = create_test_engine_with(ScriptedGenerator::with_delay(Duration::from_millis(50))).await;
    let other = second_engine(&env).await;
    let lead = add_test_lead(&env.engine, "race2@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, None))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    let (a, b) = tokio::join!(env.engine.execute_next_step(&id), other.execute_next_step(&id));
    let outcomes = [a.unwrap(), b.unwrap()];
    let completions = outcomes
        .iter()
        .filter(|o| matches!(o, ExecutionOutcome::StepCompleted { .. }))
        .count();
    assert_eq!(completions, 1);
    assert!(outcomes.contains(&ExecutionOutcome::NoReadySteps));

    let sequence = env.engine.get_sequence(&id).await.unwrap().unwrap();
    assert_eq!(sequence.current_step, 2);
    assert_eq!(sequence.completed_steps(), 1);
    let messages = env.engine.lead_messages(&Id { id: lead.id }).await.unwrap();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_execute_missing_sequence() {
    let env = create_test_engine().await;
    let result = env.engine.execute_next_step(&Id { id: 42 }).await;
    assert!(matches!(result, Err(OutreachError::SequenceNotFound { id: 42 })));
}

#[tokio::test]
async fn test_research_feeds_later_messages() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "research@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, Some("enterprise")))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    match env.engine.execute_next_step(&id).await.unwrap() {
        ExecutionOutcome::StepCompleted {
            step_type: StepKind::Research,
            result: StepResult::Research(findings),
            ..
        } => assert_eq!(findings.pain_points, vec!["Scaling Acme".to_string()]),
        other => panic!("unexpected outcome: {other:?}"),
    }

    env.clock.advance_days(1);
    env.engine.execute_next_step(&id).await.unwrap();

    let request = env.generator.last_request().expect("email was generated");
    assert_eq!(request.template_key, "enterprise_initial");
    let insights = request
        .context
        .research_insights
        .expect("research should be in context");
    assert_eq!(insights.pain_points, vec!["Scaling Acme".to_string()]);
}

#[tokio::test]
async fn test_meeting_step_generates_email() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "meeting@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, Some("enterprise")))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    let mut last = None;
    for _ in 0..5 {
        env.clock.advance_days(14);
        last = Some(env.engine.execute_next_step(&id).await.unwrap());
    }
    match last {
        Some(ExecutionOutcome::StepCompleted {
            step_number: 5,
            step_type: StepKind::Meeting,
            result: StepResult::Message(content),
        }) => assert_eq!(content.subject.as_deref(), Some("About demo_request")),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_analytics_with_no_completed_sequences() {
    let env = create_test_engine().await;

    let empty = env.engine.get_sequence_analytics().await.unwrap();
    assert_eq!(empty.total_sequences, 0);
    assert_eq!(empty.conversion_rate, 0.0);

    let lead = add_test_lead(&env.engine, "analytics@example.com").await;
    env.engine
        .create_outreach_sequence(&create_params(lead.id, None))
        .await
        .unwrap();
    let analytics = env.engine.get_sequence_analytics().await.unwrap();
    assert_eq!(analytics.total_sequences, 1);
    assert_eq!(analytics.active_sequences, 1);
    assert_eq!(analytics.completed_sequences, 0);
    assert_eq!(analytics.conversion_rate, 0.0);
}

#[tokio::test]
async fn test_analytics_conversion_rate() {
    let env = create_test_engine().await;
    let won = add_test_lead(&env.engine, "won@example.com").await;
    let lost = add_test_lead(&env.engine, "lost@example.com").await;
    let active = add_test_lead(&env.engine, "active@example.com").await;

    for lead in [&won, &lost] {
        let created = env
            .engine
            .create_outreach_sequence(&create_params(lead.id, Some("quick_touch")))
            .await
            .unwrap();
        let id = Id { id: created.sequence_id };
        loop {
            env.clock.advance_days(10);
            if env.engine.execute_next_step(&id).await.unwrap() == ExecutionOutcome::SequenceCompleted {
                break;
            }
        }
    }
    env.engine
        .create_outreach_sequence(&create_params(active.id, None))
        .await
        .unwrap();

    for (lead, status) in [(&won, "won"), (&lost, "lost")] {
        env.engine
            .update_lead_status(&UpdateLeadStatus {
                id: lead.id,
                status: status.into(),
            })
            .await
            .unwrap()
            .expect("lead exists");
    }

    let analytics = env.engine.get_sequence_analytics().await.unwrap();
    assert_eq!(analytics.total_sequences, 3);
    assert_eq!(analytics.active_sequences, 1);
    assert_eq!(analytics.completed_sequences, 2);
    assert_eq!(analytics.conversion_rate, 50.0);

    let completed = env
        .engine
        .list_sequences(&ListSequences {
            status: Some("completed".into()),
        })
        .await
        .unwrap();
    assert_eq!(completed.len(), 2);
    assert!(completed.iter().all(|s| s.completed_steps == 3));
}

#[tokio::test]
async fn test_deleting_lead_removes_sequences() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "delete@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, None))
        .await
        .unwrap();
    env.engine
        .execute_next_step(&Id { id: created.sequence_id })
        .await
        .unwrap();

    assert!(env.engine.delete_lead(&Id { id: lead.id }).await.unwrap());
    assert!(!env.engine.delete_lead(&Id { id: lead.id }).await.unwrap());

    let sequence = env
        .engine
        .get_sequence(&Id { id: created.sequence_id })
        .await
        .unwrap();
    assert!(sequence.is_none());
    let messages = env.engine.lead_messages(&Id { id: lead.id }).await.unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_step_completed_outside_engine_still_progresses() {
    let env = create_test_engine().await;
    let lead = add_test_lead(&env.engine, "outside@example.com").await;
    let created = env
        .engine
        .create_outreach_sequence(&create_params(lead.id, Some("quick_touch")))
        .await
        .unwrap();
    let id = Id { id: created.sequence_id };

    // Another process completes step 1 directly against the store
    {
        let mut db = Database::new(&env.db_path).expect("Failed to open database");
        let step = db
            .get_ready_step(created.sequence_id, 1)
            .unwrap()
            .expect("Step 1 should be ready");
        let content = GeneratedContent {
            subject: Some("Hello".into()),
            content: "Hi".into(),
            ..Default::default()
        };
        let record = ContentRecord::Message {
            message: NewMessage {
                lead_id: lead.id,
                kind: MessageFormat::Email,
                subject: content.subject.clone(),
                content: content.content.clone(),
                personalization_notes: Vec::new(),
                generation_note: "Generated quick_intro message".into(),
            },
            activity: None,
        };
        db.complete_step(step.id, &record, &StepResult::Message(content), Timestamp::now())
            .unwrap();
    }

    env.clock.advance_days(30);
    let mut outcomes = Vec::new();
    for _ in 0..5 {
        let outcome = env.engine.execute_next_step(&id).await.unwrap();
        let done = outcome == ExecutionOutcome::SequenceCompleted;
        outcomes.push(outcome.status());
        if done {
            break;
        }
    }
    assert_eq!(
        outcomes,
        ["step_completed", "step_completed", "sequence_completed"]
    );

    let sequence = env.engine.get_sequence(&id).await.unwrap().unwrap();
    assert_eq!(sequence.status, SequenceStatus::Completed);
    assert!(sequence
        .steps
        .iter()
        .all(|step| step.status == StepStatus::Completed));
}
