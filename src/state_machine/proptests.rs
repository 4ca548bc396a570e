//! Property-based tests for the state machine
//!
//! Random interleavings of host events and service results, including results
//! for requests that were superseded long ago.

use super::effect::Operation;
use super::state::Generation;
use super::transition::{transition, TransitionError};
use super::*;
use crate::chat_service::{ChatResponse, StartConsultationResponse};
use crate::language::Language;
use crate::transcript::Message;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Initialize(Language),
    Submit(String),
    Input(String),
    /// Deliver a result for one of the requests issued so far
    Resolve {
        pick: usize,
        ok: bool,
        with_conversation: bool,
    },
}

fn arb_language() -> impl Strategy<Value = Language> {
    prop_oneof![
        Just(Language::Slovak),
        Just(Language::English),
        Just(Language::German),
        Just(Language::Spanish),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), Just("  ".to_string()), "[a-z ]{1,12}"]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => arb_language().prop_map(Step::Initialize),
        2 => arb_text().prop_map(Step::Submit),
        1 => arb_text().prop_map(Step::Input),
        3 => (any::<usize>(), any::<bool>(), any::<bool>()).prop_map(|(pick, ok, with_conversation)| {
            Step::Resolve { pick, ok, with_conversation }
        }),
    ]
}

fn result_event(
    generation: Generation,
    operation: Operation,
    ok: bool,
    with_conversation: bool,
) -> Event {
    let conversation = with_conversation.then(|| {
        vec![
            Message::assistant(format!("reply {generation}")),
            Message::user("echo"),
        ]
    });
    match (operation, ok) {
        (Operation::Initialize, true) => Event::SessionStarted {
            generation,
            response: StartConsultationResponse { conversation },
        },
        (Operation::Initialize, false) => Event::SessionStartFailed {
            generation,
            error: "unreachable".to_string(),
        },
        (Operation::Submit, true) => Event::ChatReplied {
            generation,
            response: ChatResponse {
                conversation,
                reply: None,
            },
        },
        (Operation::Submit, false) => Event::ChatFailed {
            generation,
            error: "HTTP 500".to_string(),
        },
    }
}

fn requests_in(effects: &[Effect]) -> Vec<(Generation, Operation)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::StartSession { generation, .. } => Some((*generation, Operation::Initialize)),
            Effect::SendChat { generation, .. } => Some((*generation, Operation::Submit)),
            _ => None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn prop_session_invariants_hold(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut state = ConversationState::default();
        let mut issued: Vec<(Generation, Operation)> = Vec::new();

        for step in steps {
            let event = match &step {
                Step::Initialize(language) => Event::Initialize { language: *language },
                Step::Submit(text) => Event::Submit { text: text.clone() },
                Step::Input(text) => Event::InputChanged { text: text.clone() },
                Step::Resolve { pick, ok, with_conversation } => {
                    if issued.is_empty() {
                        continue;
                    }
                    let (generation, operation) = issued[pick % issued.len()];
                    result_event(generation, operation, *ok, *with_conversation)
                }
            };
            let is_result = event.generation().is_some();

            match transition(&state, event.clone()) {
                Ok(result) => {
                    let next = result.new_state;

                    // Generations never go backwards
                    prop_assert!(next.generation >= state.generation);
                    // Loading mirrors the phase
                    prop_assert_eq!(next.is_loading(), next.phase.in_flight().is_some());

                    let requests = requests_in(&result.effects);
                    prop_assert!(requests.len() <= 1, "more than one request per transition");
                    for (generation, operation) in requests {
                        prop_assert!(issued.iter().all(|(g, _)| *g < generation));
                        prop_assert_eq!(next.phase.in_flight(), Some(generation));
                        issued.push((generation, operation));
                    }

                    // Settled results always release loading
                    if is_result {
                        prop_assert!(!next.is_loading());
                    }

                    match &event {
                        Event::Submit { text } if !text.trim().is_empty() => {
                            prop_assert_eq!(next.transcript.len(), state.transcript.len() + 1);
                            prop_assert_eq!(next.transcript.last(), Some(&Message::user(text.clone())));
                            let optimistic = &next.transcript;
                            match &result.effects[..] {
                                [Effect::SendChat { request, .. }] => {
                                    prop_assert_eq!(&request.conversation, optimistic);
                                    prop_assert_eq!(&request.input, text);
                                }
                                other => prop_assert!(false, "unexpected effects {:?}", other),
                            }
                        }
                        Event::Submit { .. } => {
                            prop_assert_eq!(&next, &state);
                            prop_assert!(result.effects.is_empty());
                        }
                        Event::ChatFailed { .. } => {
                            // The user's turn is never rolled back
                            prop_assert_eq!(&next.transcript, &state.transcript);
                            prop_assert_eq!(&next.pending_input, &state.pending_input);
                        }
                        Event::SessionStartFailed { .. } => {
                            prop_assert!(next.transcript.is_empty());
                        }
                        _ => {}
                    }

                    state = next;
                }
                Err(TransitionError::Busy) => {
                    prop_assert!(state.is_loading());
                    let is_submit = matches!(event, Event::Submit { .. });
                    prop_assert!(is_submit, "only submissions are refused as busy");
                }
                Err(TransitionError::StaleResult(generation)) => {
                    prop_assert!(is_result);
                    prop_assert!(!state.is_current(generation));
                }
            }
        }
    }

    #[test]
    fn prop_latest_initialize_wins(
        languages in proptest::collection::vec(arb_language(), 2..6),
        resolve_order in proptest::collection::vec(any::<usize>(), 0..8),
    ) {
        let mut state = ConversationState::default();
        let mut generations = Vec::new();

        for language in &languages {
            state = transition(&state, Event::Initialize { language: *language }).unwrap().new_state;
            generations.push(state.generation);
        }
        let latest = *generations.last().unwrap();

        // Older sessions resolve in arbitrary order and are all refused
        for pick in resolve_order {
            let generation = generations[pick % (generations.len() - 1)];
            let event = result_event(generation, Operation::Initialize, true, true);
            prop_assert_eq!(
                transition(&state, event).unwrap_err(),
                TransitionError::StaleResult(generation)
            );
        }

        let settled = transition(&state, result_event(latest, Operation::Initialize, true, true))
            .unwrap()
            .new_state;
        prop_assert!(!settled.is_loading());
        prop_assert_eq!(settled.language, *languages.last().unwrap());
        let expected = format!("reply {latest}");
        prop_assert_eq!(settled.transcript[0].content(), expected.as_str());
    }
}
