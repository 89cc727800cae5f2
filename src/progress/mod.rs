//! Question sequencing for a single player.
//!
//! The controller is a pure decision function: it receives the player's
//! progress and the question being addressed, and answers with an
//! [`Outcome`] plus the list of [`Mutation`]s the caller must persist. It
//! performs no I/O and keeps no state between calls.

pub mod redemption;

use thiserror::Error;

use self::redemption::RedemptionCodeGenerator;

/// Order every freshly registered player starts at.
pub const FIRST_ORDER: u32 = 1;

/// Role attached to a player profile; assigned out-of-band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Regular participant.
    #[default]
    Player,
    /// Allowed to author questions and inspect players.
    Admin,
}

/// Progress record of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProgress {
    /// Opaque identity issued by the identity collaborator.
    pub identity: String,
    /// Name chosen at registration.
    pub display_name: String,
    /// Order of the question the player is currently working on.
    pub current_question_order: u32,
    /// Player or admin.
    pub role: Role,
}

impl UserProgress {
    /// Progress of a player who just registered.
    pub fn registered(identity: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            display_name: display_name.into(),
            current_question_order: FIRST_ORDER,
            role: Role::Player,
        }
    }
}

/// A question of the hunt, as seen by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// Position in the sequence (unique, ascending).
    pub order: u32,
    /// Text shown to the player.
    pub question_text: String,
    /// Expected answer; compared trimmed and case-insensitively.
    pub answer: String,
    /// Clue revealed after a correct answer.
    pub correct_response_text: String,
    /// When present, advancing past this question requires this code.
    pub unlock_code: Option<String>,
    /// A correct answer to this question wins the game.
    pub is_last_question: bool,
}

/// Result of looking up the question a player should see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The question matching the player's current order.
    Question(&'a Question),
    /// No question carries the player's order: the bank is exhausted.
    GameComplete,
}

/// Decision reached for a single answer or unlock-code submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Wrong answer or code; the player stays where they are.
    Incorrect,
    /// The player moves on to `next_order`.
    Advanced {
        /// Order of the next question.
        next_order: u32,
    },
    /// Answer accepted, but the unlock code must be submitted to advance.
    AwaitingUnlock {
        /// Order of the answered question.
        order: u32,
        /// Code expected by [`ProgressController::submit_unlock_code`].
        unlock_code: String,
    },
    /// Last question answered; the game is over.
    GameWon {
        /// Freshly generated prize code.
        redemption_code: String,
    },
}

/// Change the caller must apply to the progress document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Set `current_question_order` of `identity` to `order`.
    AdvanceTo {
        /// Player whose progress changes.
        identity: String,
        /// New value of the progress cursor.
        order: u32,
    },
}

/// Outcome together with the mutations it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// What happened.
    pub outcome: Outcome,
    /// What the caller has to persist before presenting the next step.
    pub mutations: Vec<Mutation>,
}

impl Decision {
    fn incorrect() -> Self {
        Self {
            outcome: Outcome::Incorrect,
            mutations: Vec::new(),
        }
    }

    fn advanced(identity: &str, next_order: u32) -> Self {
        Self {
            outcome: Outcome::Advanced { next_order },
            mutations: vec![Mutation::AdvanceTo {
                identity: identity.to_owned(),
                order: next_order,
            }],
        }
    }

    fn without_mutation(outcome: Outcome) -> Self {
        Self {
            outcome,
            mutations: Vec::new(),
        }
    }
}

/// Submission the controller refuses to decide on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgressError {
    /// Advancing past `order` would leave the representable range.
    #[error("question {order} is the highest possible order; cannot advance past it")]
    OrderOverflow {
        /// Order of the question that was answered.
        order: u32,
    },
    /// The submission refers to `submitted` while the player is at `current`.
    #[error("question {submitted} is not addressable; player is at question {current}")]
    NotAddressable {
        /// Order carried by the submission.
        submitted: u32,
        /// Order stored in the player's progress.
        current: u32,
    },
}

/// Stateless progress state machine.
#[derive(Debug, Clone, Default)]
pub struct ProgressController {
    codes: RedemptionCodeGenerator,
}

impl ProgressController {
    /// Build a controller issuing redemption codes through `codes`.
    pub fn new(codes: RedemptionCodeGenerator) -> Self {
        Self { codes }
    }

    /// Generator used for winning submissions.
    pub fn codes(&self) -> &RedemptionCodeGenerator {
        &self.codes
    }

    /// Select the question whose order equals the player's current order.
    pub fn resolve_current_question<'a, I>(
        &self,
        progress: &UserProgress,
        questions: I,
    ) -> Resolution<'a>
    where
        I: IntoIterator<Item = &'a Question>,
    {
        questions
            .into_iter()
            .find(|question| question.order == progress.current_question_order)
            .map_or(Resolution::GameComplete, Resolution::Question)
    }

    /// Check an answer to the question the player is currently on.
    pub fn submit_answer(
        &self,
        progress: &UserProgress,
        question: &Question,
        submitted: &str,
    ) -> Result<Decision, ProgressError> {
        ensure_addressable(progress, question.order)?;

        if !texts_match(submitted, &question.answer) {
            return Ok(Decision::incorrect());
        }

        if question.is_last_question {
            return Ok(Decision::without_mutation(Outcome::GameWon {
                redemption_code: self.codes.generate(),
            }));
        }

        match &question.unlock_code {
            None => Ok(Decision::advanced(
                &progress.identity,
                next_order(question.order)?,
            )),
            Some(code) => Ok(Decision::without_mutation(Outcome::AwaitingUnlock {
                order: question.order,
                unlock_code: code.clone(),
            })),
        }
    }

    /// Check the unlock code for a question whose answer was already accepted.
    pub fn submit_unlock_code(
        &self,
        progress: &UserProgress,
        pending_order: u32,
        expected_code: &str,
        submitted_code: &str,
    ) -> Result<Decision, ProgressError> {
        ensure_addressable(progress, pending_order)?;

        if texts_match(submitted_code, expected_code) {
            Ok(Decision::advanced(
                &progress.identity,
                next_order(pending_order)?,
            ))
        } else {
            Ok(Decision::incorrect())
        }
    }
}

fn ensure_addressable(progress: &UserProgress, order: u32) -> Result<(), ProgressError> {
    if order == progress.current_question_order {
        Ok(())
    } else {
        Err(ProgressError::NotAddressable {
            submitted: order,
            current: progress.current_question_order,
        })
    }
}

fn next_order(order: u32) -> Result<u32, ProgressError> {
    order
        .checked_add(1)
        .ok_or(ProgressError::OrderOverflow { order })
}

/// Compare player input with a stored secret, ignoring case and surrounding whitespace.
pub fn texts_match(submitted: &str, expected: &str) -> bool {
    submitted.trim().to_lowercase() == expected.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(order: u32) -> UserProgress {
        UserProgress {
            current_question_order: order,
            ..UserProgress::registered("player-1", "Ada")
        }
    }

    fn question(order: u32, answer: &str, unlock_code: Option<&str>) -> Question {
        Question {
            order,
            question_text: format!("question {order}"),
            answer: answer.into(),
            correct_response_text: format!("clue after {order}"),
            unlock_code: unlock_code.map(Into::into),
            is_last_question: false,
        }
    }

    fn advance_mutation(order: u32) -> Vec<Mutation> {
        vec![Mutation::AdvanceTo {
            identity: "player-1".into(),
            order,
        }]
    }

    #[test]
    fn registered_player_starts_at_first_question() {
        let progress = UserProgress::registered("abc", "Ada");
        assert_eq!(progress.current_question_order, FIRST_ORDER);
        assert_eq!(progress.role, Role::Player);
    }

    #[test]
    fn resolve_picks_question_matching_current_order() {
        let controller = ProgressController::default();
        let bank = vec![
            question(2, "rock", None),
            question(1, "tree", None),
            question(3, "lake", None),
        ];

        match controller.resolve_current_question(&player_at(2), &bank) {
            Resolution::Question(q) => assert_eq!(q.answer, "rock"),
            other => panic!("expected question 2, got {other:?}"),
        }
    }

    #[test]
    fn resolve_reports_completion_when_order_is_missing() {
        let controller = ProgressController::default();
        let bank = vec![question(1, "tree", None), question(2, "rock", None)];

        assert_eq!(
            controller.resolve_current_question(&player_at(3), &bank),
            Resolution::GameComplete
        );
    }

    #[test]
    fn resolve_on_empty_bank_is_complete() {
        let controller = ProgressController::default();
        let bank: Vec<Question> = Vec::new();
        assert_eq!(
            controller.resolve_current_question(&player_at(1), &bank),
            Resolution::GameComplete
        );
    }

    #[test]
    fn trimmed_and_cased_answer_advances() {
        let controller = ProgressController::default();
        let decision = controller
            .submit_answer(&player_at(1), &question(1, "tree", None), "Tree ")
            .unwrap();

        assert_eq!(decision.outcome, Outcome::Advanced { next_order: 2 });
        assert_eq!(decision.mutations, advance_mutation(2));
    }

    #[test]
    fn every_case_and_whitespace_variant_is_accepted() {
        let controller = ProgressController::default();
        let q = question(4, " Old Oak ", None);
        let variants = [
            "old oak",
            "OLD OAK",
            "  Old Oak",
            "old oak\t",
            "\n oLD oAK \n",
        ];

        for variant in variants {
            let decision = controller.submit_answer(&player_at(4), &q, variant).unwrap();
            assert_ne!(
                decision.outcome,
                Outcome::Incorrect,
                "variant {variant:?} was rejected"
            );
        }
    }

    #[test]
    fn wrong_answer_is_incorrect_without_mutation() {
        let controller = ProgressController::default();
        let decision = controller
            .submit_answer(&player_at(1), &question(1, "tree", None), "bush")
            .unwrap();

        assert_eq!(decision.outcome, Outcome::Incorrect);
        assert!(decision.mutations.is_empty());
    }

    #[test]
    fn inner_whitespace_is_significant() {
        let controller = ProgressController::default();
        let decision = controller
            .submit_answer(&player_at(1), &question(1, "old oak", None), "oldoak")
            .unwrap();
        assert_eq!(decision.outcome, Outcome::Incorrect);
    }

    #[test]
    fn answer_with_unlock_code_waits_then_unlocks() {
        let controller = ProgressController::default();
        let progress = player_at(2);
        let q = question(2, "rock", Some("ABC123"));

        let decision = controller.submit_answer(&progress, &q, "rock").unwrap();
        assert_eq!(
            decision.outcome,
            Outcome::AwaitingUnlock {
                order: 2,
                unlock_code: "ABC123".into()
            }
        );
        assert!(decision.mutations.is_empty());

        let unlocked = controller
            .submit_unlock_code(&progress, 2, "ABC123", "abc123")
            .unwrap();
        assert_eq!(unlocked.outcome, Outcome::Advanced { next_order: 3 });
        assert_eq!(unlocked.mutations, advance_mutation(3));
    }

    #[test]
    fn wrong_unlock_code_keeps_player_waiting() {
        let controller = ProgressController::default();
        let decision = controller
            .submit_unlock_code(&player_at(2), 2, "ABC123", "ABC124")
            .unwrap();

        assert_eq!(decision.outcome, Outcome::Incorrect);
        assert!(decision.mutations.is_empty());
    }

    #[test]
    fn unlock_code_comparison_trims_input() {
        let controller = ProgressController::default();
        let decision = controller
            .submit_unlock_code(&player_at(7), 7, "qr-7", "  QR-7 ")
            .unwrap();
        assert_eq!(decision.outcome, Outcome::Advanced { next_order: 8 });
    }

    #[test]
    fn last_question_wins_with_redemption_code() {
        let controller = ProgressController::new(RedemptionCodeGenerator::new("DEVFEST-"));
        let q = Question {
            is_last_question: true,
            ..question(5, "key", None)
        };

        let decision = controller.submit_answer(&player_at(5), &q, "KEY").unwrap();
        match decision.outcome {
            Outcome::GameWon { redemption_code } => {
                assert!(controller.codes().matches_shape(&redemption_code));
                assert!(redemption_code.starts_with("DEVFEST-"));
            }
            other => panic!("expected a win, got {other:?}"),
        }
        assert!(decision.mutations.is_empty());
    }

    #[test]
    fn last_question_ignores_unlock_code() {
        let controller = ProgressController::default();
        let q = Question {
            is_last_question: true,
            ..question(5, "key", Some("FINAL"))
        };

        let decision = controller.submit_answer(&player_at(5), &q, "key").unwrap();
        assert!(matches!(decision.outcome, Outcome::GameWon { .. }));
    }

    #[test]
    fn each_win_issues_a_fresh_code() {
        let controller = ProgressController::default();
        let q = Question {
            is_last_question: true,
            ..question(1, "key", None)
        };

        let first = controller.submit_answer(&player_at(1), &q, "key").unwrap();
        let second = controller.submit_answer(&player_at(1), &q, "key").unwrap();
        assert_ne!(first.outcome, second.outcome);
    }

    #[test]
    fn answer_for_another_question_is_rejected() {
        let controller = ProgressController::default();
        let err = controller
            .submit_answer(&player_at(3), &question(4, "tree", None), "tree")
            .unwrap_err();

        assert_eq!(
            err,
            ProgressError::NotAddressable {
                submitted: 4,
                current: 3
            }
        );
    }

    #[test]
    fn highest_order_cannot_advance() {
        let controller = ProgressController::default();
        let progress = player_at(u32::MAX);

        let plain = question(u32::MAX, "a", None);
        assert_eq!(
            controller.submit_answer(&progress, &plain, "a"),
            Err(ProgressError::OrderOverflow { order: u32::MAX })
        );

        let gated = question(u32::MAX, "a", Some("x"));
        let decision = controller.submit_answer(&progress, &gated, "a").unwrap();
        assert!(matches!(decision.outcome, Outcome::AwaitingUnlock { .. }));
        assert_eq!(
            controller.submit_unlock_code(&progress, u32::MAX, "x", "x"),
            Err(ProgressError::OrderOverflow { order: u32::MAX })
        );

        let wrong = controller
            .submit_unlock_code(&progress, u32::MAX, "x", "y")
            .unwrap();
        assert_eq!(wrong.outcome, Outcome::Incorrect);
    }

    #[test]
    fn stale_unlock_does_not_advance_twice() {
        let controller = ProgressController::default();
        // The first unlock already moved the player from 2 to 3.
        let err = controller
            .submit_unlock_code(&player_at(3), 2, "ABC123", "ABC123")
            .unwrap_err();
        assert!(matches!(err, ProgressError::NotAddressable { .. }));
    }

    #[test]
    fn never_advances_more_than_one_step() {
        let controller = ProgressController::default();
        for order in 1..50 {
            let progress = player_at(order);
            let decision = controller
                .submit_answer(&progress, &question(order, "x", None), "x")
                .unwrap();
            for Mutation::AdvanceTo { order: next, .. } in decision.mutations {
                assert_eq!(next, order + 1);
            }

            let decision = controller
                .submit_unlock_code(&progress, order, "c", "C")
                .unwrap();
            assert_eq!(
                decision.outcome,
                Outcome::Advanced {
                    next_order: order + 1
                }
            );
        }
    }
}
