use uuid::Uuid;

use crate::models::question::Question;

/// Scores a quiz submission against the question answer key. Pure logic,
/// no persistence: callers load the questions and store the outcome.
pub struct GradingService;

#[derive(Debug, Clone)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub selected_answer: String,
}

#[derive(Debug, Clone)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub selected_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone)]
pub struct GradedSubmission {
    pub score: i32,
    pub grade: String,
    pub passed: bool,
    pub answers: Vec<GradedAnswer>,
}

pub const PASSING_SCORE: i32 = 60;

impl GradingService {
    /// One graded entry per submitted answer. An answer that names no known
    /// question is kept and marked incorrect rather than failing the attempt;
    /// a question with no submitted answer simply contributes nothing correct.
    pub fn grade_submission(
        questions: &[Question],
        answers: &[SubmittedAnswer],
    ) -> GradedSubmission {
        let graded: Vec<GradedAnswer> = answers
            .iter()
            .map(|answer| {
                let question = questions.iter().find(|q| q.id == answer.question_id);
                let is_correct =
                    matches!(question, Some(q) if q.correct_answer == answer.selected_answer);
                GradedAnswer {
                    question_id: answer.question_id,
                    selected_answer: answer.selected_answer.clone(),
                    is_correct,
                }
            })
            .collect();

        let correct = graded.iter().filter(|a| a.is_correct).count();
        let score = Self::score(correct, questions.len());

        GradedSubmission {
            score,
            grade: Self::letter_grade(score).to_string(),
            passed: score >= PASSING_SCORE,
            answers: graded,
        }
    }

    pub fn score(correct: usize, total: usize) -> i32 {
        if total == 0 {
            return 0;
        }
        ((correct as f64 / total as f64) * 100.0).round() as i32
    }

    pub fn letter_grade(score: i32) -> &'static str {
        if score >= 90 {
            "A"
        } else if score >= 75 {
            "B"
        } else if score >= 60 {
            "C"
        } else {
            "F"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn question(correct: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            quiz_id: Uuid::new_v4(),
            text: "?".to_string(),
            option_a: "a".to_string(),
            option_b: "b".to_string(),
            option_c: "c".to_string(),
            option_d: "d".to_string(),
            correct_answer: correct.to_string(),
            explanation: None,
            position: 1,
            created_at: Utc::now(),
        }
    }

    fn answer(question_id: Uuid, selected: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id,
            selected_answer: selected.to_string(),
        }
    }

    #[test]
    fn zero_questions_scores_zero() {
        let graded = GradingService::grade_submission(&[], &[]);
        assert_eq!(graded.score, 0);
        assert_eq!(graded.grade, "F");
        assert!(!graded.passed);
        assert!(graded.answers.is_empty());
    }

    #[test]
    fn all_correct_scores_hundred() {
        let questions = vec![question("A"), question("C")];
        let answers = vec![
            answer(questions[0].id, "A"),
            answer(questions[1].id, "C"),
        ];
        let graded = GradingService::grade_submission(&questions, &answers);
        assert_eq!(graded.score, 100);
        assert_eq!(graded.grade, "A");
        assert!(graded.passed);
        assert!(graded.answers.iter().all(|a| a.is_correct));
    }

    #[test]
    fn three_of_five_is_a_passing_c() {
        let questions: Vec<Question> = (0..5).map(|_| question("B")).collect();
        let answers: Vec<SubmittedAnswer> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| answer(q.id, if i < 3 { "B" } else { "D" }))
            .collect();
        let graded = GradingService::grade_submission(&questions, &answers);
        assert_eq!(graded.score, 60);
        assert_eq!(graded.grade, "C");
        assert!(graded.passed);
    }

    #[test]
    fn score_rounds_half_up() {
        // 2 of 3 correct is 66.67, rounded to 67.
        assert_eq!(GradingService::score(2, 3), 67);
        // 1 of 3 correct is 33.33, rounded to 33.
        assert_eq!(GradingService::score(1, 3), 33);
        assert_eq!(GradingService::score(1, 2), 50);
    }

    #[test]
    fn grade_banding_boundaries() {
        assert_eq!(GradingService::letter_grade(100), "A");
        assert_eq!(GradingService::letter_grade(90), "A");
        assert_eq!(GradingService::letter_grade(89), "B");
        assert_eq!(GradingService::letter_grade(75), "B");
        assert_eq!(GradingService::letter_grade(74), "C");
        assert_eq!(GradingService::letter_grade(60), "C");
        assert_eq!(GradingService::letter_grade(59), "F");
        assert_eq!(GradingService::letter_grade(0), "F");
    }

    #[test]
    fn fifty_nine_fails_sixty_passes() {
        // 10 of 17 rounds to 59, the highest failing score band.
        assert_eq!(GradingService::score(10, 17), 59);
        assert_eq!(GradingService::letter_grade(59), "F");
        assert_eq!(GradingService::score(3, 5), 60);
        assert_eq!(GradingService::letter_grade(60), "C");
    }

    #[test]
    fn empty_selection_never_matches() {
        let questions = vec![question("A")];
        let answers = vec![answer(questions[0].id, "")];
        let graded = GradingService::grade_submission(&questions, &answers);
        assert_eq!(graded.score, 0);
        assert!(!graded.answers[0].is_correct);
    }

    #[test]
    fn unknown_question_id_is_incorrect_not_an_error() {
        let questions = vec![question("A")];
        let answers = vec![answer(Uuid::new_v4(), "A"), answer(questions[0].id, "A")];
        let graded = GradingService::grade_submission(&questions, &answers);
        assert_eq!(graded.answers.len(), 2);
        assert!(!graded.answers[0].is_correct);
        assert!(graded.answers[1].is_correct);
        assert_eq!(graded.score, 100);
    }

    #[test]
    fn unanswered_questions_count_against_score() {
        let questions = vec![question("A"), question("B"), question("C"), question("D")];
        let answers = vec![answer(questions[0].id, "A")];
        let graded = GradingService::grade_submission(&questions, &answers);
        assert_eq!(graded.score, 25);
        assert_eq!(graded.grade, "F");
        assert!(!graded.passed);
    }
}
