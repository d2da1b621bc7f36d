use crate::models::question::AnswerKey;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: Uuid,
    pub selected_answer: Option<String>,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub correct_count: usize,
    pub total_questions: usize,
    pub answers: Vec<GradedAnswer>,
}

impl Grade {
    /// Percentage rounded half up; `None` when there is nothing to divide by.
    pub fn score(&self) -> Option<i32> {
        score_percent(self.correct_count, self.total_questions)
    }
}

pub struct GradingService;

impl GradingService {
    /// Grades every question in `key`. Submitted entries are keyed by the
    /// question id's string form; missing, null and empty entries count as
    /// unanswered, and keys for other questions are ignored. Only a string
    /// can match; any other JSON value is kept in its text form and is wrong.
    pub fn grade(key: &[AnswerKey], submitted: &HashMap<String, JsonValue>) -> Grade {
        let mut correct_count = 0;
        let mut answers = Vec::with_capacity(key.len());

        for question in key {
            let value = submitted.get(&question.id.to_string());
            let selected_answer = value.and_then(selection);

            let is_correct = matches!(value, Some(JsonValue::String(s)) if *s == question.correct_answer);
            if is_correct {
                correct_count += 1;
            }

            answers.push(GradedAnswer {
                question_id: question.id,
                selected_answer,
                is_correct,
            });
        }

        Grade {
            correct_count,
            total_questions: key.len(),
            answers,
        }
    }

    pub fn passed(score: i32, passing_score: i32) -> bool {
        score >= passing_score
    }
}

fn selection(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub fn score_percent(correct: usize, total: usize) -> Option<i32> {
    if total == 0 {
        return None;
    }
    let correct = correct.min(total) as i64;
    let total = total as i64;
    // round(100 * c / t) with halves going up, in integers
    Some(((200 * correct + total) / (2 * total)) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(letters: &[&str]) -> Vec<AnswerKey> {
        letters
            .iter()
            .map(|l| AnswerKey {
                id: Uuid::new_v4(),
                correct_answer: l.to_string(),
            })
            .collect()
    }

    #[test]
    fn mixed_submission_scores_half() {
        let key = key(&["A", "B", "C", "D"]);
        let mut submitted = HashMap::new();
        submitted.insert(key[0].id.to_string(), json!("A"));
        submitted.insert(key[1].id.to_string(), json!("B"));
        submitted.insert(key[2].id.to_string(), json!("X"));

        let grade = GradingService::grade(&key, &submitted);

        assert_eq!(grade.correct_count, 2);
        assert_eq!(grade.total_questions, 4);
        assert_eq!(grade.score(), Some(50));
        let flags: Vec<bool> = grade.answers.iter().map(|a| a.is_correct).collect();
        assert_eq!(flags, vec![true, true, false, false]);
        assert_eq!(grade.answers[2].selected_answer.as_deref(), Some("X"));
        assert_eq!(grade.answers[3].selected_answer, None);
    }

    #[test]
    fn letters_match_case_sensitively() {
        let key = key(&["A"]);
        let mut submitted = HashMap::new();
        submitted.insert(key[0].id.to_string(), json!("a"));
        let grade = GradingService::grade(&key, &submitted);
        assert_eq!(grade.correct_count, 0);
        assert!(!grade.answers[0].is_correct);
    }

    #[test]
    fn null_and_empty_entries_are_unanswered() {
        let key = key(&["A", "B"]);
        let mut submitted = HashMap::new();
        submitted.insert(key[0].id.to_string(), JsonValue::Null);
        submitted.insert(key[1].id.to_string(), json!(""));
        let grade = GradingService::grade(&key, &submitted);
        assert!(grade.answers.iter().all(|a| a.selected_answer.is_none() && !a.is_correct));
    }

    #[test]
    fn non_string_values_are_recorded_as_wrong() {
        let key = key(&["A", "B", "C"]);
        let mut submitted = HashMap::new();
        submitted.insert(key[0].id.to_string(), json!(1));
        submitted.insert(key[1].id.to_string(), json!(true));
        submitted.insert(key[2].id.to_string(), json!(["C"]));

        let grade = GradingService::grade(&key, &submitted);

        assert_eq!(grade.correct_count, 0);
        assert_eq!(grade.score(), Some(0));
        let selected: Vec<Option<&str>> = grade
            .answers
            .iter()
            .map(|a| a.selected_answer.as_deref())
            .collect();
        assert_eq!(selected, vec![Some("1"), Some("true"), Some("[\"C\"]")]);
    }

    #[test]
    fn foreign_keys_are_ignored() {
        let key = key(&["C"]);
        let mut submitted = HashMap::new();
        submitted.insert("not-a-question".to_string(), json!("C"));
        submitted.insert(Uuid::new_v4().to_string(), json!("C"));
        submitted.insert(key[0].id.to_string(), json!("C"));
        let grade = GradingService::grade(&key, &submitted);
        assert_eq!(grade.answers.len(), 1);
        assert_eq!(grade.score(), Some(100));
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(score_percent(1, 8), Some(13));
        assert_eq!(score_percent(1, 3), Some(33));
        assert_eq!(score_percent(2, 3), Some(67));
        assert_eq!(score_percent(0, 5), Some(0));
        assert_eq!(score_percent(5, 5), Some(100));
    }

    #[test]
    fn zero_questions_has_no_score() {
        assert_eq!(score_percent(0, 0), None);
        assert_eq!(GradingService::grade(&[], &HashMap::new()).score(), None);
    }

    #[test]
    fn passing_threshold_is_inclusive() {
        assert!(GradingService::passed(70, 70));
        assert!(!GradingService::passed(69, 70));
        assert!(GradingService::passed(0, 0));
    }
}
