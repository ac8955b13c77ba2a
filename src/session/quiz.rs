use crate::profile::{Difficulty, MissionDraft};

/// In-memory tally of one play session: answer counts, the running
/// in-session streak, and the net score. Board-style scoring — a wrong
/// answer subtracts the clue's value, so the net score can go negative.
#[derive(Clone, Debug)]
pub struct QuizSession {
    difficulty: Difficulty,
    correct: u32,
    total: u32,
    streak: u32,
    max_streak: u32,
    score: i64,
}

impl QuizSession {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            correct: 0,
            total: 0,
            streak: 0,
            max_streak: 0,
            score: 0,
        }
    }

    pub fn record_answer(&mut self, correct: bool, value: i64) {
        self.total += 1;
        if correct {
            self.correct += 1;
            self.streak += 1;
            self.max_streak = self.max_streak.max(self.streak);
            self.score += value;
        } else {
            self.streak = 0;
            self.score -= value;
        }
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn answered(&self) -> u32 {
        self.total
    }

    pub fn finish(self) -> MissionDraft {
        MissionDraft {
            score: self.score,
            difficulty: self.difficulty,
            efficiency: efficiency(self.correct, self.total),
            max_streak: self.max_streak,
        }
    }
}

/// Percentage of correct answers, rounded; 0 for an empty session.
pub fn efficiency(correct: u32, total: u32) -> u8 {
    if total == 0 {
        0
    } else {
        (f64::from(correct) / f64::from(total) * 100.0).round() as u8
    }
}
