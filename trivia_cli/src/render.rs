//! Plain-text rendering of session state.
//!
//! Every function returns a `String` so the binary stays a thin I/O loop.

use std::fmt::Write;
use trivia_engine::{
    GameResult, HelpKind, HelpOutcome, Question, SessionSnapshot, game::entities::option_letter,
};

/// The visible question with its options and the session status line
pub fn question(snapshot: &SessionSnapshot) -> String {
    let Some(question) = snapshot.current_question() else {
        return String::from("No question is visible.\n");
    };
    let state = &snapshot.state;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "\nQuestion {}/{} [{} · {}]",
        state.current_question_index() + 1,
        state.questions().len(),
        question.category(),
        question.difficulty()
    );
    let _ = writeln!(out, "{}", question.prompt());

    for (index, option) in (0u8..).zip(question.options().iter()) {
        if snapshot.eliminated.contains(&index) {
            let _ = writeln!(out, "  {}) --", option_letter(index));
        } else {
            let _ = writeln!(out, "  {}) {}", option_letter(index), option);
        }
    }

    out.push_str(&status_line(snapshot));
    out
}

/// Score, lives, time left, and remaining helps
pub fn status_line(snapshot: &SessionSnapshot) -> String {
    let state = &snapshot.state;
    let helps: Vec<String> = HelpKind::ALL
        .into_iter()
        .filter(|kind| state.helps().is_available(*kind))
        .map(|kind| kind.to_string())
        .collect();
    let helps = if helps.is_empty() {
        "none".to_string()
    } else {
        helps.join(", ")
    };

    format!(
        "Score {} | Lives {} | {}s left | Helps: {}\n",
        state.score(),
        "♥".repeat(usize::from(state.lives())),
        snapshot.remaining_secs,
        helps
    )
}

/// The correct option of `question`, shown during the reveal
pub fn reveal(question: &Question) -> String {
    let correct = question.correct_answer();
    let text = question
        .options()
        .get(usize::from(correct))
        .map(String::as_str)
        .unwrap_or_default();
    format!("Correct answer: {}) {}\n", option_letter(correct), text)
}

/// Reveal for the question at `index`, which may no longer be the visible one
pub fn reveal_at(snapshot: &SessionSnapshot, index: usize) -> Option<String> {
    snapshot.state.questions().get(index).map(reveal)
}

pub fn help_outcome(outcome: &HelpOutcome) -> String {
    match outcome {
        HelpOutcome::Eliminated([first, second]) => format!(
            "50/50: options {} and {} were removed\n",
            option_letter(*first),
            option_letter(*second)
        ),
        HelpOutcome::Skip => "Skipping this question\n".to_string(),
        HelpOutcome::Hint(text) => format!("Hint: {text}\n"),
    }
}

/// Final summary with per-question review
pub fn result_summary(result: &GameResult, questions: &[Question]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== {} ===", result.tier);
    let _ = writeln!(out, "{}", result.tier.feedback());
    let _ = writeln!(out, "Score:     {}", result.score);
    let _ = writeln!(
        out,
        "Correct:   {}/{} ({:.0}%)",
        result.correct_answers, result.total_questions, result.accuracy
    );
    let _ = writeln!(out, "Time:      {}s total", result.total_time_secs);
    let _ = writeln!(
        out,
        "Average:   {:.1}s per question",
        result.average_time_per_question
    );

    let helps = result.helps_used();
    if !helps.is_empty() {
        let names: Vec<String> = helps.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "Helps:     {}", names.join(", "));
    }

    let review = result.review(questions);
    if !review.is_empty() {
        let _ = writeln!(out, "\nReview:");
    }
    for row in review {
        let mark = if row.is_correct { "✓" } else { "✗" };
        let help = row
            .help_used
            .map(|kind| format!(" [{kind}]"))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "  {mark} {}. {} ({}) - answered {}, correct {}, {}s{help}",
            row.position,
            row.prompt,
            row.category,
            row.choice,
            option_letter(row.correct_option),
            row.time_spent
        );
    }
    out
}

/// Pool listing for the `list` subcommand
pub fn question_list(questions: &[Question]) -> String {
    if questions.is_empty() {
        return "The question pool is empty.\n".to_string();
    }

    let mut out = String::new();
    for question in questions {
        let _ = writeln!(
            out,
            "{}  [{} · {}] {}",
            question.id(),
            question.category(),
            question.difficulty(),
            question.prompt()
        );
        for (index, option) in (0u8..).zip(question.options().iter()) {
            let marker = if index == question.correct_answer() {
                "*"
            } else {
                " "
            };
            let _ = writeln!(out, "   {marker}{}) {option}", option_letter(index));
        }
    }
    let _ = writeln!(out, "{} questions", questions.len());
    out
}
