use std::collections::BTreeSet;

use quiz_core::model::{AnswerId, ProgressSettings, Question, QuizId};
use services::{SessionLoopService, StudySession};
use tokio::io::{AsyncBufReadExt, BufReader};

const RECENT_SHOWN: usize = 10;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Select(BTreeSet<AnswerId>),
    Reset,
    Finish,
    Quit,
    Invalid(String),
}

/// Interpret one line against the answers as they are displayed (1-based).
fn parse_input(line: &str, question: &Question) -> Input {
    match line.trim() {
        "q" | "quit" => return Input::Quit,
        "r" | "reset" => return Input::Reset,
        "f" | "finish" => return Input::Finish,
        _ => {}
    }

    let mut selected = BTreeSet::new();
    for token in line.split([',', ' ']).filter(|t| !t.trim().is_empty()) {
        let Ok(number) = token.trim().parse::<usize>() else {
            return Input::Invalid(format!("not a number: {token}"));
        };
        let Some(answer) = number.checked_sub(1).and_then(|i| question.answers.get(i)) else {
            return Input::Invalid(format!("no answer {number}"));
        };
        selected.insert(answer.id.clone());
    }
    if selected.is_empty() {
        return Input::Invalid("pick at least one answer".into());
    }
    if !question.multiple && selected.len() > 1 {
        return Input::Invalid("this question takes a single answer".into());
    }
    Input::Select(selected)
}

fn render(question: &Question) {
    println!();
    println!("{}", question.body);
    if question.multiple {
        println!("(select all that apply, e.g. 1,3)");
    }
    for (i, answer) in question.answers.iter().enumerate() {
        println!("  {}. {}", i + 1, answer.body);
    }
}

/// Run the question loop on stdin until the quiz is mastered or the user quits.
pub async fn run(
    service: &SessionLoopService,
    quiz_id: &QuizId,
    settings: &ProgressSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut study = service.start_session(quiz_id).await?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let question = match study.current_question() {
            Some(question) => question.clone(),
            None => match service.next_question(&mut study, settings).await? {
                Some(question) => question,
                None => {
                    println!("All questions mastered.");
                    service.finish_session(&mut study).await?;
                    return Ok(());
                }
            },
        };
        render(&question);

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        match parse_input(&line, &question) {
            Input::Select(selected) => {
                let result = service.submit_answer(&mut study, selected, settings).await?;
                report(&study, &question, result.event.was_correct());
            }
            Input::Reset => {
                service.reset_session(&mut study).await?;
                println!("Progress reset.");
            }
            Input::Finish => {
                service.finish_session(&mut study).await?;
                println!("Session finished.");
                return Ok(());
            }
            Input::Quit => return Ok(()),
            Input::Invalid(reason) => println!("{reason}"),
        }
    }
}

fn report(study: &StudySession, question: &Question, correct: bool) {
    if correct {
        println!("Correct!");
    } else {
        let expected: Vec<&str> = question
            .answers
            .iter()
            .filter(|a| a.is_correct)
            .map(|a| a.body.as_str())
            .collect();
        println!("Wrong. Correct: {}", expected.join(", "));
    }
    if let Some(explanation) = &question.explanation {
        println!("{explanation}");
    }
    let streak: String = study
        .recent(RECENT_SHOWN)
        .iter()
        .map(|e| if e.was_correct() { '+' } else { '-' })
        .collect();
    println!("recent: {streak}");
}
