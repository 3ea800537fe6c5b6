//! Terminal rendering
//!
//! Features:
//! - Coloured event log (phase changes, reps, form feedback, pose loss)
//! - Form feedback shown only when the set of correction kinds changes
//! - End-of-session summary
//! - `--json` mode: one JSON object per line instead

use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use rep_coach::form::{CorrectionKind, FormGrade};
use rep_coach::{Session, SessionEvent, SessionSummary};
use std::error::Error;
use std::io::{stdout, Write};

/// Event and summary renderer
pub struct Display {
    json: bool,
    /// Corrections from the last feedback line shown
    last_corrections: Option<Vec<CorrectionKind>>,
}

fn grade_color(grade: FormGrade) -> Color {
    match grade {
        FormGrade::Excellent => Color::Green,
        FormGrade::Good => Color::Yellow,
        FormGrade::NeedsWork => Color::Red,
    }
}

impl Display {
    pub fn new(json: bool) -> Self {
        Display {
            json,
            last_corrections: None,
        }
    }

    pub fn show_header(&self, session: &Session) -> Result<(), Box<dyn Error>> {
        if self.json {
            return Ok(());
        }
        let exercise = session.exercise();
        let mut stdout = stdout();
        execute!(
            stdout,
            SetForegroundColor(Color::Cyan),
            Print(format!("{} ({})", exercise.name, exercise.id)),
            ResetColor,
            Print(format!(
                "  |  {}  |  {} scorer\n",
                exercise.category.as_str(),
                session.scorer_name()
            )),
            SetForegroundColor(Color::Blue),
            Print("─".repeat(50)),
            Print("\n"),
            ResetColor
        )?;
        stdout.flush()?;
        Ok(())
    }

    pub fn show_event(&mut self, event: &SessionEvent) -> Result<(), Box<dyn Error>> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
            return Ok(());
        }

        let mut stdout = stdout();
        match event {
            SessionEvent::PhaseChanged { from, to, timestamp } => {
                execute!(
                    stdout,
                    SetForegroundColor(Color::DarkGrey),
                    Print(format!("{:>8.2}s  {} → {}\n", timestamp, from, to)),
                    ResetColor
                )?;
            }
            SessionEvent::RepCompleted { count, timestamp } => {
                execute!(
                    stdout,
                    Print(format!("{:>8.2}s  ", timestamp)),
                    SetForegroundColor(Color::Green),
                    Print(format!("Rep {}\n", count)),
                    ResetColor
                )?;
            }
            SessionEvent::FormFeedback(feedback) => {
                let kinds: Vec<CorrectionKind> = feedback.corrections.iter().map(|c| c.kind).collect();
                if self.last_corrections.as_ref() == Some(&kinds) {
                    return Ok(());
                }
                self.last_corrections = Some(kinds);

                execute!(
                    stdout,
                    Print("           Form: "),
                    SetForegroundColor(grade_color(feedback.grade)),
                    Print(format!("{:.0}% ({})", feedback.score * 100.0, feedback.grade.as_str())),
                    ResetColor,
                    Print("\n")
                )?;
                for correction in &feedback.corrections {
                    execute!(
                        stdout,
                        SetForegroundColor(Color::Yellow),
                        Print(format!("             • {}\n", correction.message)),
                        ResetColor
                    )?;
                }
            }
            SessionEvent::TrackingLost { timestamp, gap_secs } => {
                execute!(
                    stdout,
                    Print(format!("{:>8.2}s  ", timestamp)),
                    SetForegroundColor(Color::Red),
                    Print(format!("Pose lost for {:.1}s, tracking reset\n", gap_secs)),
                    ResetColor
                )?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    pub fn show_summary(&self, summary: &SessionSummary) -> Result<(), Box<dyn Error>> {
        if self.json {
            println!("{}", serde_json::json!({ "event": "summary", "summary": summary }));
            return Ok(());
        }

        let mut stdout = stdout();
        let form = &summary.form;
        execute!(
            stdout,
            SetForegroundColor(Color::Blue),
            Print("─".repeat(50)),
            Print("\n"),
            ResetColor,
            SetForegroundColor(Color::Magenta),
            Print("Reps: "),
            ResetColor,
            Print(format!(
                "{}  |  Time: {:.1}s  |  Transitions: {}\n",
                summary.rep_count, summary.duration_secs, summary.transitions
            )),
            SetForegroundColor(Color::Magenta),
            Print("Form: "),
            SetForegroundColor(grade_color(FormGrade::from_score(form.mean_score))),
            Print(format!("{:.0}% average", form.mean_score * 100.0)),
            ResetColor,
            Print(format!(
                "  |  recent {:.0}%{}\n",
                form.ema_score * 100.0,
                if form.declining { "  |  declining" } else { "" }
            )),
            SetForegroundColor(Color::Magenta),
            Print("Frames: "),
            ResetColor,
            Print(format!(
                "{} processed, {} without pose, {} dropped, {} slow\n",
                summary.frames.processed, summary.frames.gap, summary.frames.dropped, summary.frames.slow
            ))
        )?;

        if !summary.top_corrections.is_empty() {
            execute!(
                stdout,
                SetForegroundColor(Color::Magenta),
                Print("Most frequent corrections:\n"),
                ResetColor
            )?;
            for (correction, count) in &summary.top_corrections {
                let color = if summary.persistent_corrections.contains(correction) {
                    Color::Red
                } else {
                    Color::Yellow
                };
                execute!(
                    stdout,
                    SetForegroundColor(color),
                    Print(format!("  {:>3}× {}\n", count, correction)),
                    ResetColor
                )?;
            }
        }

        stdout.flush()?;
        Ok(())
    }
}
