//! Lecture command handlers.

use tabled::Tabled;

use trackademia_core::selection::today;
use trackademia_core::{Lecture, LecturePatch, Services};

use crate::cli::{GlobalOpts, LecturesArgs, LecturesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct LectureRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Topics")]
    topics: String,
}

impl From<&Lecture> for LectureRow {
    fn from(l: &Lecture) -> Self {
        Self {
            id: l.id.to_string(),
            date: l.date.to_string(),
            topics: l
                .topics
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn detail(l: &Lecture, color: bool) -> String {
    let mut lines = vec![
        output::heading(&l.date.format("%A, %B %-d, %Y").to_string(), color),
        format!("  id:    {}", l.id),
        format!("  book:  {}", l.book_id),
    ];
    for topic in &l.topics {
        lines.push(String::new());
        lines.push(format!(
            "  {} [{}]",
            topic.name,
            output::difficulty(topic.difficulty, color)
        ));
        lines.push(format!("    {}", topic.explanation));
    }
    lines.join("\n")
}

fn print_lecture(lecture: &Lecture, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        lecture,
        |l| detail(l, color),
        |l| l.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    services: &Services,
    args: LecturesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let library = services.library()?;

    match args.command {
        LecturesCommand::List { book } => {
            let lectures = library.lectures(&util::record_id(&book)).await?;
            let out = output::render_list(
                &global.output,
                &lectures,
                |l| LectureRow::from(l),
                |l| l.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LecturesCommand::Today { book } => {
            let board = library
                .lecture_board(&util::record_id(&book), today())
                .await?;
            match board.active() {
                Some(lecture) => print_lecture(lecture, global),
                None => output::notice(
                    &format!(
                        "No lectures logged for '{}' yet. Add one with: trackademia lectures add {} --topic \"name::explanation\"",
                        board.book.title, board.book.id
                    ),
                    global.quiet,
                ),
            }
            Ok(())
        }

        LecturesCommand::Show { lecture } => {
            let lecture = library.lecture(&util::record_id(&lecture)).await?;
            print_lecture(&lecture, global);
            Ok(())
        }

        LecturesCommand::Add { book, date, topics } => {
            let date = date.as_deref().map(util::parse_date).transpose()?;
            let topics = util::parse_topics(&topics)?;
            let lecture = library
                .add_lecture(&util::record_id(&book), date.unwrap_or_else(today), topics)
                .await?;
            output::notice("✓ Lecture logged", global.quiet);
            print_lecture(&lecture, global);
            Ok(())
        }

        LecturesCommand::Edit {
            lecture,
            date,
            topics,
        } => {
            let patch = LecturePatch {
                date: date.as_deref().map(util::parse_date).transpose()?,
                topics: if topics.is_empty() {
                    None
                } else {
                    Some(util::parse_topics(&topics)?)
                },
            };
            let lecture = library
                .update_lecture(&util::record_id(&lecture), patch)
                .await?;
            output::notice("✓ Lecture updated", global.quiet);
            print_lecture(&lecture, global);
            Ok(())
        }

        LecturesCommand::Delete { lecture } => {
            let id = util::record_id(&lecture);
            let existing = library.lecture(&id).await?;
            if !util::confirm(
                &format!("Delete the lecture of {}?", existing.date),
                global.yes,
            )? {
                return Ok(());
            }
            library.delete_lecture(&id).await?;
            output::notice("✓ Lecture deleted", global.quiet);
            Ok(())
        }
    }
}
