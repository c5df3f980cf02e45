//! Book command handlers.

use tabled::Tabled;

use trackademia_core::{Book, BookPatch, Services};

use crate::cli::{BooksArgs, BooksCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct BookRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Cover")]
    cover: String,
    #[tabled(rename = "Added")]
    added: String,
}

impl From<&Book> for BookRow {
    fn from(b: &Book) -> Self {
        Self {
            id: b.id.to_string(),
            title: b.title.clone(),
            author: b.author.clone(),
            cover: if b.cover_url.is_some() { "yes" } else { "-" }.into(),
            added: b.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

fn detail(b: &Book, color: bool) -> String {
    [
        output::heading(&b.title, color),
        format!("  id:       {}", b.id),
        format!("  author:   {}", b.author),
        format!("  cover:    {}", b.cover_url.as_deref().unwrap_or("-")),
        format!("  added:    {}", b.created_at.format("%Y-%m-%d %H:%M UTC")),
        format!("  updated:  {}", b.updated_at.format("%Y-%m-%d %H:%M UTC")),
    ]
    .join("\n")
}

fn print_book(book: &Book, global: &GlobalOpts) {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        book,
        |b| detail(b, color),
        |b| b.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    services: &Services,
    args: BooksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let library = services.library()?;

    match args.command {
        BooksCommand::List => {
            let books = library.books().await?;
            let out = output::render_list(
                &global.output,
                &books,
                |b| BookRow::from(b),
                |b| b.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BooksCommand::Show { book } => {
            let book = library.book(&util::record_id(&book)).await?;
            print_book(&book, global);
            Ok(())
        }

        BooksCommand::Add {
            title,
            author,
            cover_url,
        } => {
            let book = library.add_book(&title, &author, cover_url).await?;
            output::notice("✓ Book added", global.quiet);
            print_book(&book, global);
            Ok(())
        }

        BooksCommand::Edit {
            book,
            title,
            author,
            cover_url,
        } => {
            let patch = BookPatch {
                title,
                author,
                cover_url: cover_url.map(Some),
            };
            let book = library.update_book(&util::record_id(&book), patch).await?;
            output::notice("✓ Book updated", global.quiet);
            print_book(&book, global);
            Ok(())
        }

        BooksCommand::Delete { book } => {
            let id = util::record_id(&book);
            let existing = library.book(&id).await?;
            let prompt = format!(
                "Delete '{}'? Its lectures stay in your log.",
                existing.title
            );
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            library.delete_book(&id).await?;
            output::notice("✓ Book deleted", global.quiet);
            Ok(())
        }

        BooksCommand::Cover { book, image } => {
            let file = util::load_image(&image)?;
            let book = library.set_cover(&util::record_id(&book), file).await?;
            output::notice("✓ Cover uploaded", global.quiet);
            print_book(&book, global);
            Ok(())
        }
    }
}
