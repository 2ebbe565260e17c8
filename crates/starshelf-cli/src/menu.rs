//! The menu shell: prompts collect command input, outcomes get printed.
//! All business logic stays on the other side of `CommandRunner`.

use std::io::{self, Write};

use starshelf_core::models::format_timestamp;
use starshelf_core::{Bookmark, BookmarkDraft, Command, FieldUpdate, Outcome, SortKey};

const FIELD_MAX_CHARS: usize = 35;

/// Prompts for the next menu choice and turns it into a command plus
/// the message to print when it succeeds. Loops until the input maps
/// to something.
pub fn next_command() -> io::Result<(Command, &'static str)> {
    print_options();
    loop {
        let choice = prompt_required("Choose an option")?;
        match choice.trim().to_uppercase().as_str() {
            "A" => return Ok((gather_add()?, "Bookmark added!")),
            "B" => {
                return Ok((
                    Command::List {
                        order_by: SortKey::DateAdded,
                    },
                    "",
                ))
            }
            "T" => {
                return Ok((
                    Command::List {
                        order_by: SortKey::Title,
                    },
                    "",
                ))
            }
            "E" => return Ok((gather_edit()?, "Bookmark updated!")),
            "D" => {
                return Ok((
                    Command::Delete {
                        id: prompt_id("Enter a bookmark ID to delete")?,
                    },
                    "Bookmark deleted!",
                ))
            }
            "G" => return Ok((gather_import()?, "Imported {} bookmarks from starred repos!")),
            "Q" => return Ok((Command::Quit, "")),
            _ => println!("Invalid choice"),
        }
    }
}

pub fn render(outcome: &Outcome, success_message: &str) {
    match outcome {
        Outcome::Done => println!("{}", success_message),
        Outcome::Imported(count) => {
            println!("{}", success_message.replace("{}", &count.to_string()))
        }
        Outcome::Listing(bookmarks) => {
            for bookmark in bookmarks {
                println!("{}", format_bookmark(bookmark, FIELD_MAX_CHARS));
            }
            println!();
        }
    }
}

fn print_options() {
    println!("(A) Add a bookmark");
    println!("(B) List bookmarks by date");
    println!("(T) List bookmarks by title");
    println!("(E) Edit a bookmark");
    println!("(D) Delete a bookmark");
    println!("(G) Import GitHub stars");
    println!("(Q) Quit");
    println!();
}

fn gather_add() -> io::Result<Command> {
    Ok(Command::Add {
        draft: BookmarkDraft {
            title: prompt_required("Title")?,
            url: prompt_required("URL")?,
            notes: prompt_optional("Notes")?,
            date_added: None,
        },
    })
}

fn gather_edit() -> io::Result<Command> {
    let id = prompt_id("Enter a bookmark ID to edit")?;
    let update = loop {
        let field = prompt_required("Choose a value to edit (title, url, notes)")?;
        match field.trim().to_lowercase().as_str() {
            "title" => break FieldUpdate::Title(prompt_required("Enter the new title")?),
            "url" => break FieldUpdate::Url(prompt_required("Enter the new URL")?),
            "notes" => break FieldUpdate::Notes(prompt_optional("Enter the new notes")?),
            _ => println!("Please, choose between title, url or notes"),
        }
    };
    Ok(Command::Edit { id, update })
}

fn gather_import() -> io::Result<Command> {
    let github_username = prompt_required("GitHub username")?;
    let preserve_timestamps = loop {
        let answer = prompt_required("Preserve star timestamps? (y/n)")?;
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => break true,
            "n" | "no" => break false,
            _ => println!("Please, choose between y or n"),
        }
    };
    Ok(Command::Import {
        github_username,
        preserve_timestamps,
    })
}

/// Re-prompts until the user types something.
fn prompt_required(label: &str) -> io::Result<String> {
    loop {
        if let Some(value) = read_value(label)? {
            return Ok(value);
        }
    }
}

/// An empty line means "no value".
fn prompt_optional(label: &str) -> io::Result<Option<String>> {
    read_value(label)
}

fn prompt_id(label: &str) -> io::Result<i64> {
    loop {
        match prompt_required(label)?.trim().parse() {
            Ok(id) => return Ok(id),
            Err(_) => println!("Please, enter a numeric ID"),
        }
    }
}

fn read_value(label: &str) -> io::Result<Option<String>> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        // stdin closed under us; there is nothing more to prompt for
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed"));
    }

    let value = line.trim();
    Ok(if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    })
}

fn format_bookmark(bookmark: &Bookmark, max_chars: usize) -> String {
    [
        bookmark.id.to_string(),
        clip(&bookmark.title, max_chars),
        clip(&bookmark.url, max_chars),
        clip(bookmark.notes.as_deref().unwrap_or(""), max_chars),
        format_timestamp(bookmark.date_added),
    ]
    .join("\t")
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let kept: String = text.chars().take(max_chars).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn bookmark() -> Bookmark {
        Bookmark {
            id: 7,
            title: "Rust".into(),
            url: "https://rust-lang.org".into(),
            notes: None,
            date_added: Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_bookmark_tab_separated() {
        assert_eq!(
            format_bookmark(&bookmark(), 35),
            "7\tRust\thttps://rust-lang.org\t\t2023-06-01T12:00:00Z"
        );
    }

    #[test]
    fn test_long_fields_are_clipped() {
        let mut long = bookmark();
        long.notes = Some("a".repeat(50));
        let formatted = format_bookmark(&long, 35);
        assert!(formatted.contains(&format!("{}...", "a".repeat(35))));
        assert!(!formatted.contains(&"a".repeat(36)));
    }

    #[test]
    fn test_clip_leaves_short_text_alone() {
        assert_eq!(clip("short", 35), "short");
    }
}
