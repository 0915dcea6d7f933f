//! Interactive search session.
//!
//! One query is aggregated up front; each following line narrows the
//! in-memory result set with more ban keywords until the user quits or
//! nothing is left.

use std::io::{self, BufRead, Write};

use pricescout_core::{Product, ProductSearch, filter};

const SEARCH_PROMPT: &str = "Search for: ";
const BAN_PROMPT: &str = "\n(q/quit for quit, eliminate keywords like: keyword1 keyword2 ...): ";

/// One line of ban-loop input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Empty,
    Ban(Vec<String>),
}

/// Classify a ban-loop line. `q`/`quit` as the first token quits.
pub fn parse_command(line: &str) -> Command {
    let tokens = filter::split_keywords(line);
    match tokens.first() {
        None => Command::Empty,
        Some(first) if first.eq_ignore_ascii_case("q") || first.eq_ignore_ascii_case("quit") => Command::Quit,
        Some(_) => Command::Ban(tokens),
    }
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> io::Result<Option<String>> {
    write!(out, "{text}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn print_cheapest<W: Write>(out: &mut W, products: &[Product], n: usize) -> io::Result<()> {
    writeln!(out, "\n=== Cheapest items ===")?;
    for (i, p) in filter::rank(products, Some(n)).iter().enumerate() {
        writeln!(out, "{}. {} | {} -> {}", i + 1, p.name, p.price_text, p.url)?;
    }
    Ok(())
}

/// Run one session reading commands from `input` and writing to `out`.
pub async fn run<R: BufRead, W: Write>(search: &ProductSearch, mut input: R, out: &mut W) -> io::Result<()> {
    let Some(query) = prompt(&mut input, out, SEARCH_PROMPT)? else {
        return Ok(());
    };
    if filter::split_keywords(&query).is_empty() {
        writeln!(out, "Empty")?;
        return Ok(());
    }

    let (cached, _) = search.lookup(&query, false).await;
    let mut items = cached.to_vec();
    tracing::debug!(query = %query.trim(), count = items.len(), "initial aggregation done");

    writeln!(out, "\nNumber of items found: {}", items.len())?;
    print_cheapest(out, &items, search.top_n())?;

    loop {
        let command = match prompt(&mut input, out, BAN_PROMPT)? {
            Some(line) => parse_command(&line),
            None => Command::Quit,
        };

        match command {
            Command::Empty => writeln!(out, "Empty input! Try again!")?,
            Command::Quit => {
                writeln!(out, "Bye!")?;
                break;
            }
            Command::Ban(bans) => {
                items = filter::exclude_by_keywords(&items, &bans);
                writeln!(out, "\nAfter filtering ({}), remaining: {}", bans.join(", "), items.len())?;
                if items.is_empty() {
                    writeln!(out, "No items left.")?;
                    break;
                }
                print_cheapest(out, &items, search.top_n())?;
            }
        }
    }

    Ok(())
}
