// src/pipeline/menu.rs

//! Interactive menu over search, top-by-salary and name search.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::models::{ConversionConfig, Vacancy};
use crate::pipeline::{run_find, run_search, run_top};
use crate::services::{CurrencyRates, JobApi};
use crate::storage::VacancyStorage;

/// Everything the menu actions need.
pub struct MenuContext<'a> {
    pub api: &'a dyn JobApi,
    pub rates: &'a CurrencyRates,
    pub storage: &'a dyn VacancyStorage,
    pub conversion: &'a ConversionConfig,
}

/// Run the menu until the user picks "exit" or `input` ends.
///
/// Failed actions are reported to `output` and the loop continues.
pub async fn run_menu<R: BufRead, W: Write>(
    ctx: &MenuContext<'_>,
    mut input: R,
    mut output: W,
) -> Result<()> {
    writeln!(output, "Welcome to the hh.ru vacancy search!")?;

    loop {
        writeln!(output)?;
        writeln!(output, "Choose an action:")?;
        writeln!(output, "1. Search hh.ru and store the results")?;
        writeln!(output, "2. Show top N stored vacancies by salary")?;
        writeln!(output, "3. Show stored vacancies with a keyword in the name")?;
        writeln!(output, "4. Exit")?;

        let Some(choice) = prompt(&mut input, &mut output, "Enter action number: ")? else {
            break;
        };

        match choice.as_str() {
            "1" => search(ctx, &mut input, &mut output).await?,
            "2" => top(ctx, &mut input, &mut output).await?,
            "3" => find(ctx, &mut input, &mut output).await?,
            "4" => break,
            _ => writeln!(output, "Error: choose a valid action number.")?,
        }
    }

    writeln!(output, "Goodbye!")?;
    Ok(())
}

async fn search<R: BufRead, W: Write>(
    ctx: &MenuContext<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let Some(keyword) = prompt(input, output, "Enter search query: ")? else {
        return Ok(());
    };
    let Some(pages) = prompt(input, output, "Number of pages to fetch (default 1): ")? else {
        return Ok(());
    };

    let pages = if pages.is_empty() {
        1
    } else {
        match pages.parse::<u32>() {
            Ok(pages) if pages > 0 => pages,
            _ => {
                writeln!(output, "Error: enter a positive number of pages.")?;
                return Ok(());
            }
        }
    };

    match run_search(ctx.api, ctx.rates, ctx.storage, ctx.conversion, &keyword, pages).await {
        Ok(outcome) => writeln!(
            output,
            "Found {} vacancies, stored {}.",
            outcome.fetched, outcome.stored
        )?,
        Err(e) => writeln!(output, "Error: {e}")?,
    }
    Ok(())
}

async fn top<R: BufRead, W: Write>(
    ctx: &MenuContext<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let Some(answer) = prompt(input, output, "Number of vacancies to show: ")? else {
        return Ok(());
    };
    let n = match answer.parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            writeln!(output, "Error: enter a positive number.")?;
            return Ok(());
        }
    };

    match run_top(ctx.storage, n).await {
        Ok(vacancies) => {
            writeln!(output, "Top vacancies by salary:")?;
            print_vacancies(output, &vacancies)?;
        }
        Err(e) => writeln!(output, "Error: {e}")?,
    }
    Ok(())
}

async fn find<R: BufRead, W: Write>(
    ctx: &MenuContext<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let Some(keyword) = prompt(input, output, "Keyword to look for in the name: ")? else {
        return Ok(());
    };

    match run_find(ctx.storage, &keyword).await {
        Ok(vacancies) => {
            writeln!(
                output,
                "Found {} vacancies with \"{}\" in the name:",
                vacancies.len(),
                keyword
            )?;
            print_vacancies(output, &vacancies)?;
        }
        Err(e) => writeln!(output, "Error: {e}")?,
    }
    Ok(())
}

/// Print vacancy blocks separated by blank lines.
pub fn print_vacancies<W: Write>(output: &mut W, vacancies: &[Vacancy]) -> Result<()> {
    for vacancy in vacancies {
        writeln!(output, "{vacancy}\n")?;
    }
    Ok(())
}

/// Ask for one line of input; `None` once input is exhausted.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Option<String>> {
    write!(output, "{text}")?;
    output.flush()?;

    // Blocking read; the menu is the only task running while it waits.
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
