use super::normalizer::{
    is_course_code, is_credit, is_year, is_year_span, leading_integer, tokens,
};

const TERM_SUFFIX: &str = "dönemi";
const SUMMARY_MARKERS: [&str; 3] = ["Dönem", "Ortalama", "Genel"];
const MISSING_GRADE: &str = "-1";

#[derive(Debug)]
pub(crate) struct ObsRecord {
    pub(crate) code: String,
    pub(crate) year: String,
    pub(crate) name: String,
    pub(crate) credit: String,
    pub(crate) midterm: Option<String>,
    pub(crate) final_score: Option<String>,
    pub(crate) term: Option<String>,
}

#[derive(Debug)]
struct TermHeader {
    name: String,
    position: usize,
}

/// Scans whitespace-normalized portal text for course rows.
pub(crate) fn parse_records(normalized: &str) -> Vec<ObsRecord> {
    let tokens = tokens(normalized);
    let headers = scan_term_headers(&tokens);
    let mut records = Vec::new();
    let mut cursor = 0;

    while let Some(row) = next_row(&tokens, cursor) {
        cursor = row.end;
        if SUMMARY_MARKERS
            .iter()
            .any(|marker| row.name.contains(marker))
        {
            continue;
        }

        let rest = &tokens[row.rest_start..row.end];
        let term = headers
            .iter()
            .rev()
            .find(|header| header.position < row.start)
            .map(|header| header.name.clone());

        records.push(ObsRecord {
            code: tokens[row.start].to_string(),
            year: tokens[row.year].to_string(),
            name: row.name,
            credit: tokens[row.credit].to_string(),
            midterm: labelled_score(rest, "vize"),
            final_score: labelled_score(rest, "final"),
            term,
        });
    }

    records
}

struct RowSpan {
    start: usize,
    year: usize,
    name: String,
    credit: usize,
    rest_start: usize,
    end: usize,
}

fn next_row(tokens: &[&str], from: usize) -> Option<RowSpan> {
    let mut start = from;
    loop {
        start += tokens.get(start..)?.iter().position(|token| is_course_code(token))?;
        if let Some(row) = row_at(tokens, start) {
            return Some(row);
        }
        start += 1;
    }
}

fn row_at(tokens: &[&str], start: usize) -> Option<RowSpan> {
    let year = start + 1 + tokens[start + 1..].iter().position(|token| is_year(token))?;
    let name_start = year + 1;
    let credit = name_start
        + 1
        + tokens
            .get(name_start + 1..)?
            .iter()
            .position(|token| is_credit(token))?;
    let rest_start = credit + 1;
    let end = tokens[rest_start..]
        .iter()
        .position(|token| is_course_code(token))
        .map(|offset| rest_start + offset)
        .unwrap_or(tokens.len());

    Some(RowSpan {
        start,
        year,
        name: tokens[name_start..credit].join(" "),
        credit,
        rest_start,
        end,
    })
}

fn scan_term_headers(tokens: &[&str]) -> Vec<TermHeader> {
    let mut headers = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        if !is_year_span(tokens[index]) {
            index += 1;
            continue;
        }

        let suffix = tokens
            .iter()
            .enumerate()
            .skip(index + 2)
            .find(|(_, token)| token.to_lowercase().starts_with(TERM_SUFFIX));

        match suffix {
            Some((end, token)) => {
                let mut name = tokens[index..end].join(" ");
                name.push(' ');
                name.extend(token.chars().take(TERM_SUFFIX.chars().count()));
                headers.push(TermHeader {
                    name,
                    position: index,
                });
                index = end + 1;
            }
            None => break,
        }
    }

    headers
}

/// Value following a `Vize`/`Final` label; the portal's `-1` placeholder
/// becomes `0`.
fn labelled_score(rest: &[&str], label: &str) -> Option<String> {
    rest.windows(2).find_map(|pair| {
        if !pair[0].to_lowercase().ends_with(label) {
            return None;
        }
        leading_integer(pair[1]).map(|value| {
            if value == MISSING_GRADE {
                "0".to_string()
            } else {
                value.to_string()
            }
        })
    })
}
