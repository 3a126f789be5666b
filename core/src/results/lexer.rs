//! Number lexer for result log lines.
//!
//! A two-state scanner: runs of ASCII digits and `.` form a token, anything
//! else ends it. There is no sign or exponent handling; a run such as `1.2.3`
//! or a lone `.` is handed to the float parser and rejected.

/// A digit run that is not a valid float literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{token:?} is not a number")]
pub struct LexError {
    /// The offending token.
    pub token: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    InNumber,
    Outside,
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || c == '.'
}

/// Extracts every number on `line`, in order.
///
/// # Errors
///
/// Returns [`LexError`] for the first token that does not parse as `f64`.
///
/// # Examples
///
/// ```
/// use binsplit_core::results::lexer::extract_numbers;
///
/// assert_eq!(extract_numbers("bin-42").unwrap(), vec![42.0]);
/// assert!(extract_numbers("no numbers here").unwrap().is_empty());
/// ```
pub fn extract_numbers(line: &str) -> Result<Vec<f64>, LexError> {
    let mut numbers = Vec::new();
    let mut buffer = String::new();
    let mut state = State::Outside;

    for c in line.chars() {
        match (state, is_number_char(c)) {
            (_, true) => {
                buffer.push(c);
                state = State::InNumber;
            }
            (State::InNumber, false) => {
                numbers.push(flush(&mut buffer)?);
                state = State::Outside;
            }
            (State::Outside, false) => {}
        }
    }
    if state == State::InNumber {
        numbers.push(flush(&mut buffer)?);
    }
    Ok(numbers)
}

fn flush(buffer: &mut String) -> Result<f64, LexError> {
    let token = std::mem::take(buffer);
    token.parse::<f64>().map_err(|_| LexError { token })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_line_yields_four_numbers() {
        assert_eq!(
            extract_numbers("cv_acc: 0.85, cv_err 0.02 test 0.9 0.01"),
            Ok(vec![0.85, 0.02, 0.9, 0.01])
        );
    }

    #[test]
    fn text_without_digits_is_empty() {
        assert_eq!(extract_numbers("no numbers here"), Ok(vec![]));
        assert_eq!(extract_numbers(""), Ok(vec![]));
    }

    #[test]
    fn trailing_token_is_flushed_at_end_of_line() {
        assert_eq!(extract_numbers("bin-42"), Ok(vec![42.0]));
    }

    #[test]
    fn signs_and_exponents_split_tokens() {
        assert_eq!(extract_numbers("-3 1e5"), Ok(vec![3.0, 1.0, 5.0]));
    }

    #[test]
    fn repeated_decimal_point_is_an_error() {
        assert_eq!(
            extract_numbers("acc 1.2.3"),
            Err(LexError {
                token: "1.2.3".into()
            })
        );
        assert_eq!(
            extract_numbers("done."),
            Err(LexError { token: ".".into() })
        );
    }

    #[test]
    fn leading_and_trailing_points_parse() {
        assert_eq!(extract_numbers(".5 and 7."), Ok(vec![0.5, 7.0]));
    }
}
