//! Library of parser functions

// nom parser combinators
use nom::branch::alt;
use nom::character::complete::{space0, space1};
use nom::combinator::{eof, peek};
use nom::number::complete::double;
use nom::sequence::{preceded, terminated, tuple};
use nom::IResult;

// ! Boolean checks
/// Check for a line that is nothing but whitespace
pub fn is_blank(i: &str) -> bool {
    i.trim().is_empty()
}

/// Check for a line starting with the comment marker, ignoring indentation
pub fn is_comment(i: &str, marker: char) -> bool {
    i.trim_start().starts_with(marker)
}

// ! Parser combinators

/// A single whitespace-delimited floating point field
///
/// The number must be followed by whitespace or the end of the line, so that
/// `1.0abc` is rejected rather than read as `1.0`.
pub fn field(i: &str) -> IResult<&str, f64> {
    preceded(space0, terminated(double, peek(alt((space1, eof)))))(i)
}

/// The leading `x y z energy` fields of a data record
///
/// Anything after the fourth field is left unconsumed and ignored by the
/// reader.
pub fn record(i: &str) -> IResult<&str, [f64; 4]> {
    let (i, (x, y, z, energy)) = tuple((field, field, field, field))(i)?;
    Ok((i, [x, y, z, energy]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_with_tabs_and_exponents() {
        let (_, values) = record("  -1.25\t3.0e-1  0  1.2034E-02").unwrap();
        assert_eq!(values, [-1.25, 0.3, 0.0, 1.2034e-2]);
    }

    #[test]
    fn extra_fields_are_left() {
        let (rest, values) = record("1 2 3 4 5 event=17").unwrap();
        assert_eq!(values, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(rest, " 5 event=17");
    }

    #[test]
    fn short_records_fail() {
        assert!(record("1.0 2.0 3.0").is_err());
        assert!(record("").is_err());
    }

    #[test]
    fn glued_text_fails() {
        assert!(field("1.0abc").is_err());
        assert!(record("1.0 2.0 3.0 4.0MeV").is_err());
        assert!(record("x y z edep").is_err());
    }

    #[test]
    fn comment_and_blank_hints() {
        assert!(is_comment("# x(cm) y(cm) z(cm) edep(MeV)", '#'));
        assert!(is_comment("   # indented", '#'));
        assert!(!is_comment("1.0 # trailing", '#'));
        assert!(is_comment("% matlab style", '%'));
        assert!(is_blank("  \t "));
        assert!(!is_blank(" 0 "));
    }
}
