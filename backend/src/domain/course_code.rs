//! University course code grammar.
//!
//! ```text
//! course  := "L" faculty code
//! faculty := letter letter letter letter?
//! code    := digit digit digit digit      (value >= 1000)
//! ```
//!
//! Letters are ASCII and matching is case-insensitive, so `linfo1000` and
//! `LINFO1000` are both accepted.

const MIN_LEN: usize = 8;
const MAX_LEN: usize = 9;
const CODE_DIGITS: usize = 4;
const MIN_CODE: u16 = 1000;

/// Check whether `candidate` is a well-formed course code.
///
/// # Examples
/// ```
/// use feedback_backend::domain::is_course_code;
///
/// assert!(is_course_code("LINFO1000"));
/// assert!(is_course_code("lepl2020"));
/// assert!(!is_course_code("LINFO0999"));
/// assert!(!is_course_code(""));
/// ```
pub fn is_course_code(candidate: &str) -> bool {
    if !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }

    let course = candidate.to_ascii_lowercase();
    if !(MIN_LEN..=MAX_LEN).contains(&course.len()) {
        return false;
    }

    let Some(rest) = course.strip_prefix('l') else {
        return false;
    };
    let Some(split) = rest.len().checked_sub(CODE_DIGITS) else {
        return false;
    };
    let (faculty, code) = rest.split_at(split);

    let code_ok = code.chars().all(|c| c.is_ascii_digit())
        && code.parse::<u16>().is_ok_and(|value| value >= MIN_CODE);
    let faculty_ok =
        (3..=4).contains(&faculty.len()) && faculty.chars().all(|c| c.is_ascii_alphabetic());

    code_ok && faculty_ok
}

/// Return the canonical upper-case spelling of a valid course code.
///
/// # Examples
/// ```
/// use feedback_backend::domain::normalize_course_code;
///
/// assert_eq!(normalize_course_code("lbir1210").as_deref(), Some("LBIR1210"));
/// assert_eq!(normalize_course_code("SINF11BA"), None);
/// ```
pub fn normalize_course_code(candidate: &str) -> Option<String> {
    is_course_code(candidate).then(|| candidate.to_ascii_uppercase())
}
