/// A date split into its day, month and year box runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateParts {
    pub dd: String,
    pub mm: String,
    pub yyyy: String,
}

/// Split `D/M/Y` or `D-M-Y` into zero-padded parts.
///
/// Day and month are padded to two characters and the year to four. Padding
/// is positional only: a two-digit year "95" becomes "0095". Components longer
/// than their width are kept whole. Returns `None` unless there are exactly
/// three separator-delimited parts.
pub fn split_date(value: &str) -> Option<DateParts> {
    let normalized = value.trim().replace('-', "/");
    let parts: Vec<&str> = normalized.split('/').collect();
    let [dd, mm, yyyy] = parts.as_slice() else {
        return None;
    };
    Some(DateParts {
        dd: zero_pad(dd, 2),
        mm: zero_pad(mm, 2),
        yyyy: zero_pad(yyyy, 4),
    })
}

fn zero_pad(part: &str, width: usize) -> String {
    format!("{part:0>width$}")
}
